pub mod error;
pub mod features;
pub mod reconstructor;
pub mod service;
