pub mod artifact;
pub mod error;
pub mod handle;
pub mod regressor;
