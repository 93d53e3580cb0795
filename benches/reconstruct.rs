use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use station_forecast::{
    FeatureReconstructor, MemoryObservationStore, ModelArtifact, ModelHandle, ModelMetrics,
    Observation, ObservationStore, PredictionService, Quantity, Regressor, WeatherReading,
};
use std::sync::Arc;

const LAGS: [u32; 6] = [1, 2, 3, 6, 12, 24];

fn feature_order() -> Vec<String> {
    let mut order: Vec<String> = LAGS
        .iter()
        .flat_map(|lag| Quantity::ALL.into_iter().map(move |q| q.lag_feature_name(*lag)))
        .collect();
    order.extend(["hour_sin".to_string(), "hour_cos".to_string()]);
    order
}

fn reading(i: usize) -> WeatherReading {
    WeatherReading {
        station_code: "A301".to_string(),
        temperature: 20.0 + (i % 12) as f64 * 0.5,
        humidity: 75.0,
        pressure: 1013.25,
        wind_speed: 1.8,
        wind_direction: 0.0,
        radiation: 800.0,
        precipitation: 0.0,
    }
}

fn window(len: usize) -> Vec<Observation> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..len)
        .map(|i| {
            let at = start + Duration::hours(i as i64);
            Observation::from_new(i as i64 + 1, reading(i).received_at(at))
        })
        .collect()
}

fn artifact() -> ModelArtifact {
    let order = feature_order();
    ModelArtifact {
        regressor: Regressor::Linear {
            coefficients: vec![0.01; order.len()],
            intercept: 0.5,
        },
        feature_order: order,
        lags: LAGS.to_vec(),
        metrics: ModelMetrics {
            rmse: 0.11,
            mae: 0.08,
            r2: 0.98,
        },
    }
}

fn bench_reconstruct(c: &mut Criterion) {
    let reconstructor = FeatureReconstructor::new(&LAGS, &feature_order()).unwrap();
    let history = window(25);
    c.bench_function("reconstruct_26_features", |b| {
        b.iter(|| reconstructor.reconstruct(black_box(&history), black_box(14)))
    });
}

fn bench_predict_auto(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let store = Arc::new(MemoryObservationStore::new());
    runtime.block_on(async {
        for obs in window(200) {
            let at = obs.timestamp;
            store.insert(reading(obs.id as usize).received_at(at)).await.unwrap();
        }
    });
    let service = PredictionService::builder()
        .model(Arc::new(ModelHandle::preloaded(artifact())))
        .store(store)
        .station_code("A301")
        .build();

    c.bench_function("predict_auto_memory_store", |b| {
        b.to_async(&runtime).iter(|| service.predict_auto())
    });
}

criterion_group!(benches, bench_reconstruct, bench_predict_auto);
criterion_main!(benches);
