use std::hint::black_box;
use std::sync::Arc;

use brrtapi::{
    Api, ApiError, ApiType, AppMeta, CapabilityRegistry, PathParams, RecordedResponse,
    RouteCollector, RouteHandler, RouteSpec, RuntimeConfig, TypeDescriptor,
};
use criterion::{criterion_group, criterion_main, Criterion};
use serde::{Deserialize, Serialize};

#[derive(Default, Serialize, Deserialize, ApiType)]
struct Calculation {
    left: i64,
    right: i64,
}

#[derive(Default, Serialize, Deserialize, ApiType)]
struct CalcResult {
    result: i64,
}

#[derive(Default, Serialize, Deserialize, ApiType)]
#[api(name = "id", required)]
struct AnimalId(u64);

#[derive(Default, Serialize, Deserialize, ApiType)]
#[api(name = "limit")]
struct Limit(Option<u32>);

fn calculate(calc: Calculation) -> Result<CalcResult, ApiError> {
    Ok(CalcResult {
        result: calc.left + calc.right,
    })
}

fn get_animal(id: AnimalId, limit: Limit) -> Result<CalcResult, ApiError> {
    Ok(CalcResult {
        result: (id.0 + u64::from(limit.0.unwrap_or(1))) as i64,
    })
}

fn build() -> (RouteHandler, RouteHandler) {
    let mut api = Api::with_config(
        RouteCollector::new(),
        brrtapi::default_error_handler,
        AppMeta::new("bench", "1.0"),
        RuntimeConfig::default(),
        Arc::new(CapabilityRegistry::new()),
    )
    .unwrap();
    let mut router = api.router();
    let calc = router
        .post("/calc", calculate, RouteSpec::new())
        .unwrap();
    let animal = router
        .get("/zoo/animals/:id", get_animal, RouteSpec::new())
        .unwrap();
    (calc, animal)
}

fn bench_body_binding(c: &mut Criterion) {
    let (calc, _) = build();
    let request = http::Request::post("/calc")
        .body(br#"{"left":5,"right":16}"#.to_vec())
        .unwrap();
    let params = PathParams::new();
    c.bench_function("bind_json_body", |b| {
        b.iter(|| {
            let mut reply = RecordedResponse::new();
            calc(&mut reply, black_box(&request), &params);
            black_box(reply.status())
        })
    });
}

fn bench_scalar_binding(c: &mut Criterion) {
    let (_, animal) = build();
    let request = http::Request::get("/zoo/animals/42?limit=5")
        .body(Vec::new())
        .unwrap();
    let mut params = PathParams::new();
    params.push((Arc::from("id"), "42".to_string()));
    c.bench_function("bind_path_and_query", |b| {
        b.iter(|| {
            let mut reply = RecordedResponse::new();
            animal(&mut reply, black_box(&request), &params);
            black_box(reply.status())
        })
    });
}

fn bench_capability_lookup(c: &mut Criterion) {
    let registry = CapabilityRegistry::new();
    let ty = TypeDescriptor::of::<AnimalId>();
    registry.resolve(&ty);
    c.bench_function("capability_cache_hit", |b| {
        b.iter(|| black_box(registry.spec_of(black_box(&ty))))
    });
}

criterion_group!(
    benches,
    bench_body_binding,
    bench_scalar_binding,
    bench_capability_lookup
);
criterion_main!(benches);
