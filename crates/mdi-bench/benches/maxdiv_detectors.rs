// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use mdi_core::{DetectionParams, IntervalDetector, Signal};
use mdi_detect::{MaxDivDetector, MaxDivMethod};

fn lcg_next(state: &mut u64) -> u64 {
    *state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    *state
}

fn planted_signal(n: usize, d: usize) -> Signal {
    let mut state = 0x5eed_cafe_u64;
    let mut values = Vec::with_capacity(n * d);
    for t in 0..n {
        let bump = if (n / 3..n / 3 + 30).contains(&t) { 2.5 } else { 0.0 };
        for _ in 0..d {
            let noise = (lcg_next(&mut state) >> 11) as f64 / (1u64 << 53) as f64 - 0.5;
            values.push(noise + bump);
        }
    }
    Signal::new(values, n, d).expect("benchmark signal should be valid")
}

fn bench_method(c: &mut Criterion, case_id: &str, method: MaxDivMethod, n: usize, d: usize) {
    let signal = planted_signal(n, d);
    let detector = MaxDivDetector::new(method);
    let params = DetectionParams {
        method: method.as_str().to_string(),
        ..DetectionParams::default()
    };

    c.bench_function(case_id, |b| {
        b.iter(|| {
            detector
                .detect(black_box(&signal), black_box(&params))
                .expect("detection should succeed")
        })
    });
}

fn benchmark_gaussian_cov_n500_d3(c: &mut Criterion) {
    bench_method(c, "gaussian_cov_n500_d3", MaxDivMethod::GaussianCov, 500, 3);
}

fn benchmark_gaussian_global_cov_n2000_d1(c: &mut Criterion) {
    bench_method(
        c,
        "gaussian_global_cov_n2000_d1",
        MaxDivMethod::GaussianGlobalCov,
        2_000,
        1,
    );
}

fn benchmark_parzen_n500_d1(c: &mut Criterion) {
    bench_method(c, "parzen_n500_d1", MaxDivMethod::Parzen, 500, 1);
}

criterion_group!(
    benches,
    benchmark_gaussian_cov_n500_d3,
    benchmark_gaussian_global_cov_n2000_d1,
    benchmark_parzen_n500_d1
);
criterion_main!(benches);
