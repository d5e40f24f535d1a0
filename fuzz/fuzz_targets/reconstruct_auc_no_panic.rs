// SPDX-License-Identifier: MIT OR Apache-2.0

#![no_main]

use libfuzzer_sys::fuzz_target;
use mdi_core::{GroundTruth, Interval};
use mdi_eval::{interval_auc, reconstruct_scores};

const MAX_N: usize = 512;

fn decode_score(raw: [u8; 2]) -> f64 {
    match raw[0] % 16 {
        0 => f64::NAN,
        1 => f64::INFINITY,
        2 => f64::NEG_INFINITY,
        _ => f64::from(i16::from_le_bytes(raw)) / 64.0,
    }
}

fuzz_target!(|data: &[u8]| {
    let Some((&n_seed, rest)) = data.split_first() else {
        return;
    };
    let n = usize::from(n_seed) * 2 % MAX_N;

    let (label_bytes, interval_bytes) = rest.split_at(rest.len().min(n.div_ceil(8)));
    let labels = (0..n)
        .map(|t| {
            label_bytes
                .get(t / 8)
                .map_or(0, |byte| (byte >> (t % 8)) & 1)
        })
        .collect::<Vec<_>>();
    let Ok(truth) = GroundTruth::new(labels) else {
        return;
    };

    let intervals = interval_bytes
        .chunks_exact(4)
        .map(|chunk| {
            let start = usize::from(chunk[0]) * 2;
            let len = usize::from(chunk[1]);
            Interval::new(start, start + len, decode_score([chunk[2], chunk[3]]))
        })
        .collect::<Vec<_>>();

    if let Ok(scores) = reconstruct_scores(n, &intervals) {
        assert_eq!(scores.len(), n);
        for (t, score) in scores.iter().enumerate() {
            if !intervals.iter().any(|interval| interval.contains(t)) {
                assert_eq!(*score, 0.0);
            }
        }
    }

    if let Ok(auc) = interval_auc(&truth, &intervals) {
        assert!((0.0..=1.0).contains(&auc), "auc out of range: {auc}");
    }
});
