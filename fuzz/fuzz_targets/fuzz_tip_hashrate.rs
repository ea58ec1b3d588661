#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use retarget_consensus::{
    estimate_tip_hashrate, harmonic_hashrate, ChainTipObservation, HashrateSample, PendingBlock,
};

#[derive(Debug, Arbitrary)]
struct Input {
    samples: Vec<(u64, u64)>,
    pending: Option<(u64, u64)>,
}

// The tip estimate never panics, is never NaN, and a pending head never
// raises it above the estimate without one.
fuzz_target!(|input: Input| {
    let samples: Vec<_> = input
        .samples
        .iter()
        .map(|&(d, st)| HashrateSample::new(d, st))
        .collect();
    let mut observation = ChainTipObservation::new(samples.clone());
    if let Some((d, elapsed)) = input.pending {
        observation = observation.with_pending(PendingBlock::new(d, elapsed));
    }
    if let Ok(estimate) = estimate_tip_hashrate(&observation) {
        assert!(!estimate.is_nan());
        let base = harmonic_hashrate(&samples).unwrap();
        assert!(estimate <= base);
    }
});
