use proptest::collection::vec;
use proptest::prelude::*;

use retarget_consensus::{
    erlang_chain_work_rate, estimate_tip_hashrate, harmonic_hashrate, ChainTipObservation,
    HashrateSample, PendingBlock, TipComparison, TipSnapshot,
};
use retarget_types::Timestamp;

fn samples() -> impl Strategy<Value = Vec<HashrateSample>> {
    vec(
        (1u64..1_000_000_000, 1u64..100_000).prop_map(|(d, st)| HashrateSample::new(d, st)),
        2..64,
    )
}

fn with_wait(samples: &[HashrateSample], difficulty: u64, elapsed: u64) -> f64 {
    let observation =
        ChainTipObservation::new(samples.to_vec()).with_pending(PendingBlock::new(difficulty, elapsed));
    estimate_tip_hashrate(&observation).unwrap()
}

proptest! {
    /// A pending head never raises a tip's estimate.
    #[test]
    fn pending_head_never_raises_estimate(
        samples in samples(),
        difficulty in 1u64..1_000_000_000,
        elapsed in 0u64..1_000_000,
    ) {
        let base = harmonic_hashrate(&samples).unwrap();
        prop_assert!(with_wait(&samples, difficulty, elapsed) <= base);
    }

    /// Waiting longer never raises the estimate.
    #[test]
    fn estimate_non_increasing_in_wait(
        samples in samples(),
        difficulty in 1u64..1_000_000_000,
        a in 0u64..1_000_000,
        b in 0u64..1_000_000,
    ) {
        let (short, long) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(with_wait(&samples, difficulty, long) <= with_wait(&samples, difficulty, short));
    }

    /// One more second of waiting moves the estimate by no more than the
    /// slope of the with-sample branch, so there is no jump where the
    /// branches meet.
    #[test]
    fn estimate_continuous_in_wait(
        samples in samples(),
        difficulty in 1u64..1_000_000_000,
        elapsed in 0u64..1_000_000,
    ) {
        let n = samples.len() as f64;
        let s: f64 = samples.iter().map(|x| x.solvetime as f64 / x.difficulty as f64).sum();
        let slope = n / (difficulty as f64 * s * s);
        let before = with_wait(&samples, difficulty, elapsed);
        let after = with_wait(&samples, difficulty, elapsed + 1);
        prop_assert!(before - after <= slope + 1e-9 * before);
    }

    /// With no wait at all the pending head is ignored.
    #[test]
    fn zero_wait_is_the_harmonic_estimate(
        samples in samples(),
        difficulty in 1u64..1_000_000_000,
    ) {
        prop_assert_eq!(with_wait(&samples, difficulty, 0), harmonic_hashrate(&samples).unwrap());
    }

    /// At constant difficulty the harmonic and Erlang estimators agree.
    #[test]
    fn harmonic_matches_erlang_at_constant_difficulty(
        d in 1u64..1_000_000_000,
        sts in vec(1u64..100_000, 2..64),
    ) {
        let samples: Vec<_> = sts.iter().map(|&st| HashrateSample::new(d, st)).collect();
        let h = harmonic_hashrate(&samples).unwrap();
        let e = erlang_chain_work_rate(&samples).unwrap();
        prop_assert!((h - e).abs() <= 1e-9 * e);
    }

    /// The selected tip has the maximum estimate and no earlier tip ties it.
    #[test]
    fn selected_tip_is_the_first_maximum(
        tips in vec((samples(), 0u64..10_000), 1..8),
        now in 10_000u64..1_000_000,
    ) {
        let snapshots: Vec<_> = tips
            .into_iter()
            .map(|(samples, elapsed)| {
                let observation = ChainTipObservation::new(samples)
                    .with_pending(PendingBlock::new(1_000, elapsed));
                TipSnapshot::new(observation, Timestamp::new(now - elapsed))
            })
            .collect();
        let cmp = TipComparison::new(Timestamp::new(now));
        let estimates = cmp.estimates(&snapshots).unwrap();
        let best = cmp.select_best(&snapshots).unwrap();
        prop_assert!(estimates.iter().all(|&e| e <= estimates[best]));
        prop_assert!(estimates[..best].iter().all(|&e| e < estimates[best]));
    }
}
