use proptest::collection::vec;
use proptest::prelude::*;

use retarget_types::{BlockWindow, RetargetParams, Timestamp};
use retarget_work::{
    exp_scaled, monotone_timestamps, solvetimes, Algorithm, DifficultyEstimator, RetargetRequest,
    SolvetimeBounds, Tsa, EXP_SCALE, MAX_EXPONENT_SCALED,
};

const START: u64 = 1_000_000;
const HEIGHT: u64 = 1_000_000;

fn window(sts: &[u64], difficulties: &[u64]) -> BlockWindow {
    BlockWindow::from_solvetimes(START, 0, sts, difficulties).unwrap()
}

fn next(algorithm: Algorithm, params: &RetargetParams, window: &BlockWindow) -> u64 {
    let estimator = algorithm.build(params.clone()).unwrap();
    let mut request = RetargetRequest::new(window, HEIGHT);
    if algorithm.needs_template_time() {
        let newest = monotone_timestamps(window.timestamps())
            .last()
            .copied()
            .unwrap();
        request = request.with_template_time(Timestamp::new(newest + params.target_interval));
    }
    estimator.next_difficulty(&request).unwrap().get()
}

/// Algorithms whose estimate never rises when any one solvetime grows.
const INTERVAL_MONOTONE: [Algorithm; 9] = [
    Algorithm::Sma,
    Algorithm::Dgw,
    Algorithm::Digishield,
    Algorithm::DigishieldUndelayed,
    Algorithm::Lwma1,
    Algorithm::Whr,
    Algorithm::Ema,
    Algorithm::Asert,
    Algorithm::Tsa,
];

/// Largest estimate after one interval of a steady window drops from T to
/// one second.
fn fast_block_ceiling(algorithm: Algorithm, params: &RetargetParams, d: u64, before: u64) -> f64 {
    let n = params.window_size as f64;
    let t = params.target_interval as f64;
    let before = before as f64;
    // Linear weights lose at most N (T - 1) of N(N + 1) T / 2.
    let weighted = (n + 1.0) / (n - 1.0);
    // Fixed-point exponent and table rounding.
    let exp_slack = 1.0 + 5e-4;
    let ratio = match algorithm {
        Algorithm::Digishield => {
            // Only the newer median edge moves, and damping keeps a quarter of it.
            let span = (n - 10.0) * t;
            4.0 * span / (4.0 * span - t - 2.0)
        }
        Algorithm::DigishieldUndelayed => 4.0 * n / (4.0 * n - 1.0),
        Algorithm::Ema => {
            let tau = params.smoothing_blocks() as f64;
            ((t - 1.0) / (t * tau)).exp() * exp_slack
        }
        Algorithm::Tsa => {
            let m = params.template_smoothing as f64;
            let lag = (t - 1.0) / n + 1.0;
            weighted * (lag / (t * m)).exp() * exp_slack
        }
        Algorithm::Lwma4 => return (before * weighted).max(1.05 * d as f64) + 3.0,
        _ => weighted,
    };
    before * ratio + 3.0
}

fn window_shape() -> impl Strategy<Value = (Vec<u64>, Vec<u64>)> {
    (12usize..48).prop_flat_map(|n| {
        (
            vec(1u64..5_000, n),
            vec(1u64..1_000_000_000_000, n),
        )
    })
}

proptest! {
    /// The fixed-point exponential stays within 0.02% of e^x.
    #[test]
    fn exponential_accuracy(x in 0u64..=MAX_EXPONENT_SCALED) {
        let exact = (x as f64 / EXP_SCALE as f64).exp() * EXP_SCALE as f64;
        let err = (exp_scaled(x) as f64 - exact).abs() / exact;
        prop_assert!(err < 2e-4, "x = {}, err = {}", x, err);
    }

    /// The exponential is non-decreasing everywhere, including past the table.
    #[test]
    fn exponential_monotone(a in any::<u64>(), b in any::<u64>()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(exp_scaled(lo) <= exp_scaled(hi));
    }

    /// Sanitized timestamps strictly increase and solvetimes respect bounds.
    #[test]
    fn sanitizer_output_is_strictly_increasing(
        raw in vec(0u64..1_000_000, 1..200),
        ceiling in 1u64..10_000,
    ) {
        let ts = monotone_timestamps(&raw);
        prop_assert_eq!(ts.len(), raw.len());
        prop_assert!(ts.windows(2).all(|w| w[1] > w[0]));
        let bounds = SolvetimeBounds::new(1, ceiling);
        let sts = solvetimes(&raw, bounds);
        prop_assert_eq!(sts.len(), raw.len() - 1);
        prop_assert!(sts.iter().all(|&st| (1..=ceiling).contains(&st)));
    }

    /// Every estimator returns a positive difficulty for arbitrary raw
    /// timestamps, including repeated and backwards ones, and returns the
    /// same value when asked twice.
    #[test]
    fn estimates_are_positive_and_deterministic(
        raw in vec(0u64..2_000_000, 49),
        difficulties in vec(1u64..u64::MAX / 64, 48),
        t in 1u64..2_000,
    ) {
        let mut cumulative = vec![0u64];
        for d in &difficulties {
            cumulative.push(cumulative.last().unwrap() + d);
        }
        let w = BlockWindow::new(raw, cumulative).unwrap();
        let params = RetargetParams::new(t, 48);
        for algorithm in Algorithm::ALL {
            let first = next(algorithm, &params, &w);
            prop_assert!(first >= 1, "{} returned zero", algorithm);
            prop_assert_eq!(first, next(algorithm, &params, &w));
        }
    }

    /// Before N + 1 blocks exist past the fork, the guess comes back
    /// untouched whatever the window holds.
    #[test]
    fn bootstrap_returns_the_guess(
        fork in 0u64..1_000_000,
        offset in 0u64..=40,
        guess in 1u64..u64::MAX,
        sts in vec(0u64..1_000, 0..60),
    ) {
        let params = RetargetParams::new(120, 40)
            .with_fork_height(fork)
            .with_difficulty_guess(guess);
        let w = window(&sts, &vec![7; sts.len()]);
        for algorithm in Algorithm::ALL {
            let estimator = algorithm.build(params.clone()).unwrap();
            let request = RetargetRequest::new(&w, fork + offset);
            prop_assert_eq!(estimator.next_difficulty(&request).unwrap().get(), guess);
        }
    }

    /// Raising every block difficulty never lowers the estimate.
    #[test]
    fn monotone_in_average_difficulty(
        sts in vec(1u64..1_000, 48),
        d in 1u64..1_000_000_000,
        bump in 1u64..1_000_000_000,
    ) {
        let params = RetargetParams::new(120, 48);
        let low = window(&sts, &[d; 48]);
        let high = window(&sts, &[d + bump; 48]);
        for algorithm in Algorithm::ALL {
            prop_assert!(
                next(algorithm, &params, &low) <= next(algorithm, &params, &high),
                "{}", algorithm
            );
        }
    }

    /// Uniformly slower blocks never raise the estimate.
    #[test]
    fn monotone_in_uniform_solvetime(
        st in 1u64..2_000,
        extra in 1u64..2_000,
        d in 1u64..1_000_000_000,
    ) {
        let params = RetargetParams::new(120, 48);
        let fast = window(&[st; 48], &[d; 48]);
        let slow = window(&[st + extra; 48], &[d; 48]);
        for algorithm in Algorithm::ALL {
            prop_assert!(
                next(algorithm, &params, &slow) <= next(algorithm, &params, &fast),
                "{}", algorithm
            );
        }
    }

    /// Lengthening any single solvetime never raises the estimate.
    #[test]
    fn monotone_in_each_solvetime(
        (sts, ds) in window_shape(),
        index in any::<prop::sample::Index>(),
        extra in 1u64..5_000,
    ) {
        let n = sts.len() as u64;
        let params = RetargetParams::new(120, n);
        let base = window(&sts, &ds);
        let mut longer = sts.clone();
        let i = index.index(longer.len());
        longer[i] += extra;
        let slower = window(&longer, &ds);
        for algorithm in INTERVAL_MONOTONE {
            prop_assert!(
                next(algorithm, &params, &slower) <= next(algorithm, &params, &base),
                "{} at interval {}", algorithm, i
            );
        }
    }

    /// One adversarially fast block among on-schedule blocks raises the
    /// estimate by no more than each variant's damping allows.
    #[test]
    fn single_fast_block_is_bounded(
        n in 12u64..120,
        t in 10u64..1_000,
        d in 1_000u64..1_000_000_000,
        index in any::<prop::sample::Index>(),
    ) {
        let params = RetargetParams::new(t, n);
        let mut sts = vec![t; n as usize];
        let steady = window(&sts, &vec![d; n as usize]);
        let i = index.index(sts.len());
        sts[i] = 1;
        let fast = window(&sts, &vec![d; n as usize]);
        for algorithm in Algorithm::ALL {
            let before = next(algorithm, &params, &steady);
            let after = next(algorithm, &params, &fast);
            let ceiling = fast_block_ceiling(algorithm, &params, d, before);
            prop_assert!(after >= before, "{}", algorithm);
            prop_assert!(
                after as f64 <= ceiling,
                "{} at interval {}: {} > {}", algorithm, i, after, ceiling
            );
        }
    }

    /// A later template time never raises the template-time estimate.
    #[test]
    fn template_estimate_non_increasing_in_time(
        (sts, ds) in window_shape(),
        a in 0u64..5_000,
        b in 0u64..5_000,
    ) {
        let params = RetargetParams::new(120, sts.len() as u64);
        let tsa = Tsa::new(params).unwrap();
        let w = window(&sts, &ds);
        let newest = monotone_timestamps(w.timestamps()).last().copied().unwrap();
        let (early, late) = if a <= b { (a, b) } else { (b, a) };
        let at = |offset: u64| {
            let request = RetargetRequest::new(&w, HEIGHT)
                .with_template_time(Timestamp::new(newest + offset));
            tsa.next_difficulty(&request).unwrap().get()
        };
        let (e, l) = (at(early), at(late));
        prop_assert!(l <= e);
        prop_assert!(l >= 1);
    }
}
