#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use retarget_types::{BlockWindow, RetargetParams, Timestamp};
use retarget_work::{Algorithm, RetargetRequest};

#[derive(Debug, Arbitrary)]
struct Input {
    target_interval: u16,
    smoothing: u8,
    template_smoothing: u8,
    template_offset: u32,
    timestamps: Vec<u64>,
    difficulties: Vec<u64>,
}

// Every estimator must return a positive difficulty, or a precondition
// error, for any window: repeated, backwards and huge timestamps included.
fuzz_target!(|input: Input| {
    let len = input.timestamps.len().min(input.difficulties.len() + 1);
    if len < 2 {
        return;
    }
    let timestamps = input.timestamps[..len].to_vec();
    let mut cumulative = Vec::with_capacity(len);
    cumulative.push(0u64);
    for d in &input.difficulties[..len - 1] {
        let prev = *cumulative.last().unwrap();
        cumulative.push(prev.saturating_add(*d));
    }
    let window = BlockWindow::new(timestamps, cumulative).unwrap();

    let params = RetargetParams::new(u64::from(input.target_interval), (len - 1) as u64)
        .with_smoothing(u64::from(input.smoothing))
        .with_template_smoothing(u64::from(input.template_smoothing));
    let newest = window.timestamps().iter().copied().max().unwrap_or(0);
    let template_time = Timestamp::new(newest.saturating_add(u64::from(input.template_offset)));

    for algorithm in Algorithm::ALL {
        let Ok(estimator) = algorithm.build(params.clone()) else {
            continue;
        };
        let request = RetargetRequest::new(&window, u64::MAX).with_template_time(template_time);
        if let Ok(next) = estimator.next_difficulty(&request) {
            assert!(next.get() >= 1, "{algorithm} returned zero");
        }
    }
});
