#![no_main]

use libfuzzer_sys::fuzz_target;

use retarget_work::{exp_scaled, EXP_SCALE};

// The fixed-point exponential must never panic and never fall below e^0.
fuzz_target!(|data: [u64; 2]| {
    let (lo, hi) = if data[0] <= data[1] {
        (data[0], data[1])
    } else {
        (data[1], data[0])
    };
    let (a, b) = (exp_scaled(lo), exp_scaled(hi));
    assert!(a >= EXP_SCALE);
    assert!(a <= b);
});
