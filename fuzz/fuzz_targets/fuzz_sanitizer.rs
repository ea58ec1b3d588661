#![no_main]

use libfuzzer_sys::fuzz_target;

use retarget_work::{monotone_timestamps, solvetimes, SolvetimeBounds};

fuzz_target!(|data: &[u8]| {
    if data.len() < 16 {
        return;
    }
    let floor = u64::from_le_bytes([
        data[0], data[1], data[2], data[3],
        data[4], data[5], data[6], data[7],
    ]);
    let ceiling = u64::from_le_bytes([
        data[8], data[9], data[10], data[11],
        data[12], data[13], data[14], data[15],
    ]);
    let raw: Vec<u64> = data[16..]
        .chunks_exact(8)
        .map(|c| u64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
        .collect();

    let ts = monotone_timestamps(&raw);
    assert_eq!(ts.len(), raw.len());
    assert!(ts.windows(2).all(|w| w[1] >= w[0]));

    let bounds = SolvetimeBounds::new(floor, ceiling);
    for st in solvetimes(&raw, bounds) {
        assert!(st >= 1);
    }
});
