//! Window builders shared by the unit tests.

use retarget_types::BlockWindow;

use crate::estimator::RetargetRequest;

pub(crate) const START_TIME: u64 = 1_000_000;

/// `n` intervals of `solvetime` seconds, every block at `difficulty`.
pub(crate) fn steady_window(n: usize, solvetime: u64, difficulty: u64) -> BlockWindow {
    window_with(&vec![solvetime; n], &vec![difficulty; n])
}

pub(crate) fn window_with_solvetimes(solvetimes: &[u64], difficulty: u64) -> BlockWindow {
    window_with(solvetimes, &vec![difficulty; solvetimes.len()])
}

pub(crate) fn window_with(solvetimes: &[u64], difficulties: &[u64]) -> BlockWindow {
    BlockWindow::from_solvetimes(START_TIME, 0, solvetimes, difficulties).unwrap()
}

pub(crate) fn request_at(window: &BlockWindow, height: u64) -> RetargetRequest<'_> {
    RetargetRequest::new(window, height)
}
