//! Per-item animation windowing.
//!
//! Each item owns a window of the overall progress: item `i` starts at
//! `i * gap` and runs for `speed`. Items therefore enter in catalog order,
//! offset by a constant stride.

use super::viewport::SceneTuning;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocalProgress {
    NotStarted,
    Running(f64),
    Finished,
}

impl LocalProgress {
    /// Ramp value in [0, 1]: 0 before the window, 1 after it.
    pub fn ramp(self) -> f64 {
        match self {
            LocalProgress::NotStarted => 0.0,
            LocalProgress::Running(v) => v,
            LocalProgress::Finished => 1.0,
        }
    }
}

/// Local progress of item `index` within its window of `overall` progress.
pub fn local_progress(index: usize, overall: f64, tuning: &SceneTuning) -> LocalProgress {
    let start = index as f64 * tuning.gap;
    let end = start + tuning.speed;

    if overall < start {
        LocalProgress::NotStarted
    } else if overall > end {
        LocalProgress::Finished
    } else {
        LocalProgress::Running((overall - start) / tuning.speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_boundaries() {
        let tuning = SceneTuning::default();
        // Item 2's window is roughly [0.16, 0.56].
        assert_eq!(local_progress(2, 0.1, &tuning), LocalProgress::NotStarted);
        assert_eq!(local_progress(2, 0.6, &tuning), LocalProgress::Finished);
        // Item 0's window is exactly [0, speed]; both edges are inclusive.
        assert_eq!(local_progress(0, 0.0, &tuning), LocalProgress::Running(0.0));
        assert_eq!(local_progress(0, 0.4, &tuning), LocalProgress::Running(1.0));
    }

    #[test]
    fn test_linear_inside_window() {
        let tuning = SceneTuning::default();
        match local_progress(0, 0.1, &tuning) {
            LocalProgress::Running(v) => assert!((v - 0.25).abs() < 1e-9),
            other => panic!("expected Running, got {:?}", other),
        }
        match local_progress(1, 0.28, &tuning) {
            LocalProgress::Running(v) => assert!((v - 0.5).abs() < 1e-9),
            other => panic!("expected Running, got {:?}", other),
        }
    }

    #[test]
    fn test_ramp_saturates() {
        assert_eq!(LocalProgress::NotStarted.ramp(), 0.0);
        assert_eq!(LocalProgress::Finished.ramp(), 1.0);
        assert_eq!(LocalProgress::Running(0.4).ramp(), 0.4);
    }
}
