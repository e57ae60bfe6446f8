/// Pixels of virtual travel per wheel detent.
const WHEEL_STEP_PX: f64 = 100.0;

/// Exponential ease rate toward the target, per second. Roughly a tenth of
/// the remaining distance per frame at 60 fps.
const EASE_RATE: f64 = 8.0;

/// Snap-to-target threshold, in virtual pixels.
const SNAP_EPSILON: f64 = 0.05;

/// Smooth virtual scroller.
///
/// Wheel deltas accumulate into a clamped target; every tick the current
/// position decays exponentially toward it. `stop` freezes the position and
/// discards input until `start` - the modal uses this to suspend scrolling
/// without losing the resume point.
#[derive(Debug, Clone)]
pub struct SmoothScroll {
    current: f64,
    target: f64,
    max: f64,
    running: bool,
}

impl SmoothScroll {
    pub fn new(max: f64) -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            max: max.max(0.0),
            running: true,
        }
    }

    /// Feed one vertical wheel event. Horizontal input is never routed here.
    pub fn add_wheel_delta(&mut self, dy: f64) {
        if !self.running {
            return;
        }
        self.target = (self.target + dy * WHEEL_STEP_PX).clamp(0.0, self.max);
    }

    /// Re-clamp after the pinned region changed length (resize).
    pub fn set_max(&mut self, max: f64) {
        self.max = max.max(0.0);
        self.target = self.target.clamp(0.0, self.max);
        self.current = self.current.clamp(0.0, self.max);
    }

    /// Advance the easing by `dt` seconds and return the new position.
    pub fn tick(&mut self, dt: f64) -> f64 {
        if self.running && dt > 0.0 {
            let blend = 1.0 - (-EASE_RATE * dt).exp();
            self.current += (self.target - self.current) * blend;
            if (self.target - self.current).abs() < SNAP_EPSILON {
                self.current = self.target;
            }
        }
        self.current
    }

    pub fn position(&self) -> f64 {
        self.current
    }

    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1.0 / 60.0;

    #[test]
    fn test_converges_to_target() {
        let mut scroll = SmoothScroll::new(5000.0);
        for _ in 0..5 {
            scroll.add_wheel_delta(1.0);
        }
        for _ in 0..300 {
            scroll.tick(DT);
        }
        assert_eq!(scroll.position(), 500.0);
        assert!(scroll.is_settled());
    }

    #[test]
    fn test_clamps_to_limits() {
        let mut scroll = SmoothScroll::new(300.0);
        scroll.add_wheel_delta(-10.0);
        for _ in 0..200 {
            scroll.tick(DT);
        }
        assert_eq!(scroll.position(), 0.0);

        scroll.add_wheel_delta(50.0);
        for _ in 0..400 {
            scroll.tick(DT);
        }
        assert_eq!(scroll.position(), 300.0);
    }

    #[test]
    fn test_stop_freezes_and_discards_input() {
        let mut scroll = SmoothScroll::new(5000.0);
        scroll.add_wheel_delta(4.0);
        for _ in 0..30 {
            scroll.tick(DT);
        }
        let frozen = {
            scroll.stop();
            scroll.add_wheel_delta(10.0);
            let before = scroll.position();
            scroll.tick(DT);
            assert_eq!(scroll.position(), before);
            before
        };

        // Resuming continues toward the pre-stop target only.
        scroll.start();
        for _ in 0..400 {
            scroll.tick(DT);
        }
        assert!(scroll.position() >= frozen);
        assert_eq!(scroll.position(), 400.0);
    }

    #[test]
    fn test_set_max_reclamps() {
        let mut scroll = SmoothScroll::new(5000.0);
        scroll.add_wheel_delta(30.0);
        for _ in 0..600 {
            scroll.tick(DT);
        }
        assert_eq!(scroll.position(), 3000.0);

        scroll.set_max(1000.0);
        assert_eq!(scroll.position(), 1000.0);
        assert!(scroll.is_settled());
    }
}
