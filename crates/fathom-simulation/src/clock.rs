/// Frame clock: converts wall-clock frame timestamps into clamped steps and
/// keeps simulation time.
///
/// Every timer in the simulation reads [`SimClock::now_ms`], which only
/// advances by clamped steps, so a long pause never skips a fade or expiry.
#[derive(Debug, Clone)]
pub struct SimClock {
    frame: u64,
    now_ms: f64,
    last_frame_ms: Option<f64>,
    dt: f32,
    max_delta_ms: f64,
    default_delta_ms: f64,
}

impl SimClock {
    /// Create a clock at frame 0 with the given step limits.
    pub fn new(max_delta_ms: f64, default_delta_ms: f64) -> Self {
        Self {
            frame: 0,
            now_ms: 0.0,
            last_frame_ms: None,
            dt: 0.0,
            max_delta_ms,
            default_delta_ms,
        }
    }

    /// Advance to the frame stamped `frame_ms`. Returns the step in seconds.
    ///
    /// The first frame uses the default step; later frames use the spacing
    /// from the previous stamp, clamped to `[0, max_delta_ms]`.
    pub fn advance(&mut self, frame_ms: f64) -> f32 {
        let raw = match self.last_frame_ms {
            Some(last) => frame_ms - last,
            None => self.default_delta_ms,
        };
        let step = if raw.is_finite() {
            raw.clamp(0.0, self.max_delta_ms.max(0.0))
        } else {
            0.0
        };
        self.last_frame_ms = Some(frame_ms);
        self.now_ms += step;
        self.frame += 1;
        self.dt = (step / 1000.0) as f32;
        self.dt
    }

    /// Number of frames advanced.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Simulation time in milliseconds.
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Step of the latest frame in seconds.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Back to frame 0, keeping the step limits.
    pub fn reset(&mut self) {
        *self = Self::new(self.max_delta_ms, self.default_delta_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn clock_initial_state() {
        let clock = SimClock::new(100.0, 16.0);
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.now_ms(), 0.0);
    }

    #[test]
    fn first_frame_uses_default_step() {
        let mut clock = SimClock::new(100.0, 16.0);
        let dt = clock.advance(5_000.0);
        assert!((dt - 0.016).abs() < 1e-6);
        assert!((clock.now_ms() - 16.0).abs() < f64::EPSILON);
    }

    #[test]
    fn long_gaps_are_clamped() {
        let mut clock = SimClock::new(100.0, 16.0);
        clock.advance(0.0);
        let dt = clock.advance(3_000.0);
        assert!((dt - 0.1).abs() < 1e-6);
        assert_eq!(clock.frame(), 2);
        assert!((clock.now_ms() - 116.0).abs() < 1e-9);
    }

    #[test]
    fn backwards_stamps_do_not_rewind() {
        let mut clock = SimClock::new(100.0, 16.0);
        clock.advance(1_000.0);
        let dt = clock.advance(900.0);
        assert_eq!(dt, 0.0);
        assert!((clock.now_ms() - 16.0).abs() < f64::EPSILON);
    }

    #[test]
    fn reset_returns_to_zero() {
        let mut clock = SimClock::new(100.0, 16.0);
        clock.advance(0.0);
        clock.advance(20.0);
        clock.reset();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.now_ms(), 0.0);
        let dt = clock.advance(50_000.0);
        assert!((dt - 0.016).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn steps_stay_within_limits(stamps in proptest::collection::vec(-1e6f64..1e6, 1..50)) {
            let mut clock = SimClock::new(100.0, 16.0);
            let mut last_now = 0.0;
            for stamp in stamps {
                let dt = clock.advance(stamp);
                prop_assert!((0.0..=0.1 + 1e-6).contains(&dt));
                prop_assert!(clock.now_ms() >= last_now);
                last_now = clock.now_ms();
            }
        }
    }
}
