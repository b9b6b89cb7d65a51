//! Fixed-timestep accumulator

/// Converts wall-clock time into a whole number of fixed ticks.
///
/// Lag that reaches the ceiling is dropped entirely instead of being
/// replayed, so a stalled frame never triggers a burst of catch-up ticks.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    period: f64,
    max_lag: f64,
    lag: f64,
}

impl FixedTimestep {
    pub fn new(tick_rate: u32, max_lag: f64) -> Self {
        Self {
            period: 1.0 / tick_rate.max(1) as f64,
            max_lag,
            lag: 0.0,
        }
    }

    /// Add `elapsed` seconds and return how many ticks are now due
    pub fn accumulate(&mut self, elapsed: f64) -> u32 {
        self.lag += elapsed.max(0.0);
        if self.lag >= self.max_lag {
            self.lag = 0.0;
            return 0;
        }

        let mut ticks = 0;
        while self.lag >= self.period {
            self.lag -= self.period;
            ticks += 1;
        }
        ticks
    }

    pub fn reset(&mut self) {
        self.lag = 0.0;
    }

    #[inline]
    pub fn period(&self) -> f64 {
        self.period
    }

    #[inline]
    pub fn lag(&self) -> f64 {
        self.lag
    }
}
