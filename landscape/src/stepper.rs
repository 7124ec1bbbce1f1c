use std::time::Duration;

/// Converts variable frame times into a whole number of fixed physics steps.
///
/// Leftover time is carried to the next frame. When a frame is so long that it would need more
/// than `max_substeps` steps, the surplus is dropped instead of being queued forever.
#[derive(Clone, Debug)]
pub struct FixedStepper {
    step: Duration,
    max_substeps: u32,
    accumulator: Duration,
}

impl FixedStepper {
    pub fn new(step: Duration, max_substeps: u32) -> Self {
        Self {
            step,
            max_substeps: max_substeps.max(1),
            accumulator: Duration::ZERO,
        }
    }

    /// Fixed step length in seconds.
    #[inline]
    pub fn step_secs(&self) -> f32 {
        self.step.as_secs_f32()
    }

    /// Time accumulated but not yet simulated.
    #[inline]
    pub fn pending(&self) -> Duration {
        self.accumulator
    }

    /// Add a frame's elapsed time and return how many fixed steps to run now.
    ///
    /// A zero step length never runs a step.
    pub fn advance(&mut self, frame: Duration) -> u32 {
        if self.step.is_zero() {
            return 0;
        }
        self.accumulator += frame;

        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_substeps {
            self.accumulator -= self.step;
            steps += 1;
        }

        if self.accumulator >= self.step {
            log::warn!(
                "physics falling behind, dropping {:?} of simulation time",
                self.accumulator
            );
            // Keep the sub-step remainder so the cadence stays smooth.
            self.accumulator = Duration::from_nanos(
                (self.accumulator.as_nanos() % self.step.as_nanos()) as u64,
            );
        }

        steps
    }

    /// Forget any accumulated time.
    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
    }
}
