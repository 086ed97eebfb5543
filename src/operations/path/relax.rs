use super::{SearchParams, WalkOutcome};

/// Parameters of one search attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attempt {
    pub epsilon: f64,
    pub use_limit: bool,
}

/// Retry policy for a failing walk or sweep.
///
/// `EpsilonTooSmall` multiplies the tolerance by ten, `LimitTooRestrictive`
/// turns the progress limit off, and `Exhausted` (or success) ends the
/// schedule. Attempts stop at the attempt cap or once the tolerance reaches
/// the ceiling.
#[derive(Debug, Clone)]
pub struct RelaxSchedule {
    epsilon: f64,
    use_limit: bool,
    attempts: usize,
    max_attempts: usize,
    ceiling: f64,
    stopped: bool,
}

impl RelaxSchedule {
    #[must_use]
    pub fn new(epsilon: f64, max_attempts: usize, ceiling: f64) -> Self {
        Self {
            epsilon,
            use_limit: true,
            attempts: 0,
            max_attempts,
            ceiling,
            stopped: false,
        }
    }

    /// Schedule for the constrained walk.
    #[must_use]
    pub fn walk(params: &SearchParams) -> Self {
        Self::new(params.walk_epsilon, params.walk_attempts, params.epsilon_ceiling)
    }

    /// Schedule for the plane sweep.
    #[must_use]
    pub fn sweep(params: &SearchParams) -> Self {
        Self::new(params.sweep_epsilon, params.sweep_attempts, params.epsilon_ceiling)
    }

    /// Parameters for the next attempt, or `None` when the schedule is over.
    pub fn next_attempt(&mut self) -> Option<Attempt> {
        // Repeated scaling by ten drifts; compare with a relative margin.
        let at_ceiling = self.epsilon * (1.0 + 1e-6) >= self.ceiling;
        if self.stopped || self.attempts >= self.max_attempts || at_ceiling {
            return None;
        }
        self.attempts += 1;
        Some(Attempt {
            epsilon: self.epsilon,
            use_limit: self.use_limit,
        })
    }

    /// Adjusts the schedule after an attempt.
    pub fn observe(&mut self, outcome: &WalkOutcome) {
        match outcome {
            WalkOutcome::EpsilonTooSmall => self.epsilon *= 10.0,
            WalkOutcome::LimitTooRestrictive => self.use_limit = false,
            WalkOutcome::Success(_) | WalkOutcome::Exhausted => self.stopped = true,
        }
    }

    /// Number of attempts handed out so far.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epsilon_grows_until_ceiling() {
        let mut schedule = RelaxSchedule::walk(&SearchParams::default());
        let mut seen = Vec::new();
        while let Some(attempt) = schedule.next_attempt() {
            seen.push(attempt.epsilon);
            schedule.observe(&WalkOutcome::EpsilonTooSmall);
        }
        // 1e-10 .. 1e-5; the next step would reach the ceiling.
        assert_eq!(seen.len(), 6);
        assert!(seen[5] < 1e-4);
    }

    #[test]
    fn sweep_is_bounded_by_ceiling_before_attempt_cap() {
        let mut schedule = RelaxSchedule::sweep(&SearchParams::default());
        while schedule.next_attempt().is_some() {
            schedule.observe(&WalkOutcome::EpsilonTooSmall);
        }
        // 1e-8 .. 1e-5.
        assert_eq!(schedule.attempts(), 4);
    }

    #[test]
    fn limit_is_released_once() {
        let mut schedule = RelaxSchedule::walk(&SearchParams::default());
        let first = schedule.next_attempt().unwrap_or_else(|| panic!("no attempt"));
        assert!(first.use_limit);
        schedule.observe(&WalkOutcome::LimitTooRestrictive);
        let second = schedule.next_attempt().unwrap_or_else(|| panic!("no attempt"));
        assert!(!second.use_limit);
        assert!((second.epsilon - first.epsilon).abs() < f64::EPSILON);
    }

    #[test]
    fn exhausted_stops() {
        let mut schedule = RelaxSchedule::walk(&SearchParams::default());
        assert!(schedule.next_attempt().is_some());
        schedule.observe(&WalkOutcome::Exhausted);
        assert!(schedule.next_attempt().is_none());
    }
}
