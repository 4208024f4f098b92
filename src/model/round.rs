/// `Ended` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Running,
    Ended,
}

/// Emitted exactly once, on the tick the clock runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundEnded {
    pub final_score: u32,
}

/// Countdown driving the round from start to end.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundClock {
    duration: f32,
    time_left: f32,
    phase: RoundPhase,
}

impl RoundClock {
    /// Always starts `Running`; a zero-length round ends on its first tick.
    pub fn new(duration: f32) -> Self {
        let duration = duration.max(0.0);
        Self {
            duration,
            time_left: duration,
            phase: RoundPhase::Running,
        }
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn time_left(&self) -> f32 {
        self.time_left
    }

    /// Whole seconds remaining, rounded up for display.
    pub fn seconds_left(&self) -> u32 {
        self.time_left.ceil() as u32
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == RoundPhase::Running
    }

    /// Count down by `dt`. `score` is reported if this tick ends the round.
    pub fn tick(&mut self, dt: f32, score: u32) -> Option<RoundEnded> {
        if !self.is_running() {
            return None;
        }
        if dt > 0.0 {
            self.time_left = (self.time_left - dt).max(0.0);
        }
        if self.time_left <= 0.0 {
            self.phase = RoundPhase::Ended;
            return Some(RoundEnded { final_score: score });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn ends_exactly_once() {
        let mut clock = RoundClock::new(1.0);
        let mut ended = Vec::new();
        for tick in 0..200 {
            if let Some(end) = clock.tick(1.0 / 60.0, tick) {
                ended.push(end);
            }
        }
        assert_eq!(ended.len(), 1);
        assert_eq!(clock.phase(), RoundPhase::Ended);
        assert_eq!(clock.time_left(), 0.0);
    }

    #[test]
    fn reports_score_at_transition() {
        let mut clock = RoundClock::new(0.5);
        assert_eq!(clock.tick(0.3, 10), None);
        assert_eq!(clock.tick(0.3, 30), Some(RoundEnded { final_score: 30 }));
        assert_eq!(clock.tick(0.3, 40), None);
    }

    #[test]
    fn zero_length_round_still_signals_its_end() {
        let mut clock = RoundClock::new(0.0);
        assert!(clock.is_running());
        assert_eq!(clock.tick(0.0, 7), Some(RoundEnded { final_score: 7 }));
        assert_eq!(clock.tick(0.0, 7), None);
        assert_eq!(clock.phase(), RoundPhase::Ended);
    }

    #[test]
    fn time_never_increases() {
        let mut clock = RoundClock::new(3.0);
        let mut last = clock.time_left();
        for dt in [0.1, -0.5, 0.0, 1.0, f32::NAN, 2.5, 0.2] {
            clock.tick(dt, 0);
            assert!(clock.time_left() <= last);
            assert!(clock.time_left() >= 0.0);
            last = clock.time_left();
        }
    }

    #[rstest]
    #[case(60.0, 60)]
    #[case(59.2, 60)]
    #[case(0.01, 1)]
    #[case(0.0, 0)]
    fn display_rounds_up(#[case] left: f32, #[case] shown: u32) {
        let mut clock = RoundClock::new(60.0);
        clock.tick(60.0 - left, 0);
        assert_eq!(clock.seconds_left(), shown);
    }
}
