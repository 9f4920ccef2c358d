use crate::gain::{Gain, FLOOR};
use std::time::Duration;
use tracing::debug;

// fade ramps always move this many dB per step, whatever the nudge size is
pub const FADE_STEP_DB: i32 = 2;

pub const DEFAULT_STEP_DB: i32 = 2;
pub const DEFAULT_STEP_DELAY_MS: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeConfig {
    pub step_size_db: i32,
    pub step_delay_ms: i64,
}

impl FadeConfig {
    pub fn new(step_size_db: i32, step_delay_ms: i64) -> FadeConfig {
        FadeConfig {
            step_size_db,
            step_delay_ms,
        }
    }

    // Non-positive values are replaced by the defaults, never passed on
    pub fn sanitized(self) -> FadeConfig {
        let step_size_db = if self.step_size_db <= 0 {
            debug!(
                "step size {} dB is not positive, using {} dB",
                self.step_size_db,
                DEFAULT_STEP_DB
            );
            DEFAULT_STEP_DB
        } else {
            self.step_size_db
        };
        let step_delay_ms = if self.step_delay_ms <= 0 {
            debug!(
                "step delay {} ms is not positive, using {} ms",
                self.step_delay_ms,
                DEFAULT_STEP_DELAY_MS
            );
            DEFAULT_STEP_DELAY_MS
        } else {
            self.step_delay_ms
        };
        FadeConfig {
            step_size_db,
            step_delay_ms,
        }
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(i64::max(1, self.sanitized().step_delay_ms) as u64)
    }
}

impl Default for FadeConfig {
    fn default() -> FadeConfig {
        FadeConfig::new(DEFAULT_STEP_DB, DEFAULT_STEP_DELAY_MS)
    }
}

/// A bounded ramp of gains between two levels.
///
/// The number of steps is fixed when the ramp is created, from the distance
/// to the target at [`FADE_STEP_DB`] per step. Iteration ends when either the
/// steps run out or the target is reached; [`Fader::reached_target`] tells
/// which one happened.
#[derive(Debug, Clone)]
pub struct Fader {
    value: Gain,
    target: Gain,
    step_per_call: i32,
    steps_left: i32,
}

impl Fader {
    // ramps down to the floor
    pub fn fade_out(from: Gain) -> Fader {
        Fader {
            value: from,
            target: FLOOR,
            step_per_call: -FADE_STEP_DB,
            steps_left: i32::max(1, (from.db() - FLOOR.db()) / FADE_STEP_DB),
        }
    }

    // ramps up to `to`; does nothing when already at or above it
    pub fn fade_in(from: Gain, to: Gain) -> Fader {
        Fader {
            value: from,
            target: to,
            step_per_call: FADE_STEP_DB,
            steps_left: i32::max(1, (to.db() - from.db()) / FADE_STEP_DB),
        }
    }

    pub fn value(&self) -> Gain {
        self.value
    }

    pub fn target(&self) -> Gain {
        self.target
    }

    pub fn steps_left(&self) -> i32 {
        self.steps_left
    }

    pub fn reached_target(&self) -> bool {
        self.value == self.target
    }

    fn short_of_target(&self) -> bool {
        if self.step_per_call < 0 {
            self.value > self.target
        } else {
            self.value < self.target
        }
    }
}

impl Iterator for Fader {
    type Item = Gain;

    fn next(&mut self) -> Option<Gain> {
        if self.steps_left <= 0 || !self.short_of_target() {
            return None;
        }
        let next = self.value.saturating_add(self.step_per_call);
        self.value = if self.step_per_call < 0 {
            Gain::max(next, self.target)
        } else {
            Gain::min(next, self.target)
        };
        self.steps_left -= 1;
        Some(self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gain::CEILING;

    #[test]
    fn sanitized_replaces_non_positive_values() {
        let config = FadeConfig::new(0, -5).sanitized();
        assert_eq!(config.step_size_db, DEFAULT_STEP_DB);
        assert_eq!(config.step_delay_ms, DEFAULT_STEP_DELAY_MS);

        let config = FadeConfig::new(3, 5).sanitized();
        assert_eq!(config, FadeConfig::new(3, 5));
    }

    #[test]
    fn step_delay() {
        assert_eq!(FadeConfig::new(2, 0).step_delay(), Duration::from_millis(20));
        assert_eq!(FadeConfig::new(2, 7).step_delay(), Duration::from_millis(7));
    }

    #[test]
    fn fade_out_from_even_level_ends_on_floor() {
        let mut fader = Fader::fade_out(Gain::new(-40));
        assert_eq!(fader.steps_left(), 30);
        let steps: Vec<i32> = fader.by_ref().map(Gain::db).collect();
        assert_eq!(steps.len(), 30);
        assert_eq!(steps[0], -42);
        assert_eq!(*steps.last().unwrap(), -100);
        assert!(fader.reached_target());
    }

    #[test]
    fn fade_out_from_odd_level_runs_out_of_steps() {
        let mut fader = Fader::fade_out(Gain::new(-41));
        let steps: Vec<i32> = fader.by_ref().map(Gain::db).collect();
        assert_eq!(steps.len(), 29);
        assert_eq!(fader.value().db(), -99);
        assert!(!fader.reached_target());
    }

    #[test]
    fn fade_out_at_floor_is_empty() {
        let mut fader = Fader::fade_out(FLOOR);
        assert_eq!(fader.next(), None);
        assert!(fader.reached_target());
    }

    #[test]
    fn fade_in_caps_at_target() {
        let mut fader = Fader::fade_in(Gain::new(-100), Gain::new(-95));
        let steps: Vec<i32> = fader.by_ref().map(Gain::db).collect();
        assert_eq!(steps, vec![-98, -96]);
        assert!(!fader.reached_target());

        let fader = Fader::fade_in(Gain::new(-6), CEILING);
        let steps: Vec<i32> = fader.map(Gain::db).collect();
        assert_eq!(steps, vec![-4, -2, 0]);
    }

    #[test]
    fn fade_in_never_moves_down() {
        let mut fader = Fader::fade_in(Gain::new(-10), Gain::new(-30));
        assert_eq!(fader.next(), None);
        assert_eq!(fader.value().db(), -10);
    }
}
