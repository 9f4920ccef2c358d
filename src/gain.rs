use std::fmt;

// Integer decibel gain, always within [FLOOR, CEILING]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Gain(i32);

pub const FLOOR: Gain = Gain(-100);
pub const CEILING: Gain = Gain(0);

impl Gain {
    pub fn new(db: i32) -> Gain {
        Gain(db.clamp(FLOOR.0, CEILING.0))
    }

    /// Converts a backend reading to whole decibels the way the control
    /// protocol values were always read: nearest integer, ties to even.
    /// Non-finite readings mean silence.
    pub fn round_db(db: f64) -> i32 {
        if !db.is_finite() {
            return FLOOR.0;
        }
        // saturates outside the i32 range
        db.round_ties_even() as i32
    }

    pub fn from_db(db: f64) -> Gain {
        Gain::new(Gain::round_db(db))
    }

    pub fn db(self) -> i32 {
        self.0
    }

    pub fn saturating_add(self, db: i32) -> Gain {
        Gain::new(self.0.saturating_add(db))
    }

    pub fn saturating_sub(self, db: i32) -> Gain {
        Gain::new(self.0.saturating_sub(db))
    }
}

impl Default for Gain {
    fn default() -> Gain {
        CEILING
    }
}

impl fmt::Display for Gain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} dB", self.0)
    }
}

impl From<i32> for Gain {
    fn from(db: i32) -> Gain {
        Gain::new(db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_to_domain() {
        assert_eq!(Gain::new(5).db(), 0);
        assert_eq!(Gain::new(-101).db(), -100);
        assert_eq!(Gain::new(-40).db(), -40);
    }

    #[test]
    fn rounding_prefers_even() {
        assert_eq!(Gain::round_db(-40.5), -40);
        assert_eq!(Gain::round_db(-41.5), -42);
        assert_eq!(Gain::round_db(-12.7), -13);
        assert_eq!(Gain::round_db(3.2), 3);
    }

    #[test]
    fn silence_readings_map_to_floor() {
        assert_eq!(Gain::from_db(f64::NEG_INFINITY), FLOOR);
        assert_eq!(Gain::from_db(f64::NAN), FLOOR);
        assert_eq!(Gain::from_db(-250.0), FLOOR);
    }

    #[test]
    fn huge_readings_saturate() {
        assert_eq!(Gain::round_db(-1e12), i32::MIN);
        assert_eq!(Gain::round_db(1e12), i32::MAX);
        assert_eq!(Gain::from_db(1e12), CEILING);
    }

    #[test]
    fn saturating_steps_stay_in_domain() {
        assert_eq!(Gain::new(-99).saturating_sub(2), FLOOR);
        assert_eq!(Gain::new(-1).saturating_add(2), CEILING);
        assert_eq!(CEILING.saturating_add(i32::MAX), CEILING);
    }
}
