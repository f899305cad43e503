//! Threshold ranges in the usual monitoring plugin notation.

use std::fmt;
use std::str::FromStr;

use crate::ServiceState;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RangeError {
    #[error("empty range")]
    Empty,
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("start {start} is greater than end {end}")]
    StartAfterEnd { start: f64, end: f64 },
}

/// A threshold range of the form `[@]start:end`.
///
/// | expression | alerts if value is |
/// |------------|--------------------|
/// | `10`       | > 10               |
/// | `10:`      | < 10               |
/// | `~:10`     | > 10               |
/// | `10:20`    | < 10 or > 20       |
/// | `@10:20`   | >= 10 and <= 20    |
///
/// ```rust
/// # use check_jmx::Range;
/// let range: Range = "10:20".parse().unwrap();
/// assert!(range.alerts(25.0));
/// assert!(!range.alerts(15.0));
///
/// let inverted: Range = "@10:20".parse().unwrap();
/// assert!(inverted.alerts(15.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    start: f64,
    end: f64,
    inside: bool,
}

impl Range {
    /// Returns true if the value should raise an alert.
    pub fn alerts(&self, value: f64) -> bool {
        let outside = value < self.start || value > self.end;
        if self.inside {
            !outside
        } else {
            outside
        }
    }
}

impl FromStr for Range {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (inside, s) = match s.strip_prefix('@') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        if s.is_empty() {
            return Err(RangeError::Empty);
        }

        let (start, end) = match s.split_once(':') {
            Some((start, end)) => {
                let start = match start {
                    "~" => f64::NEG_INFINITY,
                    "" => 0.0,
                    start => parse_bound(start)?,
                };
                let end = match end {
                    "" => f64::INFINITY,
                    end => parse_bound(end)?,
                };
                (start, end)
            }
            None => (f64::NEG_INFINITY, parse_bound(s)?),
        };

        if start > end {
            return Err(RangeError::StartAfterEnd { start, end });
        }

        Ok(Range { start, end, inside })
    }
}

fn parse_bound(s: &str) -> Result<f64, RangeError> {
    s.parse::<f64>()
        .ok()
        .filter(|f| !f.is_nan())
        .ok_or_else(|| RangeError::NotANumber(s.to_owned()))
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inside {
            f.write_str("@")?;
        }
        match (self.start == f64::NEG_INFINITY, self.end == f64::INFINITY) {
            (true, true) => f.write_str("~:"),
            (true, false) => write!(f, "{}", self.end),
            (false, true) => write!(f, "{}:", self.start),
            (false, false) => write!(f, "{}:{}", self.start, self.end),
        }
    }
}

/// Warning and critical ranges of a check. Either may be absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Thresholds {
    pub warning: Option<Range>,
    pub critical: Option<Range>,
}

impl Thresholds {
    pub fn new(warning: Option<Range>, critical: Option<Range>) -> Self {
        Thresholds { warning, critical }
    }

    pub fn is_empty(&self) -> bool {
        self.warning.is_none() && self.critical.is_none()
    }

    /// Critical is checked before warning, so a value matching both is critical.
    pub fn evaluate(&self, value: f64) -> ServiceState {
        if let Some(ref critical) = self.critical {
            if critical.alerts(value) {
                return ServiceState::Critical;
            }
        }

        if let Some(ref warning) = self.warning {
            if warning.alerts(value) {
                return ServiceState::Warning;
            }
        }

        ServiceState::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(s: &str) -> Range {
        s.parse().unwrap()
    }

    #[test]
    fn test_plain_bound() {
        let r = range("10");
        assert!(!r.alerts(0.0));
        assert!(!r.alerts(10.0));
        assert!(r.alerts(10.5));
        assert!(!r.alerts(-1.0));
        assert!(!r.alerts(-1e12));

        let r = range("-1");
        assert!(r.alerts(0.0));
        assert!(!r.alerts(-1.0));
        assert!(!r.alerts(-5.0));

        let r = range("@10");
        assert!(r.alerts(-3.0));
        assert!(!r.alerts(11.0));
    }

    #[test]
    fn test_open_ranges() {
        let r = range("10:");
        assert!(r.alerts(9.9));
        assert!(!r.alerts(10.0));
        assert!(!r.alerts(1e12));

        let r = range("~:10");
        assert!(!r.alerts(-1e12));
        assert!(!r.alerts(10.0));
        assert!(r.alerts(11.0));

        let r = range(":5");
        assert!(r.alerts(-1.0));
        assert!(!r.alerts(5.0));
    }

    #[test]
    fn test_bounded_and_inverted() {
        let r = range("10:20");
        assert!(r.alerts(9.0));
        assert!(!r.alerts(10.0));
        assert!(!r.alerts(20.0));
        assert!(r.alerts(21.0));

        let r = range("@10:20");
        assert!(!r.alerts(9.0));
        assert!(r.alerts(10.0));
        assert!(r.alerts(20.0));
        assert!(!r.alerts(21.0));

        let r = range("-5:-1");
        assert!(r.alerts(0.0));
        assert!(!r.alerts(-3.0));
    }

    #[test]
    fn test_invalid_ranges() {
        assert_eq!("".parse::<Range>(), Err(RangeError::Empty));
        assert_eq!("@".parse::<Range>(), Err(RangeError::Empty));
        assert_eq!(
            "abc".parse::<Range>(),
            Err(RangeError::NotANumber("abc".to_owned()))
        );
        assert_eq!(
            "1:x".parse::<Range>(),
            Err(RangeError::NotANumber("x".to_owned()))
        );
        assert_eq!(
            "20:10".parse::<Range>(),
            Err(RangeError::StartAfterEnd {
                start: 20.0,
                end: 10.0
            })
        );
        assert_eq!(
            "5:-1".parse::<Range>(),
            Err(RangeError::StartAfterEnd {
                start: 5.0,
                end: -1.0
            })
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(&range("10").to_string(), "10");
        assert_eq!(&range("10:").to_string(), "10:");
        assert_eq!(&range("~:10").to_string(), "10");
        assert_eq!(&range("~:").to_string(), "~:");
        assert_eq!(&range("@10:20").to_string(), "@10:20");
        assert_eq!(&range("0:").to_string(), "0:");
        assert_eq!(&range(":5").to_string(), "0:5");
        assert_eq!(&range("-1").to_string(), "-1");
    }

    #[test]
    fn test_thresholds() {
        let thresholds = Thresholds::default();
        assert!(thresholds.is_empty());
        assert_eq!(thresholds.evaluate(1e9), ServiceState::Ok);

        let thresholds = Thresholds::new(Some(range("25")), Some(range("50")));
        assert_eq!(thresholds.evaluate(12.0), ServiceState::Ok);
        assert_eq!(thresholds.evaluate(42.0), ServiceState::Warning);
        assert_eq!(thresholds.evaluate(50.0), ServiceState::Warning);
        assert_eq!(thresholds.evaluate(51.0), ServiceState::Critical);

        // both match, critical wins
        let thresholds = Thresholds::new(Some(range("10")), Some(range("10")));
        assert_eq!(thresholds.evaluate(11.0), ServiceState::Critical);

        let thresholds = Thresholds::new(None, Some(range("@0:0")));
        assert_eq!(thresholds.evaluate(0.0), ServiceState::Critical);
        assert_eq!(thresholds.evaluate(1.0), ServiceState::Ok);
    }
}
