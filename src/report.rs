use std::fmt;

use crate::ServiceState;

const PREFIX: &str = "JMX";

/// The single status line of a check run.
///
/// ```rust
/// # use check_jmx::{Report, ServiceState};
/// let report = Report::new(ServiceState::Warning, "baz", "42");
/// assert_eq!(&report.to_string(), "JMX WARNING - baz=42 | baz=42");
/// assert_eq!(report.exit_code(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    state: ServiceState,
    body: Body,
}

#[derive(Debug, Clone, PartialEq)]
enum Body {
    Metric {
        label: String,
        value: String,
        perf_data: bool,
    },
    Diagnostic(String),
}

impl Report {
    /// A report with a performance data segment.
    pub fn new(state: ServiceState, label: &str, value: &str) -> Report {
        Report {
            state,
            body: Body::Metric {
                label: label.to_owned(),
                value: value.to_owned(),
                perf_data: true,
            },
        }
    }

    /// A report without performance data, used for operation results.
    pub fn without_perf_data(state: ServiceState, label: &str, value: &str) -> Report {
        Report {
            state,
            body: Body::Metric {
                label: label.to_owned(),
                value: value.to_owned(),
                perf_data: false,
            },
        }
    }

    /// An unknown state carrying an error message. The message is folded onto a single line.
    pub fn unknown(message: &str) -> Report {
        Report {
            state: ServiceState::Unknown,
            body: Body::Diagnostic(message.split_whitespace().collect::<Vec<_>>().join(" ")),
        }
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }

    pub fn exit_code(&self) -> i32 {
        self.state.exit_code()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} - ", PREFIX, self.state)?;

        match self.body {
            Body::Metric {
                ref label,
                ref value,
                perf_data,
            } => {
                write!(f, "{}={}", label, value)?;
                if perf_data {
                    write!(f, " | {}={}", perf_label(label), value)?;
                }
                Ok(())
            }
            Body::Diagnostic(ref message) => f.write_str(message),
        }
    }
}

fn perf_label(label: &str) -> String {
    // replace `=`
    let name = label.replace('=', "_");

    // quote `'`
    let name = name.replace('\'', "''");

    // quote if contains spaces
    if name.contains(' ') {
        format!("'{}'", name)
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_report() {
        let report = Report::new(ServiceState::Ok, "baz", "42");
        assert_eq!(&report.to_string(), "JMX OK - baz=42 | baz=42");
        assert_eq!(report.state(), ServiceState::Ok);

        let report = Report::new(ServiceState::Critical, "Heap.used", "-1");
        assert_eq!(&report.to_string(), "JMX CRITICAL - Heap.used=-1 | Heap.used=-1");
        assert_eq!(report.exit_code(), 2);
    }

    #[test]
    fn test_operation_report() {
        let report = Report::without_perf_data(ServiceState::Ok, "null", "null");
        assert_eq!(&report.to_string(), "JMX OK - null=null");
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_unknown_report() {
        let report = Report::unknown("attribute not found: baz");
        assert_eq!(&report.to_string(), "JMX UNKNOWN - attribute not found: baz");
        assert_eq!(report.exit_code(), 3);

        let report = Report::unknown("first line\n  second\tline\n");
        assert_eq!(&report.to_string(), "JMX UNKNOWN - first line second line");
    }

    #[test]
    fn test_perf_label_escaping() {
        let test_data = [
            ("test", "JMX OK - test=0 | test=0"),
            ("test=a", "JMX OK - test=a=0 | test_a=0"),
            ("te'st", "JMX OK - te'st=0 | te''st=0"),
            ("te st", "JMX OK - te st=0 | 'te st'=0"),
        ];
        for (label, expected_string) in &test_data {
            let report = Report::new(ServiceState::Ok, label, "0");
            assert_eq!(&report.to_string(), expected_string);
        }
    }
}
