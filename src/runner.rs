use std::ffi::OsString;
use std::io::Write;

use clap::error::ErrorKind;
use clap::Parser;

use crate::cli::{normalize_legacy_args, CheckConfig, Cli};
use crate::query::{self, Query};
use crate::{
    CheckError, ConfigError, ConnectionProvider, JmxError, JmxValue, Report, ServerConnection,
    ServiceState, ServiceUrl,
};

/// The stages of a single check run. Errors from any stage end up in [Stage::Errored].
enum Stage {
    Start,
    Connected(Box<dyn ServerConnection>),
    Queried(JmxValue),
    Evaluated(ServiceState, JmxValue),
    Errored(CheckError),
}

/// Runs one connect, query, evaluate and report cycle and writes exactly one status line.
pub struct CommandRunner<P, W> {
    provider: P,
    out: W,
}

impl<P: ConnectionProvider, W: Write> CommandRunner<P, W> {
    pub fn new(provider: P, out: W) -> Self {
        Self { provider, out }
    }

    /// Parses the arguments (including the program name), runs the check, prints the status
    /// line and returns the exit code.
    pub fn run_command<I, T>(&mut self, args: I) -> i32
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let report = match Cli::try_parse_from(normalize_legacy_args(args)) {
            Ok(cli) => match CheckConfig::try_from(cli) {
                Ok(config) => self.check(&config),
                Err(err) => Self::error_report(err.into()),
            },
            Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                let rendered = err.render().to_string();
                // stdout only ever carries the status line, the full help goes to stderr
                if err.kind() == ErrorKind::DisplayHelp {
                    eprint!("{}", rendered);
                }
                Report::unknown(rendered.lines().next().unwrap_or_default())
            }
            Err(err) => Self::error_report(ConfigError::Usage(usage_message(&err)).into()),
        };

        if let Err(e) = writeln!(self.out, "{}", report).and_then(|_| self.out.flush()) {
            tracing::error!("failed to write report: {}", e);
        }
        tracing::info!(state = %report.state(), "check finished");

        report.exit_code()
    }

    /// Runs the check for an already validated config.
    pub fn check(&self, config: &CheckConfig) -> Report {
        let mut stage = Stage::Start;

        loop {
            stage = match stage {
                Stage::Start => match self.connect(config) {
                    Ok(connection) => Stage::Connected(connection),
                    Err(err) => Stage::Errored(err.into()),
                },
                Stage::Connected(connection) => {
                    match query::execute(connection.as_ref(), &config.target) {
                        Ok(value) => Stage::Queried(value),
                        Err(err) if err.is_not_found() && config.target.query.is_attribute() => {
                            match config.default {
                                Some(ref default) => {
                                    tracing::info!("{}, using default value {}", err, default);
                                    Stage::Queried(default.clone())
                                }
                                None => Stage::Errored(err.into()),
                            }
                        }
                        Err(err) => Stage::Errored(err.into()),
                    }
                }
                Stage::Queried(value) => match (&config.target.query, value.as_f64()) {
                    (Query::Attribute { .. }, Some(number)) => {
                        let state = config.thresholds.evaluate(number);
                        tracing::debug!(value = number, %state, "evaluated thresholds");
                        Stage::Evaluated(state, value)
                    }
                    (Query::Attribute { .. }, None) => {
                        if !config.thresholds.is_empty() {
                            tracing::warn!("'{}' is not numeric, ignoring thresholds", value);
                        }
                        Stage::Evaluated(ServiceState::Ok, value)
                    }
                    (Query::Operation { .. }, _) => {
                        return Report::without_perf_data(
                            ServiceState::Ok,
                            &config.target.query.label(),
                            &value.to_string(),
                        )
                    }
                },
                Stage::Evaluated(state, value) => {
                    return Report::new(state, &config.target.query.label(), &value.to_string())
                }
                Stage::Errored(err) => return Self::error_report(err),
            }
        }
    }

    fn connect(&self, config: &CheckConfig) -> Result<Box<dyn ServerConnection>, JmxError> {
        let url: ServiceUrl = config.url.parse()?;
        tracing::debug!(%url, "connecting");

        let connector = self.provider.connector(&url, &config.env)?;
        connector.server_connection()
    }

    fn error_report(err: CheckError) -> Report {
        tracing::warn!("check failed: {}", err);
        Report::unknown(&err.to_string())
    }
}

/// The first paragraph of a clap error without its `error: ` prefix.
fn usage_message(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    let paragraph = rendered.split("\n\n").next().unwrap_or_default();
    paragraph
        .strip_prefix("error: ")
        .unwrap_or(paragraph)
        .to_owned()
}
