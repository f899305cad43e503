//! The command line of the check and its validation into a [CheckConfig].

use std::ffi::OsString;
use std::time::Duration;

use crate::query::{Query, Target};
use crate::{
    ConfigError, ConnectorEnvironment, Credentials, JmxValue, ObjectName, Range, Thresholds,
};

/// Single dash long options as understood by older check_jmx versions.
const LEGACY_LONG_FLAGS: [&str; 4] = ["-username", "-password", "-default", "-help"];

#[derive(Debug, clap::Parser)]
#[command(name = "check_jmx", version)]
#[command(about = "Reads a JMX attribute or invokes a JMX operation and reports it as a nagios check")]
pub struct Cli {
    /// JMX service url, e.g. service:jmx:jolokia://localhost:8778/jolokia
    #[arg(short = 'U', long)]
    pub url: String,

    /// Object name of the MBean, e.g. java.lang:type=Memory
    #[arg(short = 'O', long)]
    pub object: String,

    /// Attribute to read
    #[arg(short = 'A', long)]
    pub attribute: Option<String>,

    /// Item to pick from a composite attribute, e.g. used
    #[arg(short = 'K', long)]
    pub attribute_key: Option<String>,

    /// Operation without arguments to invoke
    #[arg(short = 'M', long)]
    pub operation: Option<String>,

    /// Warning threshold range
    #[arg(short = 'w', long, allow_hyphen_values = true)]
    pub warning: Option<String>,

    /// Critical threshold range
    #[arg(short = 'c', long, allow_hyphen_values = true)]
    pub critical: Option<String>,

    /// Value to report if the object or attribute doesn't exist
    #[arg(long, allow_negative_numbers = true)]
    pub default: Option<String>,

    /// Username for the connection
    #[arg(long, env = "CHECK_JMX_USERNAME")]
    pub username: Option<String>,

    /// Password for the connection
    #[arg(long, env = "CHECK_JMX_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Connection timeout in seconds, 0 disables it
    #[arg(short = 't', long, default_value_t = 10)]
    pub timeout: u64,

    /// Log more details to stderr, may be repeated
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Rewrites the single dash long options of older check_jmx versions (`-username`, `-password`,
/// `-default`, `-help`) to their double dash form.
pub fn normalize_legacy_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| match arg.to_str() {
            Some(s) if LEGACY_LONG_FLAGS.contains(&s) => OsString::from(format!("-{}", s)),
            _ => arg,
        })
        .collect()
}

/// Everything needed for one check run, validated before any connection is made.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckConfig {
    pub url: String,
    pub target: Target,
    pub thresholds: Thresholds,
    pub default: Option<JmxValue>,
    pub env: ConnectorEnvironment,
}

impl TryFrom<Cli> for CheckConfig {
    type Error = ConfigError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let object: ObjectName = cli.object.parse()?;

        let query = match (cli.operation, cli.attribute) {
            (Some(operation), attribute) => {
                if attribute.is_some() {
                    tracing::warn!("both attribute and operation given, invoking the operation");
                }
                Query::Operation { name: operation }
            }
            (None, Some(attribute)) => Query::Attribute {
                name: attribute,
                key: cli.attribute_key,
            },
            (None, None) => return Err(ConfigError::MissingSelector),
        };

        let thresholds = Thresholds::new(
            parse_range("warning", cli.warning.as_deref())?,
            parse_range("critical", cli.critical.as_deref())?,
        );

        let default = cli
            .default
            .map(|d| JmxValue::parse_number(&d).ok_or(ConfigError::InvalidDefault(d)))
            .transpose()?;

        let credentials = match (cli.username, cli.password) {
            (Some(username), Some(password)) => Some(Credentials::new(&username, &password)),
            (None, None) => None,
            _ => return Err(ConfigError::PartialCredentials),
        };

        Ok(CheckConfig {
            url: cli.url,
            target: Target { object, query },
            thresholds,
            default,
            env: ConnectorEnvironment {
                credentials,
                timeout: (cli.timeout > 0).then(|| Duration::from_secs(cli.timeout)),
            },
        })
    }
}

fn parse_range(kind: &'static str, expression: Option<&str>) -> Result<Option<Range>, ConfigError> {
    expression
        .map(|e| e.parse().map_err(|source| ConfigError::Threshold { kind, source }))
        .transpose()
}
