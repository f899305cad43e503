//! The check_jmx crate reads a single JMX attribute (or invokes a single zero-argument operation)
//! and reports the result the way nagios and icinga expect it from a check plugin.
//!
//! ```rust
//! # use check_jmx::{CommandRunner, ConnectionProvider, Connector, ConnectorEnvironment, JmxError, ServiceUrl};
//! // A provider which can't reach anything. Real checks use the JolokiaProvider.
//! struct Offline;
//!
//! impl ConnectionProvider for Offline {
//!     fn connector(
//!         &self,
//!         url: &ServiceUrl,
//!         _env: &ConnectorEnvironment,
//!     ) -> Result<Box<dyn Connector>, JmxError> {
//!         Err(JmxError::Connection {
//!             address: url.to_string(),
//!             reason: "offline".to_owned(),
//!         })
//!     }
//! }
//!
//! let mut out = Vec::new();
//! let code = CommandRunner::new(Offline, &mut out).run_command([
//!     "check_jmx", "-U", "service:jmx:jolokia://localhost:8778/jolokia", "-O", "foo:bar=x", "-A", "baz",
//! ]);
//!
//! assert_eq!(code, 3);
//! assert_eq!(
//!     String::from_utf8(out).unwrap(),
//!     "JMX UNKNOWN - cannot connect to service:jmx:jolokia://localhost:8778/jolokia: offline\n"
//! );
//! ```

use std::fmt;

pub mod cli;
pub mod config_generator;
mod error;
#[cfg(test)]
mod fake_agent;
pub mod jolokia;
mod object_name;
mod provider;
pub mod query;
mod range;
mod report;
mod runner;
mod value;

pub use crate::error::{CheckError, ConfigError, JmxError};
pub use crate::jolokia::JolokiaProvider;
pub use crate::object_name::{ObjectName, ObjectNameError};
pub use crate::provider::{
    ConnectionProvider, Connector, ConnectorEnvironment, Credentials, ServerConnection, ServiceUrl,
};
pub use crate::range::{Range, RangeError, Thresholds};
pub use crate::report::Report;
pub use crate::runner::CommandRunner;
pub use crate::value::JmxValue;

/// Represents a service state from nagios.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceState {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl ServiceState {
    /// Returns the corresponding nagios exit code to signal the service state of self.
    pub fn exit_code(&self) -> i32 {
        match self {
            ServiceState::Ok => 0,
            ServiceState::Warning => 1,
            ServiceState::Critical => 2,
            ServiceState::Unknown => 3,
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceState::Ok => "OK",
            ServiceState::Warning => "WARNING",
            ServiceState::Critical => "CRITICAL",
            ServiceState::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}
