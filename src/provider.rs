//! The seam between the check and the remote management endpoint.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;
use reqwest::Url;

use crate::{JmxError, JmxValue, ObjectName};

const SERVICE_URL_PREFIX: &str = "service:jmx:";

/// A JMX service url: `service:jmx:<protocol>://[host[:port]][url-path]`.
///
/// Everything after the `service:jmx:` prefix is parsed as a regular url.
///
/// ```rust
/// # use check_jmx::ServiceUrl;
/// let url: ServiceUrl = "service:jmx:jolokia://localhost:8778/jolokia".parse().unwrap();
/// assert_eq!(url.protocol(), "jolokia");
/// assert_eq!(url.host(), "localhost");
/// assert_eq!(url.port(), Some(8778));
/// assert_eq!(url.path(), "/jolokia");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUrl(Url);

impl ServiceUrl {
    pub fn protocol(&self) -> &str {
        self.0.scheme()
    }

    /// The host, empty if the url has none (e.g. `service:jmx:rmi:///jndi/...`).
    pub fn host(&self) -> &str {
        self.0.host_str().unwrap_or_default()
    }

    pub fn port(&self) -> Option<u16> {
        self.0.port()
    }

    pub fn path(&self) -> &str {
        self.0.path()
    }
}

impl FromStr for ServiceUrl {
    type Err = JmxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| JmxError::InvalidServiceUrl {
            url: s.to_owned(),
            reason,
        };

        let rest = s
            .strip_prefix(SERVICE_URL_PREFIX)
            .ok_or_else(|| invalid("must start with 'service:jmx:'".to_owned()))?;
        let url = Url::parse(rest).map_err(|e| invalid(e.to_string()))?;

        if !url.has_authority() {
            return Err(invalid("missing '://' after the protocol".to_owned()));
        }

        Ok(ServiceUrl(url))
    }
}

impl fmt::Display for ServiceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", SERVICE_URL_PREFIX, self.0)
    }
}

/// A username and password pair. The password never shows up in debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Credentials {
            username: username.to_owned(),
            password: password.to_owned(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// The credentials in the order connectors expect them: `[username, password]`.
    pub fn as_pair(&self) -> [&str; 2] {
        [&self.username, &self.password]
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Settings handed to a [ConnectionProvider] when connecting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectorEnvironment {
    pub credentials: Option<Credentials>,
    pub timeout: Option<Duration>,
}

/// Produces connectors for a service url. Implementations own the actual transport.
#[cfg_attr(test, automock)]
pub trait ConnectionProvider {
    fn connector(
        &self,
        url: &ServiceUrl,
        env: &ConnectorEnvironment,
    ) -> Result<Box<dyn Connector>, JmxError>;
}

/// An established session with a remote endpoint.
#[cfg_attr(test, automock)]
pub trait Connector {
    fn server_connection(&self) -> Result<Box<dyn ServerConnection>, JmxError>;
}

/// Attribute and operation access on a connected endpoint.
#[cfg_attr(test, automock)]
pub trait ServerConnection {
    fn get_attribute(&self, name: &ObjectName, attribute: &str) -> Result<JmxValue, JmxError>;

    /// Invokes an operation. A void operation returns [JmxValue::Null].
    fn invoke(
        &self,
        name: &ObjectName,
        operation: &str,
        params: &[JmxValue],
        signature: &[String],
    ) -> Result<JmxValue, JmxError>;
}
