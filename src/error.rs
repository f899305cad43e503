use crate::object_name::ObjectNameError;
use crate::range::RangeError;

/// Problems with the command input. These are always detected before any connection is made.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0}")]
    Usage(String),
    #[error("invalid object name: {0}")]
    ObjectName(#[from] ObjectNameError),
    #[error("invalid {kind} threshold: {source}")]
    Threshold {
        kind: &'static str,
        #[source]
        source: RangeError,
    },
    #[error("either an attribute (-A) or an operation (-M) is required")]
    MissingSelector,
    #[error("invalid default value '{0}': not a number")]
    InvalidDefault(String),
    #[error("username and password must be given together")]
    PartialCredentials,
}

/// Failures talking to the remote management endpoint.
#[derive(Debug, thiserror::Error)]
pub enum JmxError {
    #[error("invalid service url '{url}': {reason}")]
    InvalidServiceUrl { url: String, reason: String },
    #[error("unsupported protocol '{0}'")]
    UnsupportedProtocol(String),
    #[error("cannot connect to {address}: {reason}")]
    Connection { address: String, reason: String },
    #[error("authentication rejected by {0}")]
    AuthenticationRejected(String),
    #[error("instance not found: {0}")]
    InstanceNotFound(String),
    #[error("attribute not found: {0}")]
    AttributeNotFound(String),
    #[error("reading '{attribute}' failed: {reason}")]
    Read { attribute: String, reason: String },
    #[error("invocation of '{operation}' failed: {reason}")]
    Invocation { operation: String, reason: String },
}

impl JmxError {
    /// True if the object or the attribute does not exist on the remote side.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            JmxError::InstanceNotFound(_) | JmxError::AttributeNotFound(_)
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Jmx(#[from] JmxError),
}
