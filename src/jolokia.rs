//! A [ConnectionProvider] speaking the Jolokia JMX-over-HTTP protocol.
//!
//! Service urls use the protocol `jolokia` for plain http and `jolokias` for https, e.g.
//! `service:jmx:jolokia://app-server:8778/jolokia`. Without a path the agent default `/jolokia`
//! is used.

use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::{
    ConnectionProvider, Connector, ConnectorEnvironment, Credentials, JmxError, JmxValue,
    ObjectName, ServerConnection, ServiceUrl,
};

const DEFAULT_PATH: &str = "/jolokia";

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Request<'a> {
    Version,
    Read {
        mbean: String,
        attribute: &'a str,
    },
    Exec {
        mbean: String,
        operation: String,
        arguments: Vec<serde_json::Value>,
    },
}

#[derive(Debug, Deserialize)]
struct Response {
    status: u16,
    #[serde(default)]
    value: serde_json::Value,
    error_type: Option<String>,
    error: Option<String>,
}

impl Response {
    fn reason(&self) -> String {
        self.error
            .clone()
            .unwrap_or_else(|| format!("status {}", self.status))
    }

    fn error_type_is(&self, exception: &str) -> bool {
        self.error_type
            .as_deref()
            .map_or(false, |t| t.ends_with(exception))
    }
}

/// Connects to Jolokia agents over http(s) using a blocking client.
#[derive(Debug, Clone, Default)]
pub struct JolokiaProvider;

impl JolokiaProvider {
    pub fn new() -> Self {
        JolokiaProvider
    }
}

impl ConnectionProvider for JolokiaProvider {
    fn connector(
        &self,
        url: &ServiceUrl,
        env: &ConnectorEnvironment,
    ) -> Result<Box<dyn Connector>, JmxError> {
        let endpoint = endpoint_url(url)?;

        // reqwest falls back to a 30s timeout unless None is set explicitly
        let client = Client::builder()
            .user_agent(concat!("check_jmx/", env!("CARGO_PKG_VERSION")))
            .timeout(env.timeout)
            .build()
            .map_err(|e| JmxError::Connection {
                address: url.to_string(),
                reason: e.to_string(),
            })?;

        let connection = JolokiaConnection {
            client,
            endpoint,
            address: url.to_string(),
            credentials: env.credentials.clone(),
        };

        connection.handshake()?;
        tracing::info!(address = %connection.address, "connected to jolokia agent");

        Ok(Box::new(JolokiaConnector { connection }))
    }
}

/// Maps a `service:jmx:jolokia[s]://` url onto the http(s) url of the agent.
fn endpoint_url(url: &ServiceUrl) -> Result<Url, JmxError> {
    let scheme = match url.protocol() {
        "jolokia" => "http",
        "jolokias" => "https",
        other => return Err(JmxError::UnsupportedProtocol(other.to_owned())),
    };

    if url.host().is_empty() {
        return Err(JmxError::InvalidServiceUrl {
            url: url.to_string(),
            reason: "missing host".to_owned(),
        });
    }

    let port = url.port().map(|p| format!(":{}", p)).unwrap_or_default();
    let path = match url.path() {
        "" => DEFAULT_PATH,
        path => path,
    };

    Url::parse(&format!("{}://{}{}{}", scheme, url.host(), port, path)).map_err(|e| {
        JmxError::InvalidServiceUrl {
            url: url.to_string(),
            reason: e.to_string(),
        }
    })
}

struct JolokiaConnector {
    connection: JolokiaConnection,
}

impl Connector for JolokiaConnector {
    fn server_connection(&self) -> Result<Box<dyn ServerConnection>, JmxError> {
        Ok(Box::new(self.connection.clone()))
    }
}

#[derive(Clone)]
struct JolokiaConnection {
    client: Client,
    endpoint: Url,
    address: String,
    credentials: Option<Credentials>,
}

impl JolokiaConnection {
    fn handshake(&self) -> Result<(), JmxError> {
        let response = self.send(&Request::Version)?;
        if response.status != 200 {
            return Err(JmxError::Connection {
                address: self.address.clone(),
                reason: response.reason(),
            });
        }
        Ok(())
    }

    fn send(&self, request: &Request<'_>) -> Result<Response, JmxError> {
        tracing::debug!(endpoint = %self.endpoint, ?request, "sending jolokia request");

        let mut builder = self.client.post(self.endpoint.clone()).json(request);
        if let Some(ref credentials) = self.credentials {
            builder = builder.basic_auth(credentials.username(), Some(credentials.password()));
        }

        let response = builder.send().map_err(|e| self.connection_error(e.to_string()))?;
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(JmxError::AuthenticationRejected(self.address.clone()))
            }
            status if !status.is_success() => {
                return Err(self.connection_error(format!("HTTP status {}", status)))
            }
            _ => {}
        }

        let response: Response = response
            .json()
            .map_err(|e| self.connection_error(format!("invalid response: {}", e)))?;

        if matches!(response.status, 401 | 403) {
            return Err(JmxError::AuthenticationRejected(self.address.clone()));
        }

        tracing::debug!(status = response.status, "received jolokia response");
        Ok(response)
    }

    fn connection_error(&self, reason: String) -> JmxError {
        JmxError::Connection {
            address: self.address.clone(),
            reason,
        }
    }
}

impl ServerConnection for JolokiaConnection {
    fn get_attribute(&self, name: &ObjectName, attribute: &str) -> Result<JmxValue, JmxError> {
        let response = self.send(&Request::Read {
            mbean: name.to_string(),
            attribute,
        })?;

        read_result(name, attribute, response)
    }

    fn invoke(
        &self,
        name: &ObjectName,
        operation: &str,
        params: &[JmxValue],
        signature: &[String],
    ) -> Result<JmxValue, JmxError> {
        let operation = if signature.is_empty() {
            operation.to_owned()
        } else {
            format!("{}({})", operation, signature.join(","))
        };

        let response = self.send(&Request::Exec {
            mbean: name.to_string(),
            operation: operation.clone(),
            arguments: params.iter().map(to_json).collect(),
        })?;

        exec_result(name, &operation, response)
    }
}

fn read_result(name: &ObjectName, attribute: &str, response: Response) -> Result<JmxValue, JmxError> {
    if response.status == 200 {
        return Ok(response.value.into());
    }

    if response.error_type_is("InstanceNotFoundException") {
        Err(JmxError::InstanceNotFound(name.to_string()))
    } else if response.error_type_is("AttributeNotFoundException") {
        Err(JmxError::AttributeNotFound(attribute.to_owned()))
    } else {
        Err(JmxError::Read {
            attribute: attribute.to_owned(),
            reason: response.reason(),
        })
    }
}

fn exec_result(name: &ObjectName, operation: &str, response: Response) -> Result<JmxValue, JmxError> {
    if response.status == 200 {
        return Ok(response.value.into());
    }

    if response.error_type_is("InstanceNotFoundException") {
        Err(JmxError::InstanceNotFound(name.to_string()))
    } else {
        Err(JmxError::Invocation {
            operation: operation.to_owned(),
            reason: response.reason(),
        })
    }
}

fn to_json(value: &JmxValue) -> serde_json::Value {
    match value {
        JmxValue::Null => serde_json::Value::Null,
        JmxValue::Bool(b) => (*b).into(),
        JmxValue::Integer(i) => (*i).into(),
        JmxValue::Float(f) => (*f).into(),
        JmxValue::String(s) => s.as_str().into(),
        JmxValue::Array(items) => items.iter().map(to_json).collect(),
        JmxValue::Composite(items) => items
            .iter()
            .map(|(k, v)| (k.clone(), to_json(v)))
            .collect::<serde_json::Map<_, _>>()
            .into(),
    }
}
