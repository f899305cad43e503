//! What to fetch from the remote object and how to label it.

use crate::{JmxError, JmxValue, ObjectName, ServerConnection};

/// The label used when reporting the result of an operation.
pub const OPERATION_LABEL: &str = "null";

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Read an attribute. With a key, a single item of a composite attribute is read.
    Attribute { name: String, key: Option<String> },
    /// Invoke an operation without arguments.
    Operation { name: String },
}

impl Query {
    pub fn is_attribute(&self) -> bool {
        matches!(self, Query::Attribute { .. })
    }

    /// The label shown in the status line.
    pub fn label(&self) -> String {
        match self {
            Query::Attribute { name, key: None } => name.clone(),
            Query::Attribute {
                name,
                key: Some(key),
            } => format!("{}.{}", name, key),
            Query::Operation { .. } => OPERATION_LABEL.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub object: ObjectName,
    pub query: Query,
}

/// Runs the query of the target against the connection.
pub fn execute(connection: &dyn ServerConnection, target: &Target) -> Result<JmxValue, JmxError> {
    match target.query {
        Query::Attribute { ref name, ref key } => {
            tracing::debug!(object = %target.object, attribute = %name, "reading attribute");
            let value = connection.get_attribute(&target.object, name)?;

            match key {
                None => Ok(value),
                Some(key) => value
                    .composite_key(key)
                    .cloned()
                    .ok_or_else(|| JmxError::AttributeNotFound(format!("{}.{}", name, key))),
            }
        }
        Query::Operation { ref name } => {
            tracing::debug!(object = %target.object, operation = %name, "invoking operation");
            connection.invoke(&target.object, name, &[], &[])
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::provider::MockServerConnection;

    fn target(query: Query) -> Target {
        Target {
            object: "foo:bar=x".parse().unwrap(),
            query,
        }
    }

    fn attribute(name: &str, key: Option<&str>) -> Query {
        Query::Attribute {
            name: name.to_owned(),
            key: key.map(|k| k.to_owned()),
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(&attribute("baz", None).label(), "baz");
        assert_eq!(
            &attribute("HeapMemoryUsage", Some("used")).label(),
            "HeapMemoryUsage.used"
        );
        assert_eq!(
            &Query::Operation {
                name: "gc".to_owned()
            }
            .label(),
            "null"
        );
    }

    #[test]
    fn test_read_attribute() {
        let mut connection = MockServerConnection::new();
        connection
            .expect_get_attribute()
            .withf(|name, attribute| name.to_string() == "foo:bar=x" && attribute == "baz")
            .times(1)
            .returning(|_, _| Ok(JmxValue::Integer(42)));

        let value = execute(&connection, &target(attribute("baz", None))).unwrap();
        assert_eq!(value, JmxValue::Integer(42));
    }

    #[test]
    fn test_read_composite_key() {
        let mut connection = MockServerConnection::new();
        connection.expect_get_attribute().returning(|_, _| {
            let mut items = BTreeMap::new();
            items.insert("used".to_owned(), JmxValue::Integer(12));
            Ok(JmxValue::Composite(items))
        });

        let value = execute(&connection, &target(attribute("Heap", Some("used")))).unwrap();
        assert_eq!(value, JmxValue::Integer(12));

        let err = execute(&connection, &target(attribute("Heap", Some("max")))).unwrap_err();
        assert!(matches!(err, JmxError::AttributeNotFound(ref a) if a == "Heap.max"));
    }

    #[test]
    fn test_invoke_without_arguments() {
        let mut connection = MockServerConnection::new();
        connection
            .expect_invoke()
            .withf(|name, operation, params, signature| {
                name.to_string() == "foo:bar=x"
                    && operation == "test"
                    && params.is_empty()
                    && signature.is_empty()
            })
            .times(1)
            .returning(|_, _, _, _| Ok(JmxValue::Null));

        let value = execute(
            &connection,
            &target(Query::Operation {
                name: "test".to_owned(),
            }),
        )
        .unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn test_errors_propagate() {
        let mut connection = MockServerConnection::new();
        connection
            .expect_get_attribute()
            .returning(|name, _| Err(JmxError::InstanceNotFound(name.to_string())));

        let err = execute(&connection, &target(attribute("baz", None))).unwrap_err();
        assert!(err.is_not_found());
    }
}
