//! Parsing of JMX object names (`domain:key=value,...`).

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObjectNameError {
    #[error("missing ':' between domain and key properties")]
    MissingColon,
    #[error("domain contains a newline")]
    InvalidDomain,
    #[error("no key properties")]
    NoKeyProperties,
    #[error("key property '{0}' has no '='")]
    MissingEquals(String),
    #[error("empty key")]
    EmptyKey,
    #[error("invalid character in key '{0}'")]
    InvalidKey(String),
    #[error("invalid value for key '{0}'")]
    InvalidValue(String),
    #[error("duplicate key '{0}'")]
    DuplicateKey(String),
    #[error("'{0}' is a pattern, not a single object")]
    Pattern(String),
}

/// The name of exactly one management object.
///
/// Patterns are rejected since a query always addresses a single object.
///
/// ```rust
/// # use check_jmx::ObjectName;
/// let name: ObjectName = "java.lang:type=GarbageCollector,name=G1".parse().unwrap();
/// assert_eq!(name.canonical_name(), "java.lang:name=G1,type=GarbageCollector");
///
/// assert!("java.lang:type=*".parse::<ObjectName>().is_err());
/// ```
#[derive(Debug, Clone, Eq)]
pub struct ObjectName {
    domain: String,
    properties: Vec<(String, String)>,
}

impl ObjectName {
    /// The name with its key properties sorted by key.
    pub fn canonical_name(&self) -> String {
        let mut properties: Vec<_> = self.properties.iter().collect();
        properties.sort_by(|a, b| a.0.cmp(&b.0));

        let properties: Vec<String> = properties
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();

        format!("{}:{}", self.domain, properties.join(","))
    }
}

impl PartialEq for ObjectName {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_name() == other.canonical_name()
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.domain)?;
        for (i, (key, value)) in self.properties.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

impl FromStr for ObjectName {
    type Err = ObjectNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (domain, properties) = s.split_once(':').ok_or(ObjectNameError::MissingColon)?;

        if domain.contains('\n') {
            return Err(ObjectNameError::InvalidDomain);
        }
        if domain.contains(['*', '?']) {
            return Err(ObjectNameError::Pattern(s.to_owned()));
        }
        if properties.is_empty() {
            return Err(ObjectNameError::NoKeyProperties);
        }

        Ok(ObjectName {
            domain: domain.to_owned(),
            properties: parse_properties(s, properties)?,
        })
    }
}

fn parse_properties(name: &str, input: &str) -> Result<Vec<(String, String)>, ObjectNameError> {
    let mut properties: Vec<(String, String)> = Vec::new();
    let mut rest = input;

    loop {
        let segment_end = rest.find(',').unwrap_or(rest.len());
        if &rest[..segment_end] == "*" {
            return Err(ObjectNameError::Pattern(name.to_owned()));
        }

        let eq = rest
            .find('=')
            .ok_or_else(|| ObjectNameError::MissingEquals(rest[..segment_end].to_owned()))?;
        let key = &rest[..eq];
        validate_key(key)?;

        let (value, remainder) = if rest[eq + 1..].starts_with('"') {
            split_quoted(name, key, &rest[eq + 1..])?
        } else {
            let value_rest = &rest[eq + 1..];
            let end = value_rest.find(',').unwrap_or(value_rest.len());
            let value = &value_rest[..end];
            validate_unquoted_value(name, key, value)?;
            (value, &value_rest[end..])
        };

        if properties.iter().any(|(k, _)| k == key) {
            return Err(ObjectNameError::DuplicateKey(key.to_owned()));
        }
        properties.push((key.to_owned(), value.to_owned()));

        match remainder.strip_prefix(',') {
            Some("") => return Err(ObjectNameError::EmptyKey),
            Some(next) => rest = next,
            None if remainder.is_empty() => break,
            None => return Err(ObjectNameError::InvalidValue(key.to_owned())),
        }
    }

    Ok(properties)
}

fn validate_key(key: &str) -> Result<(), ObjectNameError> {
    if key.is_empty() {
        return Err(ObjectNameError::EmptyKey);
    }
    if key.contains([':', ',', '=', '*', '?', '\n']) {
        return Err(ObjectNameError::InvalidKey(key.to_owned()));
    }
    Ok(())
}

fn validate_unquoted_value(name: &str, key: &str, value: &str) -> Result<(), ObjectNameError> {
    if value.contains(['*', '?']) {
        return Err(ObjectNameError::Pattern(name.to_owned()));
    }
    if value.is_empty() || value.contains([':', '=', '"', '\n']) {
        return Err(ObjectNameError::InvalidValue(key.to_owned()));
    }
    Ok(())
}

/// Splits a quoted value off the front of `input`, returning the value including its quotes.
fn split_quoted<'a>(
    name: &str,
    key: &str,
    input: &'a str,
) -> Result<(&'a str, &'a str), ObjectNameError> {
    let mut chars = input.char_indices().skip(1);

    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, '"' | '\\' | '*' | '?' | 'n')) => {}
                _ => return Err(ObjectNameError::InvalidValue(key.to_owned())),
            },
            '*' | '?' => return Err(ObjectNameError::Pattern(name.to_owned())),
            '\n' => return Err(ObjectNameError::InvalidValue(key.to_owned())),
            '"' => return Ok((&input[..=i], &input[i + 1..])),
            _ => {}
        }
    }

    // unterminated
    Err(ObjectNameError::InvalidValue(key.to_owned()))
}
