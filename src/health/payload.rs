use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("ping response is not valid JSON: {0}")]
    Parse(String),

    #[error("ping response has no {path}")]
    MissingKey { path: String },
}

/// Parsed body of `/api/v2/ping`. No schema is enforced; checks walk fixed
/// key paths and a missing key is reported as such.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthPayload {
    root: Value,
}

impl HealthPayload {
    pub fn parse(body: &str) -> Result<Self, PayloadError> {
        let root = serde_json::from_str(body).map_err(|e| PayloadError::Parse(e.to_string()))?;
        Ok(Self { root })
    }

    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// Walks `path` through objects by key and arrays by numeric index.
    pub fn lookup(&self, path: &[&str]) -> Result<&Value, PayloadError> {
        let mut current = &self.root;

        for (depth, segment) in path.iter().enumerate() {
            let next = match current {
                Value::Object(map) => map.get(*segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            };

            current = next.ok_or_else(|| PayloadError::MissingKey {
                path: path[..=depth].join("."),
            })?;
        }

        Ok(current)
    }
}

/// JSON truthiness: null, false, zero and empty strings/arrays/objects are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
