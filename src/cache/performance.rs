//! Query performance records and backend reply parsing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{LexpandError, Result};

/// Performance of a query evaluated over the whole collection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryPerformanceSubset {
    /// Number of retrieved documents.
    pub num_ret: u64,
    /// Execution time in seconds, if the backend reported it.
    pub exe_time: Option<f64>,
}

/// Performance of a query against a set of relevant documents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryPerformance {
    pub num_ret: u64,
    /// Size of the relevant set.
    pub num_rel: u64,
    /// Number of retrieved documents that are relevant.
    pub num_rel_ret: u64,
    pub exe_time: Option<f64>,
}

impl QueryPerformance {
    /// The unrestricted part of the record.
    pub fn subset(&self) -> QueryPerformanceSubset {
        QueryPerformanceSubset {
            num_ret: self.num_ret,
            exe_time: self.exe_time,
        }
    }
}

/// A cached metrics record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Performance {
    Unrestricted(QueryPerformanceSubset),
    Restricted(QueryPerformance),
}

impl Performance {
    pub fn num_ret(&self) -> u64 {
        match self {
            Performance::Unrestricted(p) => p.num_ret,
            Performance::Restricted(p) => p.num_ret,
        }
    }

    pub fn exe_time(&self) -> Option<f64> {
        match self {
            Performance::Unrestricted(p) => p.exe_time,
            Performance::Restricted(p) => p.exe_time,
        }
    }

    pub fn subset(&self) -> QueryPerformanceSubset {
        match self {
            Performance::Unrestricted(p) => *p,
            Performance::Restricted(p) => p.subset(),
        }
    }

    pub fn as_restricted(&self) -> Option<&QueryPerformance> {
        match self {
            Performance::Restricted(p) => Some(p),
            Performance::Unrestricted(_) => None,
        }
    }
}

/// Cache key: a signature, optionally paired with the caller's identifier of
/// the restricting document set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CacheKey {
    Unrestricted(String),
    Restricted { signature: String, restriction: u64 },
}

impl CacheKey {
    pub fn signature(&self) -> &str {
        match self {
            CacheKey::Unrestricted(signature) => signature,
            CacheKey::Restricted { signature, .. } => signature,
        }
    }

    pub fn is_restricted(&self) -> bool {
        matches!(self, CacheKey::Restricted { .. })
    }
}

/// Build a metrics record from a backend reply.
///
/// A reply carrying an `error` field becomes [`LexpandError::Backend`] with
/// the backend's message. Numeric fields may be JSON numbers or numeric
/// strings. A missing `exe_time` (or `null`) is kept as `None`.
pub fn parse_reply(reply: &Value, restricted: bool) -> Result<Performance> {
    let fields = reply
        .as_object()
        .ok_or_else(|| LexpandError::format(format!("Reply is not an object: {reply}")))?;

    if let Some(error) = fields.get("error") {
        let message = match error {
            Value::String(message) => message.clone(),
            other => other.to_string(),
        };
        return Err(LexpandError::backend(message));
    }

    let num_ret = required_count(fields, "num_ret")?;
    let exe_time = optional_time(fields, "exe_time")?;

    if !restricted {
        return Ok(Performance::Unrestricted(QueryPerformanceSubset {
            num_ret,
            exe_time,
        }));
    }

    Ok(Performance::Restricted(QueryPerformance {
        num_ret,
        num_rel: required_count(fields, "num_rel")?,
        num_rel_ret: required_count(fields, "num_rel_ret")?,
        exe_time,
    }))
}

fn required_count(fields: &Map<String, Value>, name: &str) -> Result<u64> {
    let value = fields
        .get(name)
        .ok_or_else(|| LexpandError::format(format!("Reply is missing '{name}'")))?;
    let parsed = match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        LexpandError::format(format!("Field '{name}' is not a non-negative integer: {value}"))
    })
}

fn optional_time(fields: &Map<String, Value>, name: &str) -> Result<Option<f64>> {
    let parsed = match fields.get(name) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match parsed {
        Some(time) if time.is_finite() => Ok(Some(time)),
        _ => Err(LexpandError::format(format!("Field '{name}' is not a number"))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_unrestricted_reply_with_strings() {
        let performance = parse_reply(&json!({"num_ret": "12", "exe_time": "0.5"}), false).unwrap();
        assert_eq!(
            performance,
            Performance::Unrestricted(QueryPerformanceSubset {
                num_ret: 12,
                exe_time: Some(0.5)
            })
        );
    }

    #[test]
    fn test_parse_restricted_reply() {
        let reply = json!({"num_ret": 40, "num_rel": 3, "num_rel_ret": 2});
        let performance = parse_reply(&reply, true).unwrap();
        let restricted = performance.as_restricted().unwrap();
        assert_eq!(restricted.num_rel, 3);
        assert_eq!(restricted.num_rel_ret, 2);
        assert_eq!(restricted.exe_time, None);
        assert_eq!(performance.subset().num_ret, 40);
    }

    #[test]
    fn test_zero_time_is_not_missing_time() {
        let performance = parse_reply(&json!({"num_ret": 1, "exe_time": 0.0}), false).unwrap();
        assert_eq!(performance.exe_time(), Some(0.0));
    }

    #[test]
    fn test_backend_error() {
        let result = parse_reply(&json!({"error": "timeout"}), false);
        match result {
            Err(LexpandError::Backend(message)) => assert_eq!(message, "timeout"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_missing_or_bad_fields() {
        assert!(matches!(
            parse_reply(&json!({"exe_time": 0.5}), false),
            Err(LexpandError::Format(_))
        ));
        assert!(matches!(
            parse_reply(&json!({"num_ret": 1}), true),
            Err(LexpandError::Format(_))
        ));
        assert!(matches!(
            parse_reply(&json!({"num_ret": "many"}), false),
            Err(LexpandError::Format(_))
        ));
        assert!(matches!(parse_reply(&json!([1, 2]), false), Err(LexpandError::Format(_))));
    }

    #[test]
    fn test_cache_key_ordering() {
        let a = CacheKey::Unrestricted("((a))".to_string());
        let b = CacheKey::Restricted {
            signature: "((a))".to_string(),
            restriction: 7,
        };
        assert!(a < b);
        assert_eq!(b.signature(), "((a))");
        assert!(b.is_restricted());
    }
}
