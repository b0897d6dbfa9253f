use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Correlation id threaded through a reconciliation attempt.
///
/// Every mutating resource-client call and every log line of an attempt
/// carries the same id, so the asynchronous steps of one attempt can be
/// correlated after the fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(pub Uuid);

impl CorrelationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CorrelationId {
    fn from(s: String) -> Self {
        Self::from_string(&s).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_id_unique() {
        assert_ne!(CorrelationId::new(), CorrelationId::new());
    }

    #[test]
    fn test_correlation_id_from_string() {
        let id = CorrelationId::new();
        let parsed = CorrelationId::from_string(&id.to_string()).unwrap();
        assert_eq!(id, parsed);

        assert!(CorrelationId::from_string("not-a-uuid").is_none());
    }
}
