//! Model capabilities advertised to local-dialect clients.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A feature a model supports, as reported by `/api/show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Completion,
    Tools,
    Vision,
    Thinking,
    Insert,
}

impl Capability {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completion => "completion",
            Self::Tools => "tools",
            Self::Vision => "vision",
            Self::Thinking => "thinking",
            Self::Insert => "insert",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of capabilities, ordered by declaration.
pub type CapabilitySet = BTreeSet<Capability>;

/// Capabilities assumed when neither a model nor its base declares any.
#[must_use]
pub fn default_capabilities() -> CapabilitySet {
    BTreeSet::from([Capability::Completion, Capability::Tools])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        let caps: Vec<Capability> =
            serde_json::from_str(r#"["completion","tools","vision","thinking","insert"]"#)
                .unwrap();
        assert_eq!(caps.len(), 5);
        assert_eq!(serde_json::to_string(&Capability::Vision).unwrap(), "\"vision\"");
        assert!(serde_json::from_str::<Capability>("\"audio\"").is_err());
    }

    #[test]
    fn test_set_order_follows_declaration() {
        let set: CapabilitySet =
            BTreeSet::from([Capability::Vision, Capability::Completion, Capability::Tools]);
        let names: Vec<_> = set.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, ["completion", "tools", "vision"]);
    }
}
