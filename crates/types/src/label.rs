//! Name labels and the hash hierarchy derived from them.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A single name segment (one level of the hierarchy, no dots).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label(pub String);

impl Label {
    /// Create a new label from a string.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Get the label as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate the label format: non-empty, at most 63 bytes, lowercase
    /// alphanumerics and hyphens, no leading or trailing hyphen.
    pub fn is_valid(&self) -> bool {
        let label = &self.0;
        !label.is_empty()
            && label.len() <= 63
            && label
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            && !label.starts_with('-')
            && !label.ends_with('-')
    }

    /// Hash of the label bytes.
    pub fn hash(&self) -> [u8; 32] {
        labelhash(self.as_str())
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the 256-bit hash of a label.
pub fn labelhash(label: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(label.as_bytes());
    hasher.finalize().into()
}

/// A node in the name hierarchy: the accumulated hash of a
/// fully-qualified name, derived level by level from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node(pub [u8; 32]);

impl Node {
    /// The root of the hierarchy.
    pub const ROOT: Node = Node([0u8; 32]);

    /// Raw byte view.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Derive the node of a child label under this node.
    pub fn child(&self, label: &Label) -> Node {
        namehash(self, &label.hash())
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Derive a child node from a parent node and a labelhash.
pub fn namehash(parent: &Node, labelhash: &[u8; 32]) -> Node {
    let mut hasher = Sha256::new();
    hasher.update(parent.as_bytes());
    hasher.update(labelhash);
    Node(hasher.finalize().into())
}

/// Node of the legacy `eth` top-level domain.
pub fn eth_node() -> Node {
    Node::ROOT.child(&Label::new("eth"))
}
