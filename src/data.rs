use std::fmt;

use serde::{Deserialize, Serialize};

pub use crate::types::{IdentityKey, InitiatorType, ResourceUrl};

/// One observed resource load, as produced by a resource feed.
///
/// The serialized shape follows browser resource-timing entries: `name` holds the
/// URL and `initiatorType` the tag. Timing fields are accepted and ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Absolute URL of the loaded resource.
    #[serde(rename = "name", alias = "url")]
    pub url: ResourceUrl,
    /// How the load was initiated (for example `script` or `link`).
    #[serde(rename = "initiatorType", alias = "initiator_type")]
    pub initiator_type: InitiatorType,
}

impl ResourceRecord {
    /// Build a record from a URL and initiator tag.
    pub fn new(url: impl Into<ResourceUrl>, initiator_type: impl Into<InitiatorType>) -> Self {
        Self {
            url: url.into(),
            initiator_type: initiator_type.into(),
        }
    }
}

/// Warning emitted the first time an identity reaches the duplicate threshold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuplicateWarning {
    /// Initiator type of the first record seen for this identity.
    pub initiator_type: InitiatorType,
    /// Normalized URL shared by every record in the group.
    pub identity_key: IdentityKey,
    /// Group size at the moment the warning was raised.
    pub occurrences: usize,
}

impl fmt::Display for DuplicateWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "A {} resource was loaded multiple times: {}",
            self.initiator_type, self.identity_key
        )
    }
}

/// Read-only view of a duplicated identity and its current size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// Normalized URL shared by the group.
    pub identity_key: IdentityKey,
    /// Initiator type of the first record in the group.
    pub initiator_type: InitiatorType,
    /// Number of tracked records that map to this identity.
    pub occurrences: usize,
    /// Whether a warning has already been reported for this identity.
    pub reported: bool,
}
