//! Core types: actions, qualifiers and the records built from state and plan.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Deduplicated, lexicographically ordered set of permission strings.
pub type PermissionSet = BTreeSet<String>;

/// Operation a resource change implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Resource will be created
    Create,
    /// Resource will be updated or replaced
    Update,
    /// Resource will be destroyed
    Delete,
    /// Resource already exists and must be readable
    Read,
}

impl Action {
    /// Canonical name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Read => "read",
        }
    }

    /// Parse an action verb as emitted by the plan converter.
    ///
    /// `replace` is treated as `update`, `destroy` as `delete`.
    pub fn from_plan_verb(s: &str) -> Option<Self> {
        match s {
            "create" => Some(Self::Create),
            "update" | "replace" => Some(Self::Update),
            "delete" | "destroy" => Some(Self::Delete),
            "read" => Some(Self::Read),
            _ => None,
        }
    }

    /// Keys consulted in the permissions table, in order.
    pub fn lookup_keys(&self) -> &'static [&'static str] {
        match self {
            Self::Create => &["create"],
            Self::Update => &["update"],
            Self::Delete => &["delete", "destroy"],
            Self::Read => &["read"],
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "read" => Ok(Self::Read),
            other => Err(format!("unknown action: {other}")),
        }
    }
}

/// Whether a record refers to a managed resource or a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Qualifier {
    /// Managed resource (`resource` block)
    Resource,
    /// Read-only data source (`data` block)
    Data,
}

impl Qualifier {
    /// Top-level key of this qualifier in the permissions table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resource => "resource",
            Self::Data => "data",
        }
    }

    /// Classify a resource address: anything under `data` is a data source.
    pub fn from_address(path: &str) -> Self {
        if path.starts_with("data") {
            Self::Data
        } else {
            Self::Resource
        }
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Qualifier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resource" => Ok(Self::Resource),
            "data" => Ok(Self::Data),
            other => Err(format!("unknown qualifier: {other}")),
        }
    }
}

/// One action the deployment role has to be allowed to perform.
///
/// Rendered as `<action> <type> (<qualifier>)`, e.g.
/// `update google_storage_bucket (resource)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionRecord {
    /// What is done to the resource
    pub action: Action,
    /// Terraform resource type, e.g. `google_storage_bucket`
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Managed resource or data source
    pub qualifier: Qualifier,
}

impl ActionRecord {
    /// Create a new record.
    pub fn new(action: Action, resource_type: impl Into<String>, qualifier: Qualifier) -> Self {
        Self {
            action,
            resource_type: resource_type.into(),
            qualifier,
        }
    }

    /// Read access to something already in state.
    pub fn read(resource_type: impl Into<String>) -> Self {
        Self::new(Action::Read, resource_type, Qualifier::Resource)
    }

    /// Table keys for this record (`qualifier.type.action`), one per action alias.
    pub fn lookup_keys(&self) -> Vec<String> {
        self.action
            .lookup_keys()
            .iter()
            .map(|action| format!("{}.{}.{}", self.qualifier, self.resource_type, action))
            .collect()
    }
}

impl fmt::Display for ActionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({})",
            self.action, self.resource_type, self.qualifier
        )
    }
}

impl FromStr for ActionRecord {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (action, rest) = s
            .split_once(' ')
            .ok_or_else(|| format!("malformed action record: '{s}'"))?;
        let (resource_type, qualifier) = rest
            .rsplit_once(" (")
            .and_then(|(t, q)| q.strip_suffix(')').map(|q| (t, q)))
            .ok_or_else(|| format!("malformed action record: '{s}'"))?;

        Ok(Self::new(
            action.parse()?,
            resource_type,
            qualifier.parse()?,
        ))
    }
}
