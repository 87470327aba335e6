//! The permissions lookup table and resolution of records against it.
//!
//! The table is a nested JSON object:
//!
//! ```json
//! {
//!   "resource": { "google_storage_bucket": { "update": ["storage.buckets.update"] } },
//!   "data":     { "google_project":        { "read":   ["resourcemanager.projects.get"] } }
//! }
//! ```
//!
//! The schema is not validated; anything that isn't an array of strings at
//! `qualifier.type.action` simply contributes no permissions.

use crate::error::{Error, Result};
use crate::types::{ActionRecord, PermissionSet};
use serde_json::Value;
use std::path::Path;

/// Default file name of the permissions document.
pub const DEFAULT_PERMISSIONS_FILE: &str = "permissions.json";

/// Read-only permissions lookup table.
#[derive(Debug, Clone)]
pub struct PermissionsTable {
    root: Value,
}

/// Outcome of resolving a list of records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Union of all permissions found
    pub permissions: PermissionSet,
    /// Records with no entry in the table
    pub unmapped: Vec<ActionRecord>,
}

impl PermissionsTable {
    /// Load the table from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::PermissionsRead {
            path: path.to_path_buf(),
            source,
        })?;
        let root = serde_json::from_str(&content).map_err(|source| Error::PermissionsParse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded permissions table from {}", path.display());
        Ok(Self { root })
    }

    /// Build the table from an in-memory JSON document.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        Ok(Self {
            root: serde_json::from_str(json)?,
        })
    }

    /// Permissions mapped to a record, or `None` if the table has no entry.
    ///
    /// Every lookup key of the record's action is consulted, so a `delete`
    /// record also picks up permissions listed under `destroy`.
    pub fn lookup(&self, record: &ActionRecord) -> Option<Vec<&str>> {
        let by_action = self
            .root
            .get(record.qualifier.as_str())
            .and_then(|q| q.get(&record.resource_type))?;

        let mut found = false;
        let mut permissions = Vec::new();
        for key in record.action.lookup_keys() {
            if let Some(list) = by_action.get(*key).and_then(Value::as_array) {
                found = true;
                permissions.extend(list.iter().filter_map(Value::as_str));
            }
        }

        found.then_some(permissions)
    }

    /// Union the permissions of every record.
    ///
    /// Records without an entry contribute nothing and are listed in
    /// [`Resolution::unmapped`].
    pub fn resolve(&self, records: &[ActionRecord]) -> Resolution {
        let mut resolution = Resolution::default();

        for record in records {
            match self.lookup(record) {
                Some(permissions) => {
                    resolution
                        .permissions
                        .extend(permissions.into_iter().map(str::to_string));
                }
                None => {
                    log::debug!("No permissions mapped for {}", record.lookup_keys().join(" / "));
                    if !resolution.unmapped.contains(record) {
                        resolution.unmapped.push(record.clone());
                    }
                }
            }
        }

        resolution
    }
}
