//! Parsing the JSON produced by `parse-terraform-plan`.
//!
//! The converter emits an object with two arrays, `changedResources` and
//! `changedDataSources`, whose elements carry at least `action`, `type` and
//! `path`. Anything else in the document is ignored.

use crate::error::{Error, Result};
use crate::types::{Action, ActionRecord, Qualifier};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Key of the managed-resource changes.
pub const CHANGED_RESOURCES: &str = "changedResources";
/// Key of the data-source changes.
pub const CHANGED_DATA_SOURCES: &str = "changedDataSources";

/// Parse a plan JSON file into action records.
///
/// An empty file means the plan has no changes.
pub fn parse_plan_file(path: &Path) -> Result<Vec<ActionRecord>> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::PlanRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_plan_at(&content, path)
}

/// Parse an in-memory plan JSON document into action records.
pub fn parse_plan(json: &str) -> Result<Vec<ActionRecord>> {
    parse_plan_at(json, Path::new("<memory>"))
}

fn parse_plan_at(json: &str, origin: &Path) -> Result<Vec<ActionRecord>> {
    if json.trim().is_empty() {
        log::debug!("Plan {} is empty, no changes", origin.display());
        return Ok(Vec::new());
    }

    let document: Value = serde_json::from_str(json).map_err(|source| Error::PlanParse {
        path: PathBuf::from(origin),
        source,
    })?;

    let records: Vec<ActionRecord> = [CHANGED_RESOURCES, CHANGED_DATA_SOURCES]
        .iter()
        .filter_map(|key| document.get(key).and_then(Value::as_array))
        .flatten()
        .filter_map(parse_change)
        .collect();

    log::debug!("Parsed {} changes from {}", records.len(), origin.display());
    Ok(records)
}

/// Turn one plan element into a record, or `None` if it can't be mapped.
fn parse_change(change: &Value) -> Option<ActionRecord> {
    let verb = str_field(change, "action");
    let resource_type = str_field(change, "type");
    let path = str_field(change, "path");

    if resource_type.is_empty() {
        log::warn!("Skipping plan change without a type (path: '{path}')");
        return None;
    }

    let Some(action) = Action::from_plan_verb(verb) else {
        log::warn!("Skipping {path}: unknown plan action '{verb}'");
        return None;
    };

    Some(ActionRecord::new(
        action,
        resource_type,
        Qualifier::from_address(path),
    ))
}

fn str_field<'a>(value: &'a Value, name: &str) -> &'a str {
    value.get(name).and_then(Value::as_str).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_becomes_update() {
        let json = r#"{"changedResources":[{"action":"replace","type":"google_storage_bucket","path":"google_storage_bucket.my_bucket"}]}"#;
        let records = parse_plan(json).unwrap();
        assert_eq!(
            records,
            vec![ActionRecord::new(
                Action::Update,
                "google_storage_bucket",
                Qualifier::Resource
            )]
        );
    }

    #[test]
    fn test_data_path_prefix_sets_qualifier() {
        let json = r#"{
            "changedResources": [
                {"action": "create", "type": "google_pubsub_topic", "path": "google_pubsub_topic.events"}
            ],
            "changedDataSources": [
                {"action": "read", "type": "google_project", "path": "data.google_project.current"},
                {"action": "read", "type": "google_client_config", "path": "module.x.data.google_client_config.c"}
            ]
        }"#;
        let records = parse_plan(json).unwrap();
        let qualifiers: Vec<Qualifier> = records.iter().map(|r| r.qualifier).collect();
        assert_eq!(
            qualifiers,
            vec![Qualifier::Resource, Qualifier::Data, Qualifier::Resource]
        );
    }

    #[test]
    fn test_resources_before_data_sources() {
        let json = r#"{
            "changedDataSources": [
                {"action": "read", "type": "google_project", "path": "data.google_project.current"}
            ],
            "changedResources": [
                {"action": "destroy", "type": "google_dns_zone", "path": "google_dns_zone.old"},
                {"action": "create", "type": "google_dns_zone", "path": "google_dns_zone.new"}
            ]
        }"#;
        let records = parse_plan(json).unwrap();
        let rendered: Vec<String> = records.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "delete google_dns_zone (resource)",
                "create google_dns_zone (resource)",
                "read google_project (data)",
            ]
        );
    }

    #[test]
    fn test_never_emits_replace() {
        let json = r#"{"changedResources":[
            {"action":"replace","type":"google_a","path":"google_a.x"},
            {"action":"replace","type":"google_b","path":"data.google_b.y"},
            {"action":"update","type":"google_c","path":"google_c.z"}
        ]}"#;
        let records = parse_plan(json).unwrap();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.action == Action::Update));
    }

    #[test]
    fn test_missing_keys_yield_no_records() {
        assert!(parse_plan("{}").unwrap().is_empty());
        assert!(parse_plan(r#"{"changedResources": null}"#).unwrap().is_empty());
        assert!(parse_plan("[]").unwrap().is_empty());
    }

    #[test]
    fn test_empty_document_is_no_changes() {
        assert!(parse_plan("").unwrap().is_empty());
        assert!(parse_plan("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_json_is_error() {
        let err = parse_plan("{\"changedResources\": [").unwrap_err();
        assert!(matches!(err, Error::PlanParse { .. }));
    }

    #[test]
    fn test_unknown_action_and_missing_type_skipped() {
        let json = r#"{"changedResources":[
            {"action":"no-op","type":"google_a","path":"google_a.x"},
            {"action":"create","path":"google_b.y"},
            {"action":"create","type":"google_c","path":"google_c.z"}
        ]}"#;
        let records = parse_plan(json).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].resource_type, "google_c");
    }

    #[test]
    fn test_parse_plan_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");
        std::fs::write(
            &path,
            r#"{"changedResources":[{"action":"create","type":"google_sql_database","path":"google_sql_database.db"}]}"#,
        )
        .unwrap();

        let records = parse_plan_file(&path).unwrap();
        assert_eq!(records[0].action, Action::Create);

        let missing = parse_plan_file(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, Error::PlanRead { .. }));
        assert!(missing.to_string().contains("missing.json"));
    }
}
