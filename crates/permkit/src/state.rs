//! Scanning `terraform state list` output for resource types.
//!
//! Everything already tracked in state has to stay readable by the
//! deployment role, so each resource found yields a `read` record.

use crate::error::{Error, Result};
use crate::types::ActionRecord;
use regex::Regex;

/// Provider prefix scanned for when none is configured.
pub const DEFAULT_PROVIDER: &str = "google";

/// Extracts `<provider>_<name>` resource types from state addresses.
#[derive(Debug, Clone)]
pub struct StateScanner {
    pattern: Regex,
}

impl StateScanner {
    /// Build a scanner for the given provider prefixes (e.g. `google`, `aws`).
    pub fn new<S: AsRef<str>>(providers: &[S]) -> Result<Self> {
        let alternatives: Vec<String> = providers
            .iter()
            .map(|p| p.as_ref().trim())
            .filter(|p| !p.is_empty())
            .map(regex::escape)
            .collect();

        if alternatives.is_empty() {
            return Err(Error::Config(
                "at least one provider prefix is required".to_string(),
            ));
        }

        let expression = format!(r"^(?:{})_[A-Za-z0-9_]+$", alternatives.join("|"));
        let pattern = Regex::new(&expression)
            .map_err(|e| Error::Config(format!("invalid provider pattern: {e}")))?;

        Ok(Self { pattern })
    }

    /// One `read` record per resource address in `output`, in order.
    ///
    /// Each line is parsed as an address and only its type segment is
    /// checked against the provider prefixes. Module names, resource names
    /// and index keys are never taken as types.
    pub fn scan(&self, output: &str) -> Vec<ActionRecord> {
        output
            .lines()
            .filter_map(|line| resource_type(line.trim()))
            .filter(|ty| self.pattern.is_match(ty))
            .map(ActionRecord::read)
            .collect()
    }
}

/// Type segment of a resource address such as
/// `module.app["eu"].data.google_project.current`.
fn resource_type(address: &str) -> Option<&str> {
    let segments = split_address(address);
    let mut i = 0;
    while segments.get(i) == Some(&"module") {
        i += 2;
    }
    if segments.get(i) == Some(&"data") {
        i += 1;
    }
    // a type without a name after it is not an address
    segments.get(i + 1)?;
    segments.get(i).copied().filter(|ty| !ty.is_empty())
}

/// Split on `.` outside of `[...]` index keys and quoted strings.
fn split_address(address: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in address.char_indices() {
        if in_quotes {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quotes = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '.' if depth == 0 => {
                segments.push(&address[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&address[start..]);
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Action, Qualifier};

    fn google() -> StateScanner {
        StateScanner::new(&[DEFAULT_PROVIDER]).unwrap()
    }

    fn types(records: &[ActionRecord]) -> Vec<&str> {
        records.iter().map(|r| r.resource_type.as_str()).collect()
    }

    #[test]
    fn test_scan_state_list() {
        let scanner = google();
        let records =
            scanner.scan("google_storage_bucket.my_bucket\ngoogle_compute_instance.vm1");

        assert_eq!(
            records,
            vec![
                ActionRecord::new(Action::Read, "google_storage_bucket", Qualifier::Resource),
                ActionRecord::new(Action::Read, "google_compute_instance", Qualifier::Resource),
            ]
        );
    }

    #[test]
    fn test_scan_keeps_duplicates_and_order() {
        let scanner = google();
        let records = scanner.scan(
            "google_storage_bucket.a\ngoogle_dns_zone.z\ngoogle_storage_bucket.b\n",
        );
        assert_eq!(
            types(&records),
            vec!["google_storage_bucket", "google_dns_zone", "google_storage_bucket"]
        );
    }

    #[test]
    fn test_scan_ignores_names_and_modules() {
        let scanner = google();
        let output = "\
module.google_net.google_compute_network.google_vpc
google_storage_bucket.google_bucket[0]
data.google_project.current
module.app.google_cloud_run_service.api[\"eu\"]
google_storage_bucket.b[\"google_fake.x\"]
module.my-google_net.google_dns_zone.z
";
        assert_eq!(
            types(&scanner.scan(output)),
            vec![
                "google_compute_network",
                "google_storage_bucket",
                "google_project",
                "google_cloud_run_service",
                "google_storage_bucket",
                "google_dns_zone",
            ]
        );
    }

    #[test]
    fn test_scan_nested_modules_and_indexed_modules() {
        let scanner = google();
        let output = "\
module.net[\"google_x.y\"].module.dns.data.google_dns_managed_zone.zone
module.a.module.b.google_sql_database_instance.db[0]
";
        assert_eq!(
            types(&scanner.scan(output)),
            vec!["google_dns_managed_zone", "google_sql_database_instance"]
        );
    }

    #[test]
    fn test_scan_requires_whole_type() {
        let scanner = google();
        assert!(scanner.scan("xgoogle_thing.a\ngoogle_bucket\nmodule.google_net\n").is_empty());
    }

    #[test]
    fn test_split_address_respects_keys() {
        assert_eq!(
            split_address(r#"google_storage_bucket.b["a.b\"c.d"].x"#),
            vec!["google_storage_bucket", r#"b["a.b\"c.d"]"#, "x"]
        );
    }

    #[test]
    fn test_scan_always_reads_resources() {
        let scanner = google();
        let records = scanner.scan("data.google_project.current");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, Action::Read);
        assert_eq!(records[0].qualifier, Qualifier::Resource);
    }

    #[test]
    fn test_scan_other_providers_ignored() {
        let scanner = google();
        assert!(scanner.scan("aws_s3_bucket.logs\nrandom_id.suffix").is_empty());
        assert!(scanner.scan("").is_empty());
        assert!(scanner.scan("No state file was found!").is_empty());
    }

    #[test]
    fn test_scan_multiple_providers() {
        let scanner = StateScanner::new(&["google", "google-beta", "aws"]).unwrap();
        let records = scanner.scan("aws_s3_bucket.logs\ngoogle_dns_zone.z\nazurerm_vnet.v");
        assert_eq!(types(&records), vec!["aws_s3_bucket", "google_dns_zone"]);
    }

    #[test]
    fn test_empty_provider_list_rejected() {
        let none: [&str; 0] = [];
        assert!(StateScanner::new(&none).is_err());
        assert!(StateScanner::new(&["  "]).is_err());
    }
}
