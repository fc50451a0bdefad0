//! Cross-check hub offices found in a file against the hub chosen for upload.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{category, HubUnit, ValidationIssue};

static HUB_OFFICE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+hub\s+office$").expect("valid suffix pattern"));

fn strip_suffix(name: &str) -> String {
    HUB_OFFICE_SUFFIX.replace(name, "").to_lowercase()
}

/// One `hub_mismatch` error per detected hub office that does not belong to
/// the selected hub.
///
/// A detected name matches when it equals or overlaps the selected hub's
/// name in either direction, contains the hub id, or matches the hub name
/// with its trailing "Hub Office" removed. Comparison is case-insensitive.
pub fn validate_hub_match(
    detected_hub_offices: &[String],
    selected_hub_id: &str,
    hubs: &[HubUnit],
) -> Vec<ValidationIssue> {
    let Some(selected) = hubs.iter().find(|h| h.id == selected_hub_id) else {
        return vec![ValidationIssue::error(format!(
            "Selected hub '{}' not found",
            selected_hub_id
        ))
        .with_category(category::HUB_MISMATCH)];
    };

    // name -> hub id, full and suffix-stripped spellings
    let mut name_to_id: HashMap<String, &str> = HashMap::new();
    for hub in hubs {
        name_to_id.insert(hub.name.to_lowercase(), &hub.id);
        name_to_id.insert(strip_suffix(&hub.name), &hub.id);
    }

    let selected_name = selected.name.to_lowercase();
    let selected_short = strip_suffix(&selected.name);
    let selected_id = selected.id.to_lowercase();

    detected_hub_offices
        .iter()
        .filter(|office| {
            let office = office.trim().to_lowercase();
            let matched = selected_name == office
                || selected_name.contains(&office)
                || office.contains(&selected_name)
                || office.contains(&selected_id)
                || office == selected_short
                || office.contains(&selected_short)
                || name_to_id.get(&office) == Some(&selected.id.as_str())
                || name_to_id.get(&strip_suffix(&office)) == Some(&selected.id.as_str());
            !matched
        })
        .map(|office| {
            ValidationIssue::error(format!(
                "Hub Office '{}' does not belong to selected hub '{}'",
                office, selected.name
            ))
            .with_column("Hub Office")
            .with_category(category::HUB_MISMATCH)
        })
        .collect()
}
