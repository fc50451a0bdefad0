//! REST API types for client integration.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::{HubUnit, ParseResult, ValidationIssue};
use crate::validation::{create_validation_headline, create_validation_summary};

/// Response sent after a plan upload has been validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    /// Unique job identifier
    pub job_id: String,

    /// Status: "ready", "warning", "error"
    pub status: String,

    /// One-line notification text
    pub headline: String,

    /// Multi-line report grouped by category
    pub summary: String,

    /// Records, issues and counts
    pub result: ParseResult,
}

impl From<ParseResult> for ValidationResponse {
    fn from(result: ParseResult) -> Self {
        let status = if !result.is_valid {
            "error"
        } else if result.warning_summary.total > 0 {
            "warning"
        } else {
            "ready"
        };

        ValidationResponse {
            job_id: Uuid::new_v4().to_string(),
            status: status.to_string(),
            headline: create_validation_headline(&result),
            summary: create_validation_summary(&result),
            result,
        }
    }
}

/// Body of `POST /api/hub-match`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubMatchRequest {
    pub detected_hub_offices: Vec<String>,
    pub selected_hub_id: String,
    pub hubs: Vec<HubUnit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubMatchResponse {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
}

impl From<Vec<ValidationIssue>> for HubMatchResponse {
    fn from(errors: Vec<ValidationIssue>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::summary::summarize_issues;

    fn result(errors: Vec<ValidationIssue>, warnings: Vec<ValidationIssue>) -> ParseResult {
        ParseResult {
            is_valid: errors.is_empty(),
            error_summary: summarize_issues(&errors),
            warning_summary: summarize_issues(&warnings),
            errors,
            warnings,
            ..Default::default()
        }
    }

    #[test]
    fn test_response_status() {
        let ok = ValidationResponse::from(result(vec![], vec![]));
        assert_eq!(ok.status, "ready");
        assert_eq!(ok.headline, "CSV Validation: Successful");

        let warned = ValidationResponse::from(result(
            vec![],
            vec![ValidationIssue::warning("w").with_category("missing_date")],
        ));
        assert_eq!(warned.status, "warning");

        let failed = ValidationResponse::from(result(
            vec![ValidationIssue::error("e").with_category("missing_field")],
            vec![],
        ));
        assert_eq!(failed.status, "error");
        assert_eq!(failed.headline, "CSV Validation: 1 errors found");
    }

    #[test]
    fn test_response_json_shape() {
        let response = ValidationResponse::from(result(vec![], vec![]));
        let json = serde_json::to_value(&response).unwrap();
        assert!(json["jobId"].is_string());
        assert_eq!(json["result"]["isValid"], true);
        assert!(json["result"]["errorSummary"]["categories"].is_object());
    }

    #[test]
    fn test_hub_match_request_from_json() {
        let req: HubMatchRequest = serde_json::from_value(json!({
            "detectedHubOffices": ["Kassala"],
            "selectedHubId": "kassala",
            "hubs": [{ "id": "kassala", "name": "Kassala Hub Office" }]
        }))
        .unwrap();
        assert_eq!(req.hubs[0].states.len(), 0);

        let response = HubMatchResponse::from(Vec::new());
        assert!(response.is_valid);
    }

    #[test]
    fn test_error_response() {
        let body = error_response("No file provided");
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "No file provided");
    }
}
