//! HTTP-backed advisory provider.
//!
//! Talks to a Gemini-style generative-language endpoint: the prompt carries
//! the rule text, the broken schedule as JSON and the violation list, and
//! demands a JSON-only response with the same schedule structure. Prompt
//! construction and response parsing are pure functions so they can be
//! tested without a network.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::models::{MonthlySchedule, Violation};

use super::{AdvisoryError, AdvisoryProvider};

/// An [`AdvisoryProvider`] over an HTTP JSON API.
///
/// # Example
///
/// ```no_run
/// use rota_engine::advisory::HttpAdvisor;
///
/// let advisor = HttpAdvisor::new(
///     "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent",
///     std::env::var("ADVISORY_API_KEY").unwrap_or_default(),
/// );
/// # let _ = advisor;
/// ```
pub struct HttpAdvisor {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpAdvisor {
    /// Creates an advisor for the given endpoint and API key.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

/// Builds the correction prompt.
///
/// The instructions pin the response format: JSON only, same month and
/// employee set, assignments limited to the team's shift names and the
/// floater role.
fn build_prompt(
    schedule: &MonthlySchedule,
    violations: &[Violation],
    rules_text: &str,
) -> Result<String, AdvisoryError> {
    let schedule_json = serde_json::to_string_pretty(schedule)
        .map_err(|e| AdvisoryError::MalformedResponse(e.to_string()))?;
    let violations_json = serde_json::to_string_pretty(violations)
        .map_err(|e| AdvisoryError::MalformedResponse(e.to_string()))?;

    Ok(format!(
        "You are a shift schedule correction expert. Fix the schedule below so that it \
         resolves the listed violations without breaking any other rule.\n\
         \n\
         REQUIREMENTS:\n\
         1. Respond with ONLY the corrected schedule as JSON, no other text.\n\
         2. Keep the exact same JSON structure, team_id, month and employee ids.\n\
         3. Only change assignment values; valid values are the existing shift names \
         and \"floater\".\n\
         \n\
         SCHEDULING RULES:\n{rules_text}\n\
         \n\
         CURRENT SCHEDULE:\n{schedule_json}\n\
         \n\
         VIOLATIONS TO FIX:\n{violations_json}\n"
    ))
}

/// Extracts the proposed schedule from a generate-content response body.
///
/// Expected shape: `candidates[0].content.parts[0].text` holding the JSON
/// schedule as a string.
fn parse_proposal(body: &serde_json::Value) -> Result<MonthlySchedule, AdvisoryError> {
    let text = body
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("text"))
        .and_then(|t| t.as_str())
        .ok_or_else(|| {
            AdvisoryError::MalformedResponse("missing candidates[0].content.parts[0].text".to_string())
        })?;

    serde_json::from_str(text)
        .map_err(|e| AdvisoryError::MalformedResponse(format!("proposal is not a schedule: {e}")))
}

#[async_trait]
impl AdvisoryProvider for HttpAdvisor {
    async fn propose_fix(
        &self,
        schedule: &MonthlySchedule,
        violations: &[Violation],
        rules_text: &str,
    ) -> Result<MonthlySchedule, AdvisoryError> {
        let prompt = build_prompt(schedule, violations, rules_text)?;
        let request_body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "response_mime_type": "application/json",
                "temperature": 0.2
            }
        });

        debug!(endpoint = %self.endpoint, "sending advisory request");
        let response = self
            .client
            .post(format!("{}?key={}", self.endpoint, self.api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AdvisoryError::Timeout
                } else {
                    AdvisoryError::Http(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(AdvisoryError::Service(format!(
                "advisory endpoint returned {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AdvisoryError::MalformedResponse(e.to_string()))?;
        parse_proposal(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Assignment, RuleId, Shift, Subject, YearMonth};

    fn sample_schedule() -> MonthlySchedule {
        let mut schedule = MonthlySchedule::new("team_ops", YearMonth::new(2026, 3));
        schedule.assign("emp_01", Assignment::Shift(Shift::Morning));
        schedule.assign("emp_02", Assignment::Floater);
        schedule
    }

    fn sample_violations() -> Vec<Violation> {
        vec![Violation::hard(
            RuleId::FixedStaffing,
            Subject::Shift(Shift::Night),
            YearMonth::new(2026, 3),
            "Night is understaffed in March 2026: 0 assigned, 1 required",
        )]
    }

    #[test]
    fn test_prompt_carries_rules_schedule_and_violations() {
        let prompt = build_prompt(
            &sample_schedule(),
            &sample_violations(),
            "1. Rule one.\n2. Rule two.",
        )
        .unwrap();

        assert!(prompt.contains("1. Rule one."));
        assert!(prompt.contains("\"team_ops\""));
        assert!(prompt.contains("Night is understaffed"));
        assert!(prompt.contains("ONLY the corrected schedule as JSON"));
    }

    #[test]
    fn test_parse_proposal_from_generate_content_shape() {
        let proposal = sample_schedule();
        let body = json!({
            "candidates": [{
                "content": {
                    "parts": [{ "text": serde_json::to_string(&proposal).unwrap() }]
                }
            }]
        });
        let parsed = parse_proposal(&body).unwrap();
        assert_eq!(parsed, proposal);
    }

    #[test]
    fn test_parse_proposal_rejects_missing_candidates() {
        let body = json!({ "error": { "message": "quota exceeded" } });
        match parse_proposal(&body) {
            Err(AdvisoryError::MalformedResponse(message)) => {
                assert!(message.contains("candidates"));
            }
            other => panic!("Expected MalformedResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_proposal_rejects_non_schedule_text() {
        let body = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "I cannot help with that." }] }
            }]
        });
        assert!(matches!(
            parse_proposal(&body),
            Err(AdvisoryError::MalformedResponse(_))
        ));
    }
}
