use serde::Deserialize;
use serde_json::Value;

use super::{integer_from_json, ValidationErrors};
use crate::domain::campaign::CampaignDraft;

/// Raw campaign payload as posted by a client.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CampaignInput {
    pub uid: Option<Value>,
    pub message: Option<Value>,
    pub query: Option<Value>,
    pub size: Option<Value>,
}

impl CampaignInput {
    /// Type-checks the payload and runs the draft rules on top, so both kinds of
    /// failure come back in a single list.
    pub fn into_draft(self) -> Result<CampaignDraft, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let uid = match self.uid {
            Some(Value::String(uid)) => uid,
            _ => {
                errors.push("uid", "Please sign in");
                String::new()
            }
        };

        let message = match self.message {
            Some(Value::String(message)) => message,
            _ => {
                errors.push("message", "Message is required.");
                String::new()
            }
        };

        let query = match self.query {
            Some(query @ Value::Object(_)) => query,
            _ => {
                errors.push("query", "Query is required.");
                Value::Null
            }
        };

        let size = match self.size.as_ref().and_then(integer_from_json) {
            Some(size) => size,
            None => {
                errors.push("size", "Size must be a positive number.");
                0
            }
        };

        let draft = CampaignDraft { uid, message, query, size };
        errors.absorb(draft.check());
        errors.into_result(draft)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::CampaignInput;

    fn input(value: serde_json::Value) -> CampaignInput {
        serde_json::from_value(value).expect("campaign input")
    }

    #[test]
    fn accepts_numeric_string_size() {
        let draft = input(json!({
            "uid": "u1",
            "message": "Welcome back",
            "query": { "maxTotalVisits": 0 },
            "size": "12"
        }))
        .into_draft()
        .expect("valid draft");

        assert_eq!(draft.size, 12);
        assert_eq!(draft.query["maxTotalVisits"], 0);
    }

    #[test]
    fn reports_type_and_rule_failures_together() {
        let errors = input(json!({
            "uid": "u1",
            "message": 42,
            "query": {},
            "size": 0
        }))
        .into_draft()
        .expect_err("invalid draft");

        let fields: Vec<&str> = errors.errors().iter().map(|error| error.field.as_str()).collect();
        assert_eq!(fields, vec!["message", "query", "size"]);
    }

    #[test]
    fn missing_payload_reports_each_field_once() {
        let errors = CampaignInput::default().into_draft().expect_err("invalid draft");
        assert_eq!(errors.errors().len(), 4);
    }
}
