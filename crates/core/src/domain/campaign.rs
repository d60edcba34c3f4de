use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::owner::OwnerId;
use crate::domain::store_precision;
use crate::validation::ValidationErrors;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignId(pub Uuid);

impl CampaignId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// A campaign send. `size` is the audience size captured at creation and is never
/// recomputed; `query` is a value snapshot of the filter that produced it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: CampaignId,
    #[serde(rename = "uid")]
    pub owner: OwnerId,
    pub message: String,
    pub query: Value,
    pub size: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Campaign fields as handed over by a caller, before any checks.
#[derive(Clone, Debug, PartialEq)]
pub struct CampaignDraft {
    pub uid: String,
    pub message: String,
    pub query: Value,
    pub size: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewCampaign {
    pub owner: OwnerId,
    pub message: String,
    pub query: Value,
    pub size: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Anything other than an explicit `desc` sorts ascending.
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("desc") => Self::Desc,
            _ => Self::Asc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_param(Some(value)))
    }
}

impl CampaignDraft {
    pub fn check(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();

        if self.uid.trim().is_empty() {
            errors.push("uid", "Please sign in");
        }
        if self.message.trim().is_empty() {
            errors.push("message", "Message is required.");
        }
        let has_query = self.query.as_object().map(|fields| !fields.is_empty()).unwrap_or(false);
        if !has_query {
            errors.push("query", "Query is required.");
        }
        if self.size < 1 {
            errors.push("size", "Size must be a positive number.");
        }

        errors
    }

    pub fn validate(self) -> Result<NewCampaign, ValidationErrors> {
        let errors = self.check();
        if !errors.is_empty() {
            return Err(errors);
        }

        let owner = OwnerId::parse(&self.uid)
            .map_err(|_| ValidationErrors::single("uid", "Please sign in"))?;
        let size = u64::try_from(self.size)
            .map_err(|_| ValidationErrors::single("size", "Size must be a positive number."))?;

        Ok(NewCampaign { owner, message: self.message, query: self.query, size })
    }
}

impl Campaign {
    pub fn create(new: NewCampaign, now: DateTime<Utc>) -> Self {
        let now = store_precision(now);
        Self {
            id: CampaignId::generate(),
            owner: new.owner,
            message: new.message,
            query: new.query,
            size: new.size,
            created_at: now,
            updated_at: now,
        }
    }
}
