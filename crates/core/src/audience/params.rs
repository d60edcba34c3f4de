use serde::Deserialize;

use super::AudienceFilter;
use crate::domain::customer::Gender;
use crate::domain::owner::OwnerId;
use crate::validation::{non_negative, parse_date, parse_integer, ValidationErrors};

/// Filter parameters exactly as they arrive on a query string.
///
/// A key that was not sent is `None`. A key sent with an empty value is `Some("")`
/// and fails validation rather than silently meaning "no bound".
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterParams {
    pub uid: Option<String>,
    pub min_age: Option<String>,
    pub max_age: Option<String>,
    pub gender: Option<String>,
    pub last_visit_before: Option<String>,
    pub last_visit_after: Option<String>,
    pub min_total_visits: Option<String>,
    pub max_total_visits: Option<String>,
    pub min_latest_purchase: Option<String>,
    pub max_latest_purchase: Option<String>,
    pub min_total_purchase: Option<String>,
    pub max_total_purchase: Option<String>,
}

impl FilterParams {
    pub fn parse(&self) -> Result<(OwnerId, AudienceFilter), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let owner = self.uid.as_deref().and_then(|raw| OwnerId::parse(raw).ok());
        if owner.is_none() {
            errors.push("uid", "Please sign in");
        }

        let gender = self.gender.as_deref().and_then(|raw| {
            let parsed = raw.trim().parse::<Gender>().ok();
            if parsed.is_none() {
                errors.push("gender", "gender must be 'male', 'female', or 'other'");
            }
            parsed
        });

        let filter = AudienceFilter {
            min_age: count(&mut errors, "minAge", self.min_age.as_deref()),
            max_age: count(&mut errors, "maxAge", self.max_age.as_deref()),
            gender,
            last_visit_before: date(
                &mut errors,
                "lastVisitBefore",
                self.last_visit_before.as_deref(),
            ),
            last_visit_after: date(&mut errors, "lastVisitAfter", self.last_visit_after.as_deref()),
            min_total_visits: count(
                &mut errors,
                "minTotalVisits",
                self.min_total_visits.as_deref(),
            ),
            max_total_visits: count(
                &mut errors,
                "maxTotalVisits",
                self.max_total_visits.as_deref(),
            ),
            min_latest_purchase: count(
                &mut errors,
                "minLatestPurchase",
                self.min_latest_purchase.as_deref(),
            ),
            max_latest_purchase: count(
                &mut errors,
                "maxLatestPurchase",
                self.max_latest_purchase.as_deref(),
            ),
            min_total_purchase: count(
                &mut errors,
                "minTotalPurchase",
                self.min_total_purchase.as_deref(),
            ),
            max_total_purchase: count(
                &mut errors,
                "maxTotalPurchase",
                self.max_total_purchase.as_deref(),
            ),
        };

        match owner {
            Some(owner) if errors.is_empty() => Ok((owner, filter)),
            _ => Err(errors),
        }
    }
}

fn count(errors: &mut ValidationErrors, field: &str, raw: Option<&str>) -> Option<u64> {
    let raw = raw?;
    let parsed = parse_integer(raw).and_then(non_negative);
    if parsed.is_none() {
        errors.push(field, format!("{field} must be a non-negative integer"));
    }
    parsed
}

fn date(
    errors: &mut ValidationErrors,
    field: &str,
    raw: Option<&str>,
) -> Option<chrono::DateTime<chrono::Utc>> {
    let raw = raw?;
    let parsed = parse_date(raw);
    if parsed.is_none() {
        errors.push(field, format!("{field} must be a valid date"));
    }
    parsed
}
