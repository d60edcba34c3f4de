//! Audience segmentation: turning a flat set of optional filter parameters into a
//! predicate over an owner's customers.
//!
//! A dimension is constrained when at least one of its bounds was supplied. Presence
//! is always `Option::is_some`, never the numeric value, so a bound of `0` is a
//! real bound. Both bounds are inclusive; a missing side leaves the range open.

pub mod params;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::customer::{Customer, Gender};
use crate::domain::owner::OwnerId;

pub use params::FilterParams;

/// The fixed set of segmentation dimensions a caller may constrain.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudienceFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_age: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_visit_before: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_visit_after: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_total_visits: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_total_visits: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_latest_purchase: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_latest_purchase: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_total_purchase: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_total_purchase: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RangeField {
    Age,
    LastVisit,
    TotalVisits,
    LatestPurchase,
    TotalPurchase,
}

impl RangeField {
    pub fn column(&self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::LastVisit => "last_visit",
            Self::TotalVisits => "total_visits",
            Self::LatestPurchase => "latest_purchase",
            Self::TotalPurchase => "total_purchase",
        }
    }

    pub fn value_of(&self, customer: &Customer) -> Scalar {
        match self {
            Self::Age => Scalar::Integer(u64::from(customer.age)),
            Self::LastVisit => Scalar::Timestamp(customer.last_visit),
            Self::TotalVisits => Scalar::Integer(u64::from(customer.total_visits)),
            Self::LatestPurchase => Scalar::Integer(customer.latest_purchase),
            Self::TotalPurchase => Scalar::Integer(customer.total_purchase),
        }
    }
}

/// A bound value. A range only ever mixes bounds of the same variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Integer(u64),
    Timestamp(DateTime<Utc>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeConstraint {
    pub field: RangeField,
    pub lower: Option<Scalar>,
    pub upper: Option<Scalar>,
}

impl RangeConstraint {
    pub fn contains(&self, value: &Scalar) -> bool {
        let above_lower = self.lower.as_ref().map_or(true, |lower| value >= lower);
        let below_upper = self.upper.as_ref().map_or(true, |upper| value <= upper);
        above_lower && below_upper
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    Gender(Gender),
    Range(RangeConstraint),
}

impl Constraint {
    pub fn admits(&self, customer: &Customer) -> bool {
        match self {
            Self::Gender(gender) => customer.gender == *gender,
            Self::Range(range) => range.contains(&range.field.value_of(customer)),
        }
    }
}

/// Owner equality plus the conjunction of every constraint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudiencePredicate {
    pub owner: OwnerId,
    pub constraints: Vec<Constraint>,
}

impl AudiencePredicate {
    pub fn owner_only(owner: OwnerId) -> Self {
        Self { owner, constraints: Vec::new() }
    }

    pub fn matches(&self, customer: &Customer) -> bool {
        customer.owner == self.owner
            && self.constraints.iter().all(|constraint| constraint.admits(customer))
    }
}

/// Builds the predicate for `owner` and `filter`. Pure and deterministic: constraints
/// come out in a fixed dimension order.
pub fn build_predicate(owner: &OwnerId, filter: &AudienceFilter) -> AudiencePredicate {
    let mut constraints = Vec::new();

    constraints.extend(range(
        RangeField::Age,
        filter.min_age.map(Scalar::Integer),
        filter.max_age.map(Scalar::Integer),
    ));

    if let Some(gender) = filter.gender {
        constraints.push(Constraint::Gender(gender));
    }

    constraints.extend(range(
        RangeField::LastVisit,
        filter.last_visit_after.map(Scalar::Timestamp),
        filter.last_visit_before.map(Scalar::Timestamp),
    ));

    constraints.extend(range(
        RangeField::TotalVisits,
        filter.min_total_visits.map(Scalar::Integer),
        filter.max_total_visits.map(Scalar::Integer),
    ));

    constraints.extend(range(
        RangeField::LatestPurchase,
        filter.min_latest_purchase.map(Scalar::Integer),
        filter.max_latest_purchase.map(Scalar::Integer),
    ));

    constraints.extend(range(
        RangeField::TotalPurchase,
        filter.min_total_purchase.map(Scalar::Integer),
        filter.max_total_purchase.map(Scalar::Integer),
    ));

    AudiencePredicate { owner: owner.clone(), constraints }
}

fn range(field: RangeField, lower: Option<Scalar>, upper: Option<Scalar>) -> Option<Constraint> {
    if lower.is_none() && upper.is_none() {
        return None;
    }
    Some(Constraint::Range(RangeConstraint { field, lower, upper }))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{
        build_predicate, AudienceFilter, AudiencePredicate, Constraint, RangeConstraint,
        RangeField, Scalar,
    };
    use crate::domain::customer::{Customer, Gender, NewCustomer};
    use crate::domain::owner::OwnerId;

    fn owner(raw: &str) -> OwnerId {
        OwnerId::parse(raw).expect("owner")
    }

    fn customer(uid: &str, age: u32, visits: u32, purchase: u64) -> Customer {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).single().expect("now");
        Customer::create(
            NewCustomer {
                owner: owner(uid),
                name: format!("customer-{age}"),
                email: format!("c{age}@example.com"),
                age,
                gender: Gender::Other,
                last_visit: now,
                total_visits: visits,
                latest_purchase: purchase,
                total_purchase: purchase,
            },
            now,
        )
    }

    #[test]
    fn empty_filter_constrains_only_the_owner() {
        let predicate = build_predicate(&owner("u1"), &AudienceFilter::default());
        assert_eq!(predicate, AudiencePredicate::owner_only(owner("u1")));
    }

    #[test]
    fn zero_bound_is_present_not_absent() {
        let predicate = build_predicate(
            &owner("u1"),
            &AudienceFilter { min_total_visits: Some(0), ..AudienceFilter::default() },
        );

        assert_eq!(
            predicate.constraints,
            vec![Constraint::Range(RangeConstraint {
                field: RangeField::TotalVisits,
                lower: Some(Scalar::Integer(0)),
                upper: None,
            })]
        );
    }

    #[test]
    fn max_zero_selects_customers_without_visits() {
        let predicate = build_predicate(
            &owner("u1"),
            &AudienceFilter { max_total_visits: Some(0), ..AudienceFilter::default() },
        );

        assert!(predicate.matches(&customer("u1", 40, 0, 500)));
        assert!(!predicate.matches(&customer("u1", 25, 3, 100)));
    }

    #[test]
    fn half_open_ranges_leave_the_missing_side_unbounded() {
        let predicate = build_predicate(
            &owner("u1"),
            &AudienceFilter { min_age: Some(30), ..AudienceFilter::default() },
        );

        assert!(predicate.matches(&customer("u1", 30, 0, 0)));
        assert!(predicate.matches(&customer("u1", 99, 0, 0)));
        assert!(!predicate.matches(&customer("u1", 29, 0, 0)));
    }

    #[test]
    fn upper_bound_beyond_any_stored_age_admits_everyone() {
        let predicate = build_predicate(
            &owner("u1"),
            &AudienceFilter { max_age: Some(5_000_000_000), ..AudienceFilter::default() },
        );

        assert!(predicate.matches(&customer("u1", 18, 0, 0)));
        assert!(predicate.matches(&customer("u1", 120, 0, 0)));
    }

    #[test]
    fn bounds_are_inclusive_on_both_sides() {
        let predicate = build_predicate(
            &owner("u1"),
            &AudienceFilter {
                min_latest_purchase: Some(100),
                max_latest_purchase: Some(500),
                ..AudienceFilter::default()
            },
        );

        assert!(predicate.matches(&customer("u1", 20, 1, 100)));
        assert!(predicate.matches(&customer("u1", 20, 1, 500)));
        assert!(!predicate.matches(&customer("u1", 20, 1, 501)));
    }

    #[test]
    fn other_owners_never_match() {
        let predicate = build_predicate(&owner("u1"), &AudienceFilter::default());
        assert!(!predicate.matches(&customer("u2", 25, 3, 100)));
    }

    #[test]
    fn last_visit_after_is_the_lower_bound() {
        let after = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("after");
        let before = Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).single().expect("before");
        let predicate = build_predicate(
            &owner("u1"),
            &AudienceFilter {
                last_visit_after: Some(after),
                last_visit_before: Some(before),
                ..AudienceFilter::default()
            },
        );

        assert_eq!(
            predicate.constraints,
            vec![Constraint::Range(RangeConstraint {
                field: RangeField::LastVisit,
                lower: Some(Scalar::Timestamp(after)),
                upper: Some(Scalar::Timestamp(before)),
            })]
        );
    }

    #[test]
    fn constraints_follow_dimension_order() {
        let predicate = build_predicate(
            &owner("u1"),
            &AudienceFilter {
                max_total_purchase: Some(10),
                gender: Some(Gender::Female),
                max_age: Some(60),
                ..AudienceFilter::default()
            },
        );

        let kinds: Vec<String> = predicate
            .constraints
            .iter()
            .map(|constraint| match constraint {
                Constraint::Gender(_) => "gender".to_string(),
                Constraint::Range(range) => range.field.column().to_string(),
            })
            .collect();
        assert_eq!(kinds, vec!["age", "gender", "total_purchase"]);
    }

    #[test]
    fn filter_serializes_only_present_parameters() {
        let filter = AudienceFilter { min_age: Some(0), ..AudienceFilter::default() };
        let json = serde_json::to_value(&filter).expect("serialize");
        assert_eq!(json, serde_json::json!({ "minAge": 0 }));
    }
}
