use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::owner::OwnerId;
use crate::domain::store_precision;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub Uuid);

impl CustomerId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown gender `{0}` (expected male|female|other)")]
pub struct UnknownGender(pub String);

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }
}

impl FromStr for Gender {
    type Err = UnknownGender;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            other => Err(UnknownGender(other.to_string())),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted customer record. Created once, never mutated by this crate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    #[serde(rename = "uid")]
    pub owner: OwnerId,
    pub name: String,
    pub email: String,
    pub age: u32,
    pub gender: Gender,
    pub last_visit: DateTime<Utc>,
    pub total_visits: u32,
    pub latest_purchase: u64,
    pub total_purchase: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for a customer that has not been stored yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCustomer {
    pub owner: OwnerId,
    pub name: String,
    pub email: String,
    pub age: u32,
    pub gender: Gender,
    pub last_visit: DateTime<Utc>,
    pub total_visits: u32,
    pub latest_purchase: u64,
    pub total_purchase: u64,
}

impl Customer {
    pub fn create(new: NewCustomer, now: DateTime<Utc>) -> Self {
        let now = store_precision(now);
        Self {
            id: CustomerId::generate(),
            owner: new.owner,
            name: new.name,
            email: new.email,
            age: new.age,
            gender: new.gender,
            last_visit: store_precision(new.last_visit),
            total_visits: new.total_visits,
            latest_purchase: new.latest_purchase,
            total_purchase: new.total_purchase,
            created_at: now,
            updated_at: now,
        }
    }
}
