use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use reach_core::domain::campaign::{Campaign, NewCampaign, SortOrder};
use reach_core::domain::customer::{Customer, Gender, NewCustomer};
use reach_core::domain::owner::OwnerId;

use crate::connection::DbPool;
use crate::repositories::{
    CampaignRepository, CustomerRepository, RepositoryError, SqlCampaignRepository,
    SqlCustomerRepository,
};

pub const DEMO_OWNER: &str = "demo";

struct DemoCustomer {
    name: &'static str,
    email: &'static str,
    age: u32,
    gender: Gender,
    /// `(year, month, day)` of the last visit, midnight UTC.
    last_visit: (i32, u32, u32),
    total_visits: u32,
    latest_purchase: u64,
    total_purchase: u64,
}

const DEMO_CUSTOMERS: &[DemoCustomer] = &[
    DemoCustomer {
        name: "Asha Verma",
        email: "asha.verma@example.com",
        age: 25,
        gender: Gender::Female,
        last_visit: (2024, 5, 28),
        total_visits: 3,
        latest_purchase: 100,
        total_purchase: 240,
    },
    DemoCustomer {
        name: "Bilal Khan",
        email: "bilal.khan@example.com",
        age: 40,
        gender: Gender::Male,
        last_visit: (2024, 1, 14),
        total_visits: 0,
        latest_purchase: 500,
        total_purchase: 500,
    },
    DemoCustomer {
        name: "Chen Wei",
        email: "chen.wei@example.com",
        age: 33,
        gender: Gender::Other,
        last_visit: (2024, 4, 2),
        total_visits: 12,
        latest_purchase: 0,
        total_purchase: 3_150,
    },
    DemoCustomer {
        name: "Divya Nair",
        email: "divya.nair@example.com",
        age: 58,
        gender: Gender::Female,
        last_visit: (2023, 11, 19),
        total_visits: 27,
        latest_purchase: 1_200,
        total_purchase: 18_400,
    },
    DemoCustomer {
        name: "Emeka Obi",
        email: "emeka.obi@example.com",
        age: 19,
        gender: Gender::Male,
        last_visit: (2024, 5, 30),
        total_visits: 1,
        latest_purchase: 45,
        total_purchase: 45,
    },
    DemoCustomer {
        name: "Fatima Zahra",
        email: "fatima.zahra@example.com",
        age: 46,
        gender: Gender::Female,
        last_visit: (2024, 3, 8),
        total_visits: 6,
        latest_purchase: 310,
        total_purchase: 1_760,
    },
];

struct DemoCampaign {
    message: &'static str,
    /// Minute offset after the seed epoch, which fixes history order.
    minute: u32,
    size: u64,
}

const DEMO_CAMPAIGNS: &[DemoCampaign] = &[
    DemoCampaign { message: "Welcome back! 10% off your next visit.", minute: 0, size: 2 },
    DemoCampaign { message: "We miss you. Here is a free coffee.", minute: 30, size: 1 },
];

fn seed_epoch() -> Result<DateTime<Utc>, RepositoryError> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0)
        .single()
        .ok_or_else(|| RepositoryError::Decode("invalid seed epoch".to_string()))
}

fn demo_owner() -> Result<OwnerId, RepositoryError> {
    OwnerId::parse(DEMO_OWNER).map_err(|error| RepositoryError::Decode(error.to_string()))
}

/// Deterministic customers and campaigns for the `demo` owner.
pub struct DemoDataset;

impl DemoDataset {
    /// Loads the dataset. Safe to run repeatedly: customers already present for
    /// `(demo, email)` and campaigns already present by message are skipped.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let owner = demo_owner()?;
        let epoch = seed_epoch()?;
        let customers = SqlCustomerRepository::new(pool.clone());
        let campaigns = SqlCampaignRepository::new(pool.clone());
        let mut result = SeedResult::default();

        for (index, demo) in DEMO_CUSTOMERS.iter().enumerate() {
            let (year, month, day) = demo.last_visit;
            let last_visit =
                Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).single().ok_or_else(|| {
                    RepositoryError::Decode(format!("invalid date for {}", demo.email))
                })?;
            let created_at = epoch + chrono::Duration::seconds(index as i64);

            let customer = Customer::create(
                NewCustomer {
                    owner: owner.clone(),
                    name: demo.name.to_string(),
                    email: demo.email.to_string(),
                    age: demo.age,
                    gender: demo.gender,
                    last_visit,
                    total_visits: demo.total_visits,
                    latest_purchase: demo.latest_purchase,
                    total_purchase: demo.total_purchase,
                },
                created_at,
            );

            match customers.insert(customer).await {
                Ok(()) => result.customers_inserted += 1,
                Err(RepositoryError::Conflict(_)) => result.customers_skipped += 1,
                Err(error) => return Err(error),
            }
        }

        let existing = campaigns.list_for_owner(&owner, SortOrder::Asc).await?;
        for demo in DEMO_CAMPAIGNS {
            if existing.iter().any(|campaign| campaign.message == demo.message) {
                result.campaigns_skipped += 1;
                continue;
            }

            let campaign = Campaign::create(
                NewCampaign {
                    owner: owner.clone(),
                    message: demo.message.to_string(),
                    query: json!({ "uid": DEMO_OWNER, "minTotalVisits": "0" }),
                    size: demo.size,
                },
                epoch + chrono::Duration::minutes(i64::from(demo.minute)),
            );
            campaigns.insert(campaign).await?;
            result.campaigns_inserted += 1;
        }

        Ok(result)
    }

    /// Checks that every demo record is present exactly once.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let owner = demo_owner()?;
        let customers = SqlCustomerRepository::new(pool.clone()).list_for_owner(&owner).await?;
        let campaigns = SqlCampaignRepository::new(pool.clone())
            .list_for_owner(&owner, SortOrder::Asc)
            .await?;

        let mut checks = Vec::new();
        for demo in DEMO_CUSTOMERS {
            let present = customers.iter().filter(|c| c.email == demo.email).count() == 1;
            checks.push((demo.email, present));
        }
        for demo in DEMO_CAMPAIGNS {
            let present = campaigns.iter().filter(|c| c.message == demo.message).count() == 1;
            checks.push((demo.message, present));
        }

        Ok(VerificationResult { all_present: checks.iter().all(|(_, ok)| *ok), checks })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeedResult {
    pub customers_inserted: usize,
    pub customers_skipped: usize,
    pub campaigns_inserted: usize,
    pub campaigns_skipped: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}
