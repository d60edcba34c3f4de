use async_trait::async_trait;
use thiserror::Error;

use reach_core::audience::AudiencePredicate;
use reach_core::domain::campaign::{Campaign, SortOrder};
use reach_core::domain::customer::Customer;
use reach_core::domain::owner::OwnerId;
use reach_core::errors::ApplicationError;

pub mod campaign;
pub mod customer;
pub mod memory;

pub use campaign::SqlCampaignRepository;
pub use customer::SqlCustomerRepository;
pub use memory::{InMemoryCampaignRepository, InMemoryCustomerRepository};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        Self::Persistence(value.to_string())
    }
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Fails with [`RepositoryError::Conflict`] when `(uid, email)` is already taken.
    async fn insert(&self, customer: Customer) -> Result<(), RepositoryError>;

    async fn find_by_owner_and_email(
        &self,
        owner: &OwnerId,
        email: &str,
    ) -> Result<Option<Customer>, RepositoryError>;

    async fn find_matching(
        &self,
        predicate: &AudiencePredicate,
    ) -> Result<Vec<Customer>, RepositoryError>;

    async fn list_for_owner(&self, owner: &OwnerId) -> Result<Vec<Customer>, RepositoryError>;

    async fn list_recent_visitors(
        &self,
        owner: &OwnerId,
        limit: u32,
    ) -> Result<Vec<Customer>, RepositoryError>;
}

#[async_trait]
pub trait CampaignRepository: Send + Sync {
    async fn insert(&self, campaign: Campaign) -> Result<(), RepositoryError>;

    async fn list_for_owner(
        &self,
        owner: &OwnerId,
        order: SortOrder,
    ) -> Result<Vec<Campaign>, RepositoryError>;
}

pub(crate) fn decode_error(error: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Decode(error.to_string())
}

pub(crate) fn format_timestamp(at: &chrono::DateTime<chrono::Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub(crate) fn parse_timestamp(
    column: &str,
    raw: &str,
) -> Result<chrono::DateTime<chrono::Utc>, RepositoryError> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|error| RepositoryError::Decode(format!("{column}: {error}")))
}
