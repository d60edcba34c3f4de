use tokio::sync::RwLock;

use reach_core::audience::AudiencePredicate;
use reach_core::domain::campaign::{Campaign, SortOrder};
use reach_core::domain::customer::Customer;
use reach_core::domain::owner::OwnerId;

use super::{CampaignRepository, CustomerRepository, RepositoryError};

/// Customers kept in insertion order, which stands in for SQLite's rowid.
#[derive(Default)]
pub struct InMemoryCustomerRepository {
    customers: RwLock<Vec<Customer>>,
}

#[async_trait::async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn insert(&self, customer: Customer) -> Result<(), RepositoryError> {
        let mut customers = self.customers.write().await;
        let taken = customers
            .iter()
            .any(|existing| existing.owner == customer.owner && existing.email == customer.email);
        if taken {
            return Err(RepositoryError::Conflict(format!(
                "customer `{}` already exists for owner `{}`",
                customer.email, customer.owner
            )));
        }
        customers.push(customer);
        Ok(())
    }

    async fn find_by_owner_and_email(
        &self,
        owner: &OwnerId,
        email: &str,
    ) -> Result<Option<Customer>, RepositoryError> {
        let customers = self.customers.read().await;
        Ok(customers
            .iter()
            .find(|customer| customer.owner == *owner && customer.email == email)
            .cloned())
    }

    async fn find_matching(
        &self,
        predicate: &AudiencePredicate,
    ) -> Result<Vec<Customer>, RepositoryError> {
        let customers = self.customers.read().await;
        Ok(customers.iter().filter(|customer| predicate.matches(customer)).cloned().collect())
    }

    async fn list_for_owner(&self, owner: &OwnerId) -> Result<Vec<Customer>, RepositoryError> {
        let customers = self.customers.read().await;
        let mut owned: Vec<Customer> =
            customers.iter().filter(|customer| customer.owner == *owner).cloned().collect();
        owned.sort_by_key(|customer| customer.created_at);
        Ok(owned)
    }

    async fn list_recent_visitors(
        &self,
        owner: &OwnerId,
        limit: u32,
    ) -> Result<Vec<Customer>, RepositoryError> {
        let customers = self.customers.read().await;
        let mut owned: Vec<Customer> =
            customers.iter().filter(|customer| customer.owner == *owner).cloned().collect();
        owned.sort_by_key(|customer| customer.last_visit);
        owned.reverse();
        owned.truncate(limit as usize);
        Ok(owned)
    }
}

#[derive(Default)]
pub struct InMemoryCampaignRepository {
    campaigns: RwLock<Vec<Campaign>>,
}

#[async_trait::async_trait]
impl CampaignRepository for InMemoryCampaignRepository {
    async fn insert(&self, campaign: Campaign) -> Result<(), RepositoryError> {
        let mut campaigns = self.campaigns.write().await;
        campaigns.push(campaign);
        Ok(())
    }

    async fn list_for_owner(
        &self,
        owner: &OwnerId,
        order: SortOrder,
    ) -> Result<Vec<Campaign>, RepositoryError> {
        let campaigns = self.campaigns.read().await;
        let mut owned: Vec<Campaign> =
            campaigns.iter().filter(|campaign| campaign.owner == *owner).cloned().collect();
        owned.sort_by_key(|campaign| campaign.created_at);
        if order == SortOrder::Desc {
            owned.reverse();
        }
        Ok(owned)
    }
}
