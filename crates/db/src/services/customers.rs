use std::sync::Arc;

use tracing::{info, warn};

use reach_core::domain::customer::{Customer, NewCustomer};
use reach_core::domain::owner::OwnerId;
use reach_core::domain::now;
use reach_core::errors::{ApplicationError, DomainError};

use crate::repositories::{CustomerRepository, RepositoryError};

#[derive(Clone)]
pub struct CustomerRegistry {
    customers: Arc<dyn CustomerRepository>,
}

impl CustomerRegistry {
    pub fn new(customers: Arc<dyn CustomerRepository>) -> Self {
        Self { customers }
    }

    /// Stores a new customer, rejecting a second record for the same `(uid, email)`.
    ///
    /// The lookup up front only saves a write. Two concurrent submissions can both
    /// pass it; the store's unique index then rejects the loser, which is reported
    /// the same way.
    pub async fn add_customer(&self, new: NewCustomer) -> Result<Customer, ApplicationError> {
        let owner = new.owner.clone();
        let email = new.email.clone();

        if self.customers.find_by_owner_and_email(&owner, &email).await?.is_some() {
            return Err(duplicate(owner, email));
        }

        let customer = Customer::create(new, now());
        match self.customers.insert(customer.clone()).await {
            Ok(()) => {
                info!(
                    event_name = "customer.created",
                    owner = %customer.owner,
                    customer_id = %customer.id.0,
                    "customer created"
                );
                Ok(customer)
            }
            Err(RepositoryError::Conflict(_)) => Err(duplicate(owner, email)),
            Err(error) => Err(error.into()),
        }
    }

    pub async fn list_customers(&self, owner: &OwnerId) -> Result<Vec<Customer>, ApplicationError> {
        Ok(self.customers.list_for_owner(owner).await?)
    }

    pub async fn recent_visitors(
        &self,
        owner: &OwnerId,
        limit: u32,
    ) -> Result<Vec<Customer>, ApplicationError> {
        Ok(self.customers.list_recent_visitors(owner, limit).await?)
    }
}

fn duplicate(owner: OwnerId, email: String) -> ApplicationError {
    warn!(
        event_name = "customer.duplicate_rejected",
        owner = %owner,
        "customer rejected: email already registered for owner"
    );
    DomainError::DuplicateCustomer { owner, email }.into()
}
