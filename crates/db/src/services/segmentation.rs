use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use reach_core::audience::{build_predicate, AudienceFilter, AudiencePredicate};
use reach_core::domain::customer::Customer;
use reach_core::domain::owner::OwnerId;
use reach_core::errors::ApplicationError;

use crate::repositories::CustomerRepository;

/// Customers matched by one predicate. An empty audience is a normal result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Audience {
    pub customers: Vec<Customer>,
    pub count: usize,
}

#[derive(Clone)]
pub struct SegmentationService {
    customers: Arc<dyn CustomerRepository>,
}

impl SegmentationService {
    pub fn new(customers: Arc<dyn CustomerRepository>) -> Self {
        Self { customers }
    }

    pub async fn segment(
        &self,
        predicate: &AudiencePredicate,
    ) -> Result<Audience, ApplicationError> {
        let customers = self.customers.find_matching(predicate).await?;
        let count = customers.len();

        info!(
            event_name = "audience.segmented",
            owner = %predicate.owner,
            constraints = predicate.constraints.len(),
            matched = count,
            "audience segment executed"
        );

        Ok(Audience { customers, count })
    }

    pub async fn segment_filter(
        &self,
        owner: &OwnerId,
        filter: &AudienceFilter,
    ) -> Result<Audience, ApplicationError> {
        self.segment(&build_predicate(owner, filter)).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use reach_core::audience::{AudienceFilter, AudiencePredicate};
    use reach_core::domain::customer::{Customer, Gender, NewCustomer};
    use reach_core::domain::owner::OwnerId;

    use super::SegmentationService;
    use crate::repositories::{CustomerRepository, InMemoryCustomerRepository};

    fn owner(raw: &str) -> OwnerId {
        OwnerId::parse(raw).expect("owner")
    }

    fn customer(uid: &str, email: &str, age: u32, visits: u32, purchase: u64) -> Customer {
        let now = Utc::now();
        Customer::create(
            NewCustomer {
                owner: owner(uid),
                name: email.to_string(),
                email: email.to_string(),
                age,
                gender: Gender::Other,
                last_visit: now - Duration::days(1),
                total_visits: visits,
                latest_purchase: purchase,
                total_purchase: purchase,
            },
            now,
        )
    }

    async fn scenario_service() -> SegmentationService {
        let repo = Arc::new(InMemoryCustomerRepository::default());
        repo.insert(customer("u1", "a@example.com", 25, 3, 100)).await.expect("A");
        repo.insert(customer("u1", "b@example.com", 40, 0, 500)).await.expect("B");
        repo.insert(customer("u2", "z@example.com", 40, 0, 500)).await.expect("other owner");
        SegmentationService::new(repo)
    }

    #[tokio::test]
    async fn scenario_filters_select_the_expected_customers() {
        let service = scenario_service().await;

        let older = service
            .segment_filter(
                &owner("u1"),
                &AudienceFilter { min_age: Some(30), ..Default::default() },
            )
            .await
            .expect("min age");
        assert_eq!(older.count, 1);
        assert_eq!(older.customers[0].email, "b@example.com");

        let no_visits = service
            .segment_filter(
                &owner("u1"),
                &AudienceFilter { max_total_visits: Some(0), ..Default::default() },
            )
            .await
            .expect("max visits");
        assert_eq!(no_visits.count, 1);
        assert_eq!(no_visits.customers[0].email, "b@example.com");

        let everyone =
            service.segment_filter(&owner("u1"), &AudienceFilter::default()).await.expect("all");
        assert_eq!(everyone.count, 2);
        assert!(everyone.customers.iter().all(|c| c.owner.as_str() == "u1"));
    }

    #[tokio::test]
    async fn empty_audience_is_a_success() {
        let service = scenario_service().await;
        let audience = service
            .segment(&AudiencePredicate::owner_only(owner("nobody")))
            .await
            .expect("segment");
        assert_eq!(audience.count, 0);
        assert!(audience.customers.is_empty());
    }

    #[tokio::test]
    async fn segment_is_idempotent_without_writes() {
        let service = scenario_service().await;
        let filter = AudienceFilter { min_latest_purchase: Some(100), ..Default::default() };

        let first = service.segment_filter(&owner("u1"), &filter).await.expect("first");
        let second = service.segment_filter(&owner("u1"), &filter).await.expect("second");
        assert_eq!(first, second);
    }
}
