use std::sync::Arc;

use tracing::info;

use reach_core::domain::campaign::{Campaign, CampaignDraft, SortOrder};
use reach_core::domain::now;
use reach_core::domain::owner::OwnerId;
use reach_core::errors::ApplicationError;

use crate::repositories::CampaignRepository;

#[derive(Clone)]
pub struct CampaignRecorder {
    campaigns: Arc<dyn CampaignRepository>,
}

impl CampaignRecorder {
    pub fn new(campaigns: Arc<dyn CampaignRepository>) -> Self {
        Self { campaigns }
    }

    /// Persists a campaign. The draft is checked again here even when the caller
    /// already validated it; a bad draft never reaches the store.
    pub async fn record_campaign(
        &self,
        draft: CampaignDraft,
    ) -> Result<Campaign, ApplicationError> {
        let campaign = Campaign::create(draft.validate()?, now());
        self.campaigns.insert(campaign.clone()).await?;

        info!(
            event_name = "campaign.recorded",
            owner = %campaign.owner,
            campaign_id = %campaign.id.0,
            size = campaign.size,
            "campaign recorded"
        );
        Ok(campaign)
    }

    pub async fn list_campaigns(
        &self,
        owner: &OwnerId,
        order: SortOrder,
    ) -> Result<Vec<Campaign>, ApplicationError> {
        Ok(self.campaigns.list_for_owner(owner, order).await?)
    }
}
