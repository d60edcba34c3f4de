use sqlx::Row;

use reach_core::domain::campaign::{Campaign, CampaignId, SortOrder};
use reach_core::domain::owner::OwnerId;

use super::{decode_error, format_timestamp, parse_timestamp, CampaignRepository, RepositoryError};
use crate::DbPool;

pub struct SqlCampaignRepository {
    pool: DbPool,
}

impl SqlCampaignRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_campaign(row: &sqlx::sqlite::SqliteRow) -> Result<Campaign, RepositoryError> {
    let id: String = row.try_get("id").map_err(decode_error)?;
    let uid: String = row.try_get("uid").map_err(decode_error)?;
    let message: String = row.try_get("message").map_err(decode_error)?;
    let query_json: String = row.try_get("query_json").map_err(decode_error)?;
    let size: i64 = row.try_get("size").map_err(decode_error)?;
    let created_at: String = row.try_get("created_at").map_err(decode_error)?;
    let updated_at: String = row.try_get("updated_at").map_err(decode_error)?;

    Ok(Campaign {
        id: CampaignId(uuid::Uuid::parse_str(&id).map_err(decode_error)?),
        owner: OwnerId::parse(&uid).map_err(decode_error)?,
        message,
        query: serde_json::from_str(&query_json).map_err(decode_error)?,
        size: u64::try_from(size).map_err(decode_error)?,
        created_at: parse_timestamp("created_at", &created_at)?,
        updated_at: parse_timestamp("updated_at", &updated_at)?,
    })
}

#[async_trait::async_trait]
impl CampaignRepository for SqlCampaignRepository {
    async fn insert(&self, campaign: Campaign) -> Result<(), RepositoryError> {
        let query_json = serde_json::to_string(&campaign.query).map_err(decode_error)?;
        let size = i64::try_from(campaign.size).map_err(|_| {
            RepositoryError::Decode(format!("size {} is out of range", campaign.size))
        })?;

        sqlx::query(
            "INSERT INTO campaign (id, uid, message, query_json, size, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(campaign.id.0.to_string())
        .bind(campaign.owner.as_str())
        .bind(&campaign.message)
        .bind(query_json)
        .bind(size)
        .bind(format_timestamp(&campaign.created_at))
        .bind(format_timestamp(&campaign.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for_owner(
        &self,
        owner: &OwnerId,
        order: SortOrder,
    ) -> Result<Vec<Campaign>, RepositoryError> {
        let direction = order.as_sql();
        let rows = sqlx::query(&format!(
            "SELECT id, uid, message, query_json, size, created_at, updated_at
             FROM campaign
             WHERE uid = ?
             ORDER BY created_at {direction}, rowid {direction}"
        ))
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_campaign).collect::<Result<Vec<_>, _>>()
    }
}
