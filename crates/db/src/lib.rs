pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;
pub mod services;

pub use connection::{connect, connect_with_settings, DbPool, RecordStore};
pub use fixtures::{DemoDataset, SeedResult, VerificationResult, DEMO_OWNER};
pub use repositories::RepositoryError;
pub use services::{Audience, CampaignRecorder, CustomerRegistry, SegmentationService};
