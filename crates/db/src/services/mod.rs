//! Services sitting between the HTTP surface and the repositories. Each one owns
//! shared repository handles and no other state, so clones are cheap.

pub mod campaigns;
pub mod customers;
pub mod segmentation;

pub use campaigns::CampaignRecorder;
pub use customers::CustomerRegistry;
pub use segmentation::{Audience, SegmentationService};
