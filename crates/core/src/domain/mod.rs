pub mod campaign;
pub mod customer;
pub mod owner;

use chrono::{DateTime, SubsecRound, Utc};

/// Timestamps are persisted with millisecond precision; truncating up front keeps
/// in-memory values equal to what the store hands back.
pub fn store_precision(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(3)
}

pub fn now() -> DateTime<Utc> {
    store_precision(Utc::now())
}
