//! Storage layer: one repository per entity plus the codecs that keep
//! textual storage representations out of the rest of the system.

pub mod category_repository;
pub mod money;
pub mod order_item_repository;
pub mod order_repository;
pub mod product_repository;
pub mod user_repository;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

/// Render a timestamp for a TEXT column (RFC 3339, fractional seconds kept)
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

/// Parse a TEXT timestamp column back into a UTC timestamp
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("invalid timestamp in storage: {:?}", raw))
}
