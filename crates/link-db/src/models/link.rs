//! Link and visit database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Row of the `urls` table without the image column
#[derive(Debug, Clone, FromRow)]
pub struct LinkModel {
    pub id: i64,
    pub short_code: String,
    pub original_url: String,
    pub user_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub click_count: i64,
    pub qr_code_size: Option<i32>,
    pub qr_code_format: Option<String>,
    pub qr_code_generated_at: Option<DateTime<Utc>>,
}

/// Aggregates over `url_visits` for one link
#[derive(Debug, Clone, FromRow)]
pub struct VisitStatsRow {
    pub total_visits: i64,
    pub unique_visitors: i64,
    pub last_visit_at: Option<DateTime<Utc>>,
    pub last_visit_user_agent: Option<String>,
}

/// A link joined with its visit aggregates
#[derive(Debug, Clone, FromRow)]
pub struct LinkSummaryRow {
    #[sqlx(flatten)]
    pub link: LinkModel,
    #[sqlx(flatten)]
    pub stats: VisitStatsRow,
}

/// Cached QR columns
#[derive(Debug, Clone, FromRow)]
pub struct QrImageRow {
    pub qr_code_image: Vec<u8>,
    pub qr_code_size: Option<i32>,
    pub qr_code_format: Option<String>,
    pub qr_code_generated_at: Option<DateTime<Utc>>,
}
