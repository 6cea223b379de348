//! Visit aggregates reported alongside links

use chrono::{DateTime, Utc};

use super::ShortLink;

/// Aggregated visit rows for one link
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitStats {
    pub total_visits: i64,
    pub unique_visitors: i64,
    pub last_visit_at: Option<DateTime<Utc>>,
    pub last_visit_user_agent: Option<String>,
}

/// A link together with its visit aggregates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSummary {
    pub link: ShortLink,
    pub stats: VisitStats,
}

impl LinkSummary {
    /// Click count shown to users.
    ///
    /// Visit rows are authoritative; the stored counter is only shown when
    /// there are no visit rows but the counter is positive.
    pub fn display_click_count(&self) -> i64 {
        if self.stats.total_visits == 0 && self.link.click_count > 0 {
            self.link.click_count
        } else {
            self.stats.total_visits
        }
    }
}
