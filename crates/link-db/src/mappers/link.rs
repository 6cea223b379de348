//! Link entity <-> model mapper
//!
//! Rows are validated on the way out: a stored code or status that does not
//! parse surfaces as a database error rather than a panic.

use link_core::{
    DomainError, LinkSummary, QrImage, QrMetadata, ShortCode, ShortLink, UserId, VisitStats,
};

use crate::models::{LinkModel, LinkSummaryRow, QrImageRow, VisitStatsRow};

fn corrupt(what: &str, value: &str) -> DomainError {
    DomainError::DatabaseError(format!("corrupt {what} in urls row: {value:?}"))
}

impl TryFrom<LinkModel> for ShortLink {
    type Error = DomainError;

    fn try_from(model: LinkModel) -> Result<Self, Self::Error> {
        let code = ShortCode::parse(&model.short_code)
            .map_err(|_| corrupt("short_code", &model.short_code))?;
        let status = model
            .status
            .parse()
            .map_err(|_| corrupt("status", &model.status))?;

        let qr = match (model.qr_code_size, model.qr_code_generated_at) {
            (Some(size), Some(generated_at)) if size > 0 => Some(QrMetadata {
                size: size as u32,
                format: model.qr_code_format.unwrap_or_default(),
                generated_at,
            }),
            _ => None,
        };

        Ok(ShortLink {
            id: model.id,
            code,
            destination: model.original_url,
            owner_id: UserId::new(model.user_id),
            status,
            created_at: model.created_at,
            updated_at: model.updated_at,
            expires_at: model.expires_at,
            click_count: model.click_count,
            qr,
        })
    }
}

impl From<VisitStatsRow> for VisitStats {
    fn from(row: VisitStatsRow) -> Self {
        VisitStats {
            total_visits: row.total_visits,
            unique_visitors: row.unique_visitors,
            last_visit_at: row.last_visit_at,
            last_visit_user_agent: row.last_visit_user_agent,
        }
    }
}

impl TryFrom<LinkSummaryRow> for LinkSummary {
    type Error = DomainError;

    fn try_from(row: LinkSummaryRow) -> Result<Self, Self::Error> {
        Ok(LinkSummary {
            link: ShortLink::try_from(row.link)?,
            stats: VisitStats::from(row.stats),
        })
    }
}

impl TryFrom<QrImageRow> for QrImage {
    type Error = DomainError;

    fn try_from(row: QrImageRow) -> Result<Self, Self::Error> {
        let (Some(size), Some(generated_at)) = (row.qr_code_size, row.qr_code_generated_at) else {
            return Err(DomainError::DatabaseError(
                "QR image stored without size or timestamp".to_string(),
            ));
        };

        Ok(QrImage {
            bytes: row.qr_code_image,
            metadata: QrMetadata {
                size: size as u32,
                format: row.qr_code_format.unwrap_or_default(),
                generated_at,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use link_core::LinkStatus;
    use uuid::Uuid;

    fn model() -> LinkModel {
        let now = Utc::now();
        LinkModel {
            id: 42,
            short_code: "abc123".to_string(),
            original_url: "https://example.com".to_string(),
            user_id: Uuid::new_v4(),
            status: "paused".to_string(),
            created_at: now,
            updated_at: now,
            expires_at: None,
            click_count: 3,
            qr_code_size: None,
            qr_code_format: None,
            qr_code_generated_at: None,
        }
    }

    #[test]
    fn test_model_to_entity() {
        let link = ShortLink::try_from(model()).unwrap();
        assert_eq!(link.id, 42);
        assert_eq!(link.code.as_str(), "abc123");
        assert_eq!(link.status, LinkStatus::Paused);
        assert!(link.qr.is_none());
    }

    #[test]
    fn test_qr_metadata_mapped() {
        let mut row = model();
        row.qr_code_size = Some(512);
        row.qr_code_format = Some("png".to_string());
        row.qr_code_generated_at = Some(Utc::now());

        let link = ShortLink::try_from(row).unwrap();
        assert_eq!(link.qr.unwrap().size, 512);
    }

    #[test]
    fn test_corrupt_status_is_database_error() {
        let mut row = model();
        row.status = "archived".to_string();
        assert!(matches!(
            ShortLink::try_from(row),
            Err(DomainError::DatabaseError(_))
        ));
    }
}
