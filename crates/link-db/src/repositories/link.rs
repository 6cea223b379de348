//! PostgreSQL implementation of LinkRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use link_core::{
    DomainError, LinkRepository, LinkSummary, NewLink, NewVisit, QrImage, RepoResult, ShortCode,
    ShortLink, UserId, VisitStats,
};

use crate::models::{LinkModel, LinkSummaryRow, QrImageRow, VisitStatsRow};

use super::error::{link_id_not_found, map_db_error, map_unique_violation};

const LINK_COLUMNS: &str = r"
    u.id, u.short_code, u.original_url, u.user_id, u.status, u.created_at, u.updated_at,
    u.expires_at, u.click_count, u.qr_code_size, u.qr_code_format, u.qr_code_generated_at
";

const VISIT_AGGREGATES: &str = r"
    COALESCE(agg.total_visits, 0) AS total_visits,
    COALESCE(agg.unique_visitors, 0) AS unique_visitors,
    latest.created_at AS last_visit_at,
    latest.user_agent AS last_visit_user_agent
";

const VISIT_JOINS: &str = r"
    LEFT JOIN LATERAL (
        SELECT COUNT(*) AS total_visits, COUNT(DISTINCT ip_address) AS unique_visitors
        FROM url_visits WHERE url_id = u.id
    ) agg ON TRUE
    LEFT JOIN LATERAL (
        SELECT created_at, user_agent
        FROM url_visits WHERE url_id = u.id
        ORDER BY created_at DESC, id DESC
        LIMIT 1
    ) latest ON TRUE
";

/// PostgreSQL implementation of LinkRepository
#[derive(Clone)]
pub struct PgLinkRepository {
    pool: PgPool,
}

impl PgLinkRepository {
    /// Create a new PgLinkRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    #[instrument(skip(self, link), fields(code = %link.code))]
    async fn insert(&self, link: &NewLink) -> RepoResult<ShortLink> {
        let id = sqlx::query_scalar::<_, i64>(
            r"
            INSERT INTO urls (short_code, original_url, user_id, status, created_at, updated_at, expires_at, click_count)
            VALUES ($1, $2, $3, 'active', $4, $4, $5, 0)
            RETURNING id
            ",
        )
        .bind(link.code.as_str())
        .bind(&link.destination)
        .bind(link.owner_id.into_inner())
        .bind(link.created_at)
        .bind(link.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::ShortCodeTaken))?;

        Ok(link.clone().into_link(id))
    }

    #[instrument(skip(self))]
    async fn find_by_code(&self, code: &ShortCode) -> RepoResult<Option<ShortLink>> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM urls u WHERE u.short_code = $1");

        let result = sqlx::query_as::<_, LinkModel>(&sql)
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        result.map(ShortLink::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_owner(&self, owner_id: UserId) -> RepoResult<Vec<LinkSummary>> {
        let sql = format!(
            "SELECT {LINK_COLUMNS}, {VISIT_AGGREGATES} FROM urls u {VISIT_JOINS} \
             WHERE u.user_id = $1 ORDER BY u.created_at DESC, u.id DESC"
        );

        let rows = sqlx::query_as::<_, LinkSummaryRow>(&sql)
            .bind(owner_id.into_inner())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        rows.into_iter().map(LinkSummary::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn visit_stats(&self, link_id: i64) -> RepoResult<VisitStats> {
        let sql = format!("SELECT {VISIT_AGGREGATES} FROM urls u {VISIT_JOINS} WHERE u.id = $1");

        let row = sqlx::query_as::<_, VisitStatsRow>(&sql)
            .bind(link_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| link_id_not_found(link_id))?;

        Ok(VisitStats::from(row))
    }

    #[instrument(skip(self, link), fields(code = %link.code))]
    async fn update(&self, link: &ShortLink) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE urls
            SET original_url = $2, status = $3, expires_at = $4, updated_at = $5
            WHERE id = $1
            ",
        )
        .bind(link.id)
        .bind(&link.destination)
        .bind(link.status.as_str())
        .bind(link.expires_at)
        .bind(link.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(link_id_not_found(link.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_qr_image(&self, link_id: i64) -> RepoResult<Option<QrImage>> {
        let result = sqlx::query_as::<_, QrImageRow>(
            r"
            SELECT qr_code_image, qr_code_size, qr_code_format, qr_code_generated_at
            FROM urls
            WHERE id = $1 AND qr_code_image IS NOT NULL
            ",
        )
        .bind(link_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(QrImage::try_from).transpose()
    }

    #[instrument(skip(self, image), fields(size = image.metadata.size))]
    async fn save_qr(&self, link_id: i64, image: &QrImage) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE urls
            SET qr_code_image = $2, qr_code_size = $3, qr_code_format = $4, qr_code_generated_at = $5
            WHERE id = $1
            ",
        )
        .bind(link_id)
        .bind(&image.bytes)
        .bind(image.metadata.size as i32)
        .bind(&image.metadata.format)
        .bind(image.metadata.generated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(link_id_not_found(link_id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, link_id: i64) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM urls WHERE id = $1")
            .bind(link_id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(link_id_not_found(link_id));
        }

        Ok(())
    }

    #[instrument(skip(self, visit), fields(link_id = visit.link_id))]
    async fn record_visit_and_increment(&self, visit: &NewVisit) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Lock the link row first so concurrent visits serialize on it
        let result = sqlx::query("UPDATE urls SET click_count = click_count + 1 WHERE id = $1")
            .bind(visit.link_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(link_id_not_found(visit.link_id));
        }

        sqlx::query(
            r"
            INSERT INTO url_visits (url_id, ip_address, user_agent, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(visit.link_id)
        .bind(&visit.ip_address)
        .bind(&visit.user_agent)
        .bind(visit.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn ping(&self) -> RepoResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }
}
