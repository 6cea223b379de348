//! Schema bootstrap
//!
//! Statements are idempotent so they can run on every startup.

use sqlx::PgPool;
use tracing::info;

pub const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id              UUID PRIMARY KEY,
    email           TEXT NOT NULL UNIQUE,
    password_hash   TEXT,
    provider        TEXT NOT NULL DEFAULT 'email',
    first_name      TEXT NOT NULL DEFAULT '',
    last_name       TEXT NOT NULL DEFAULT '',
    email_verified  BOOLEAN NOT NULL DEFAULT FALSE,
    is_active       BOOLEAN NOT NULL DEFAULT TRUE,
    last_login      TIMESTAMPTZ,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS urls (
    id                    BIGSERIAL PRIMARY KEY,
    short_code            VARCHAR(10) NOT NULL UNIQUE,
    original_url          TEXT NOT NULL,
    user_id               UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    status                VARCHAR(10) NOT NULL DEFAULT 'active'
                          CHECK (status IN ('active', 'paused')),
    created_at            TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at            TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    expires_at            TIMESTAMPTZ,
    click_count           BIGINT NOT NULL DEFAULT 0,
    qr_code_image         BYTEA,
    qr_code_size          INTEGER,
    qr_code_format        VARCHAR(10),
    qr_code_generated_at  TIMESTAMPTZ,
    CHECK (expires_at IS NULL OR expires_at > created_at)
);

CREATE INDEX IF NOT EXISTS idx_urls_user_id ON urls(user_id);

CREATE TABLE IF NOT EXISTS url_visits (
    id          BIGSERIAL PRIMARY KEY,
    url_id      BIGINT NOT NULL REFERENCES urls(id) ON DELETE CASCADE,
    ip_address  TEXT NOT NULL DEFAULT '',
    user_agent  TEXT NOT NULL DEFAULT '',
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_url_visits_url_id ON url_visits(url_id);
";

/// Create tables and indexes that do not exist yet
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;
    info!("Database schema is up to date");
    Ok(())
}
