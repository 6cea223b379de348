//! Thread-safe in-memory repositories for local development and tests.
//!
//! Every operation takes the table lock once, so multi-step writes such as
//! visit recording are atomic with respect to other callers.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use link_core::{
    DomainError, LinkRepository, LinkSummary, NewLink, NewVisit, QrImage, RepoResult, ShortCode,
    ShortLink, User, UserId, UserRepository, Visit, VisitStats,
};

// ============================================================================
// Links
// ============================================================================

#[derive(Debug, Default)]
struct LinkTable {
    next_link_id: i64,
    next_visit_id: i64,
    links: HashMap<i64, ShortLink>,
    codes: HashMap<ShortCode, i64>,
    qr_images: HashMap<i64, Vec<u8>>,
    visits: Vec<Visit>,
}

impl LinkTable {
    fn stats_for(&self, link_id: i64) -> VisitStats {
        let visits: Vec<&Visit> = self.visits.iter().filter(|v| v.link_id == link_id).collect();
        let unique: HashSet<&str> = visits.iter().map(|v| v.ip_address.as_str()).collect();
        let latest = visits.iter().max_by_key(|v| (v.created_at, v.id));

        VisitStats {
            total_visits: visits.len() as i64,
            unique_visitors: unique.len() as i64,
            last_visit_at: latest.map(|v| v.created_at),
            last_visit_user_agent: latest.map(|v| v.user_agent.clone()),
        }
    }

    fn link_mut(&mut self, link_id: i64) -> RepoResult<&mut ShortLink> {
        self.links
            .get_mut(&link_id)
            .ok_or_else(|| DomainError::LinkNotFound(format!("#{link_id}")))
    }
}

/// In-process [`LinkRepository`]
#[derive(Clone, Debug, Default)]
pub struct InMemoryLinkRepository {
    table: Arc<RwLock<LinkTable>>,
    fail_inserts: Arc<AtomicBool>,
    fail_visits: Arc<AtomicBool>,
}

impl InMemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make inserts fail with a storage error until switched back off
    pub fn set_fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Make visit recording fail until switched back off
    pub fn set_fail_visits(&self, fail: bool) {
        self.fail_visits.store(fail, Ordering::SeqCst);
    }

    /// Number of visit rows stored for a link
    pub fn visit_rows(&self, link_id: i64) -> usize {
        self.table
            .read()
            .visits
            .iter()
            .filter(|v| v.link_id == link_id)
            .count()
    }

    /// Overwrite a stored link as-is, bypassing domain checks
    pub fn put(&self, link: ShortLink) {
        let mut table = self.table.write();
        table.codes.insert(link.code.clone(), link.id);
        table.next_link_id = table.next_link_id.max(link.id);
        table.links.insert(link.id, link);
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn insert(&self, link: &NewLink) -> RepoResult<ShortLink> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("inserts disabled".to_string()));
        }

        let mut table = self.table.write();

        if table.codes.contains_key(&link.code) {
            return Err(DomainError::ShortCodeTaken);
        }

        table.next_link_id += 1;
        let stored = link.clone().into_link(table.next_link_id);
        table.codes.insert(stored.code.clone(), stored.id);
        table.links.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn find_by_code(&self, code: &ShortCode) -> RepoResult<Option<ShortLink>> {
        let table = self.table.read();

        Ok(table
            .codes
            .get(code)
            .and_then(|id| table.links.get(id))
            .cloned())
    }

    async fn find_by_owner(&self, owner_id: UserId) -> RepoResult<Vec<LinkSummary>> {
        let table = self.table.read();

        let mut summaries: Vec<LinkSummary> = table
            .links
            .values()
            .filter(|link| link.owner_id == owner_id)
            .map(|link| LinkSummary {
                link: link.clone(),
                stats: table.stats_for(link.id),
            })
            .collect();

        summaries.sort_by(|a, b| {
            (b.link.created_at, b.link.id).cmp(&(a.link.created_at, a.link.id))
        });

        Ok(summaries)
    }

    async fn visit_stats(&self, link_id: i64) -> RepoResult<VisitStats> {
        let table = self.table.read();

        if !table.links.contains_key(&link_id) {
            return Err(DomainError::LinkNotFound(format!("#{link_id}")));
        }

        Ok(table.stats_for(link_id))
    }

    async fn update(&self, link: &ShortLink) -> RepoResult<()> {
        let mut table = self.table.write();
        let stored = table.link_mut(link.id)?;

        stored.destination.clone_from(&link.destination);
        stored.status = link.status;
        stored.expires_at = link.expires_at;
        stored.updated_at = link.updated_at;

        Ok(())
    }

    async fn find_qr_image(&self, link_id: i64) -> RepoResult<Option<QrImage>> {
        let table = self.table.read();

        let image = table.qr_images.get(&link_id).and_then(|bytes| {
            let metadata = table.links.get(&link_id)?.qr.clone()?;
            Some(QrImage {
                bytes: bytes.clone(),
                metadata,
            })
        });

        Ok(image)
    }

    async fn save_qr(&self, link_id: i64, image: &QrImage) -> RepoResult<()> {
        let mut table = self.table.write();

        table.link_mut(link_id)?.qr = Some(image.metadata.clone());
        table.qr_images.insert(link_id, image.bytes.clone());

        Ok(())
    }

    async fn delete(&self, link_id: i64) -> RepoResult<()> {
        let mut table = self.table.write();

        let link = table
            .links
            .remove(&link_id)
            .ok_or_else(|| DomainError::LinkNotFound(format!("#{link_id}")))?;
        table.codes.remove(&link.code);
        table.qr_images.remove(&link_id);
        table.visits.retain(|v| v.link_id != link_id);

        Ok(())
    }

    async fn record_visit_and_increment(&self, visit: &NewVisit) -> RepoResult<()> {
        if self.fail_visits.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError(
                "visit recording disabled".to_string(),
            ));
        }

        let mut table = self.table.write();

        table.link_mut(visit.link_id)?.click_count += 1;
        table.next_visit_id += 1;
        let id = table.next_visit_id;
        table.visits.push(Visit {
            id,
            link_id: visit.link_id,
            ip_address: visit.ip_address.clone(),
            user_agent: visit.user_agent.clone(),
            created_at: visit.created_at,
        });

        Ok(())
    }

    async fn ping(&self) -> RepoResult<()> {
        Ok(())
    }
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone)]
struct UserRecord {
    user: User,
    password_hash: Option<String>,
}

/// In-process [`UserRepository`]
#[derive(Clone, Debug, Default)]
pub struct InMemoryUserRepository(Arc<RwLock<HashMap<UserId, UserRecord>>>);

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the active flag on a stored user
    pub fn set_active(&self, id: UserId, active: bool) {
        if let Some(record) = self.0.write().get_mut(&id) {
            record.user.is_active = active;
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        Ok(self.0.read().get(&id).map(|r| r.user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self
            .0
            .read()
            .values()
            .find(|r| r.user.email == email)
            .map(|r| r.user.clone()))
    }

    async fn email_exists(&self, email: &str) -> RepoResult<bool> {
        Ok(self.0.read().values().any(|r| r.user.email == email))
    }

    async fn create(&self, user: &User, password_hash: Option<&str>) -> RepoResult<()> {
        let mut users = self.0.write();

        if users.values().any(|r| r.user.email == user.email) {
            return Err(DomainError::EmailAlreadyExists);
        }

        users.insert(
            user.id,
            UserRecord {
                user: user.clone(),
                password_hash: password_hash.map(String::from),
            },
        );

        Ok(())
    }

    async fn get_password_hash(&self, id: UserId) -> RepoResult<Option<String>> {
        Ok(self
            .0
            .read()
            .get(&id)
            .and_then(|r| r.password_hash.clone()))
    }

    async fn touch_last_login(&self, id: UserId, at: DateTime<Utc>) -> RepoResult<()> {
        let mut users = self.0.write();
        let record = users
            .get_mut(&id)
            .ok_or_else(|| DomainError::UserNotFound(id.to_string()))?;

        record.user.last_login = Some(at);
        record.user.updated_at = at;

        Ok(())
    }
}
