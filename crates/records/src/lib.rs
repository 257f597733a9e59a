use std::cmp::Ordering;
use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::RwLock;
use sqlx::{Row, SqlitePool};
use task_core::{EventRow, JobRow, ResourceRow, TrainingRow};
use thiserror::Error;

/// A failing store is a distinguishable condition, never conflated with
/// "zero rows". The router decides whether to fall through or fail hard.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// External keyed-record store: case-insensitive contains over a fixed
/// field set per record kind, ordered, limited. Empty `terms` means no
/// filter. The core is agnostic to the backing storage technology.
pub trait RecordStore: Send + Sync {
    async fn search_trainings(&self, terms: &[String], limit: usize) -> StoreResult<Vec<TrainingRow>>;
    async fn search_jobs(&self, terms: &[String], limit: usize) -> StoreResult<Vec<JobRow>>;
    async fn search_resources(&self, terms: &[String], limit: usize) -> StoreResult<Vec<ResourceRow>>;

    /// Events dated `today` or later plus undated rows, soonest first.
    async fn list_upcoming_events(&self, today: NaiveDate, limit: usize) -> StoreResult<Vec<EventRow>>;

    async fn upsert_trainings(&self, rows: Vec<TrainingRow>) -> StoreResult<u64>;
    async fn upsert_jobs(&self, rows: Vec<JobRow>) -> StoreResult<u64>;
    async fn upsert_resources(&self, rows: Vec<ResourceRow>) -> StoreResult<u64>;
    async fn upsert_events(&self, rows: Vec<EventRow>) -> StoreResult<u64>;
}

fn contains_match(fields: &[&str], terms: &[String]) -> bool {
    if terms.is_empty() {
        return true;
    }

    terms.iter().any(|term| {
        let needle = term.to_lowercase();
        fields
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    })
}

/// Trainings order soonest start first; missing dates sort last.
fn training_order(a: &TrainingRow, b: &TrainingRow) -> Ordering {
    match (a.next_start_date, b.next_start_date) {
        (Some(lhs), Some(rhs)) => lhs.cmp(&rhs),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn event_order(a: &EventRow, b: &EventRow) -> Ordering {
    match (a.date, b.date) {
        (Some(lhs), Some(rhs)) => lhs.cmp(&rhs),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn job_order(a: &JobRow, b: &JobRow) -> Ordering {
    match (a.posted_at, b.posted_at) {
        (Some(lhs), Some(rhs)) => rhs.cmp(&lhs),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    trainings: Arc<RwLock<Vec<TrainingRow>>>,
    jobs: Arc<RwLock<Vec<JobRow>>>,
    resources: Arc<RwLock<Vec<ResourceRow>>>,
    events: Arc<RwLock<Vec<EventRow>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    async fn search_trainings(&self, terms: &[String], limit: usize) -> StoreResult<Vec<TrainingRow>> {
        let mut rows: Vec<TrainingRow> = self
            .trainings
            .read()
            .iter()
            .filter(|row| {
                contains_match(
                    &[&row.name, &row.description, row.schedule.as_deref().unwrap_or("")],
                    terms,
                )
            })
            .cloned()
            .collect();
        rows.sort_by(training_order);
        rows.truncate(limit);
        Ok(rows)
    }

    async fn search_jobs(&self, terms: &[String], limit: usize) -> StoreResult<Vec<JobRow>> {
        let mut rows: Vec<JobRow> = self
            .jobs
            .read()
            .iter()
            .filter(|row| {
                contains_match(
                    &[&row.title, &row.company, &row.location, &row.description],
                    terms,
                )
            })
            .cloned()
            .collect();
        rows.sort_by(job_order);
        rows.truncate(limit);
        Ok(rows)
    }

    async fn search_resources(&self, terms: &[String], limit: usize) -> StoreResult<Vec<ResourceRow>> {
        let mut rows: Vec<ResourceRow> = self
            .resources
            .read()
            .iter()
            .filter(|row| contains_match(&[&row.name, &row.description, &row.category], terms))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn list_upcoming_events(&self, today: NaiveDate, limit: usize) -> StoreResult<Vec<EventRow>> {
        let mut rows: Vec<EventRow> = self
            .events
            .read()
            .iter()
            .filter(|row| row.date.map_or(true, |date| date >= today))
            .cloned()
            .collect();
        rows.sort_by(event_order);
        rows.truncate(limit);
        Ok(rows)
    }

    async fn upsert_trainings(&self, rows: Vec<TrainingRow>) -> StoreResult<u64> {
        let mut guard = self.trainings.write();
        let count = rows.len() as u64;
        for row in rows {
            match guard.iter_mut().find(|existing| existing.name == row.name) {
                Some(existing) => *existing = row,
                None => guard.push(row),
            }
        }
        Ok(count)
    }

    async fn upsert_jobs(&self, rows: Vec<JobRow>) -> StoreResult<u64> {
        let mut guard = self.jobs.write();
        let count = rows.len() as u64;
        for row in rows {
            match guard
                .iter_mut()
                .find(|existing| existing.title == row.title && existing.company == row.company)
            {
                Some(existing) => *existing = row,
                None => guard.push(row),
            }
        }
        Ok(count)
    }

    async fn upsert_resources(&self, rows: Vec<ResourceRow>) -> StoreResult<u64> {
        let mut guard = self.resources.write();
        let count = rows.len() as u64;
        for row in rows {
            match guard.iter_mut().find(|existing| existing.name == row.name) {
                Some(existing) => *existing = row,
                None => guard.push(row),
            }
        }
        Ok(count)
    }

    async fn upsert_events(&self, rows: Vec<EventRow>) -> StoreResult<u64> {
        let mut guard = self.events.write();
        let count = rows.len() as u64;
        for row in rows {
            match guard.iter_mut().find(|existing| existing.name == row.name) {
                Some(existing) => *existing = row,
                None => guard.push(row),
            }
        }
        Ok(count)
    }
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = SqlitePool::connect(database_url).await?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trainings (
              name TEXT PRIMARY KEY,
              description TEXT NOT NULL DEFAULT '',
              schedule TEXT,
              next_start_date TEXT,
              signup_link TEXT,
              contact_info TEXT,
              is_active INTEGER NOT NULL DEFAULT 1
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS jobs (
              title TEXT NOT NULL,
              company TEXT NOT NULL,
              location TEXT NOT NULL DEFAULT '',
              description TEXT NOT NULL DEFAULT '',
              apply_link TEXT,
              posted_at TEXT,
              is_active INTEGER NOT NULL DEFAULT 1,
              PRIMARY KEY (title, company)
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS resources (
              name TEXT PRIMARY KEY,
              category TEXT NOT NULL DEFAULT '',
              description TEXT NOT NULL DEFAULT '',
              website TEXT,
              phone_number TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS events (
              name TEXT PRIMARY KEY,
              description TEXT NOT NULL DEFAULT '',
              date TEXT,
              time TEXT,
              location TEXT,
              signup_link TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Builds `(lower(f1) LIKE ? OR ...)` groups, one per term, OR-combined.
/// Returns the clause (without a leading keyword) and the bind patterns.
fn contains_clause(fields: &[&str], terms: &[String]) -> (String, Vec<String>) {
    if terms.is_empty() {
        return (String::new(), Vec::new());
    }

    let group = format!(
        "({})",
        fields
            .iter()
            .map(|field| format!("lower({field}) LIKE ?"))
            .collect::<Vec<_>>()
            .join(" OR ")
    );

    let clause = vec![group; terms.len()].join(" OR ");
    let mut binds = Vec::new();
    for term in terms {
        let pattern = format!("%{}%", term.to_lowercase());
        for _ in 0..fields.len() {
            binds.push(pattern.clone());
        }
    }

    (format!("({clause})"), binds)
}

impl RecordStore for SqliteStore {
    async fn search_trainings(&self, terms: &[String], limit: usize) -> StoreResult<Vec<TrainingRow>> {
        let (clause, binds) = contains_clause(&["name", "description", "schedule"], terms);
        let mut sql = String::from(
            "SELECT name, description, schedule, next_start_date, signup_link, contact_info \
             FROM trainings WHERE is_active = 1",
        );
        if !clause.is_empty() {
            sql.push_str(" AND ");
            sql.push_str(&clause);
        }
        sql.push_str(" ORDER BY next_start_date IS NULL, next_start_date ASC LIMIT ?");

        let mut query = sqlx::query(&sql);
        for bind in binds {
            query = query.bind(bind);
        }
        let rows = query.bind(limit as i64).fetch_all(&self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|row| TrainingRow {
                name: row.get("name"),
                description: row.get("description"),
                schedule: row.get("schedule"),
                next_start_date: row
                    .get::<Option<String>, _>("next_start_date")
                    .and_then(|value| NaiveDate::parse_from_str(&value, "%Y-%m-%d").ok()),
                signup_link: row.get("signup_link"),
                contact_info: row.get("contact_info"),
            })
            .collect())
    }

    async fn search_jobs(&self, terms: &[String], limit: usize) -> StoreResult<Vec<JobRow>> {
        let (clause, binds) = contains_clause(&["title", "company", "location", "description"], terms);
        let mut sql = String::from(
            "SELECT title, company, location, description, apply_link, posted_at \
             FROM jobs WHERE is_active = 1",
        );
        if !clause.is_empty() {
            sql.push_str(" AND ");
            sql.push_str(&clause);
        }
        sql.push_str(" ORDER BY posted_at IS NULL, posted_at DESC LIMIT ?");

        let mut query = sqlx::query(&sql);
        for bind in binds {
            query = query.bind(bind);
        }
        let rows = query.bind(limit as i64).fetch_all(&self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|row| JobRow {
                title: row.get("title"),
                company: row.get("company"),
                location: row.get("location"),
                description: row.get("description"),
                apply_link: row.get("apply_link"),
                posted_at: row
                    .get::<Option<String>, _>("posted_at")
                    .and_then(|value| value.parse().ok()),
            })
            .collect())
    }

    async fn search_resources(&self, terms: &[String], limit: usize) -> StoreResult<Vec<ResourceRow>> {
        let (clause, binds) = contains_clause(&["name", "description", "category"], terms);
        let mut sql = String::from(
            "SELECT name, category, description, website, phone_number FROM resources",
        );
        if !clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }
        sql.push_str(" ORDER BY lower(name) ASC LIMIT ?");

        let mut query = sqlx::query(&sql);
        for bind in binds {
            query = query.bind(bind);
        }
        let rows = query.bind(limit as i64).fetch_all(&self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|row| ResourceRow {
                name: row.get("name"),
                category: row.get("category"),
                description: row.get("description"),
                website: row.get("website"),
                phone_number: row.get("phone_number"),
            })
            .collect())
    }

    async fn list_upcoming_events(&self, today: NaiveDate, limit: usize) -> StoreResult<Vec<EventRow>> {
        let rows = sqlx::query(
            "SELECT name, description, date, time, location, signup_link FROM events \
             WHERE date IS NULL OR date >= ? \
             ORDER BY date IS NULL, date ASC LIMIT ?",
        )
        .bind(today.format("%Y-%m-%d").to_string())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| EventRow {
                name: row.get("name"),
                description: row.get("description"),
                date: row
                    .get::<Option<String>, _>("date")
                    .and_then(|value| NaiveDate::parse_from_str(&value, "%Y-%m-%d").ok()),
                time: row.get("time"),
                location: row.get("location"),
                signup_link: row.get("signup_link"),
            })
            .collect())
    }

    async fn upsert_trainings(&self, rows: Vec<TrainingRow>) -> StoreResult<u64> {
        let mut saved = 0u64;
        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO trainings (name, description, schedule, next_start_date, signup_link, contact_info)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(name) DO UPDATE SET
                  description=excluded.description,
                  schedule=excluded.schedule,
                  next_start_date=excluded.next_start_date,
                  signup_link=excluded.signup_link,
                  contact_info=excluded.contact_info
                "#,
            )
            .bind(&row.name)
            .bind(&row.description)
            .bind(&row.schedule)
            .bind(row.next_start_date.map(|date| date.format("%Y-%m-%d").to_string()))
            .bind(&row.signup_link)
            .bind(&row.contact_info)
            .execute(&self.pool)
            .await?;
            saved += 1;
        }
        Ok(saved)
    }

    async fn upsert_jobs(&self, rows: Vec<JobRow>) -> StoreResult<u64> {
        let mut saved = 0u64;
        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO jobs (title, company, location, description, apply_link, posted_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(title, company) DO UPDATE SET
                  location=excluded.location,
                  description=excluded.description,
                  apply_link=excluded.apply_link,
                  posted_at=excluded.posted_at
                "#,
            )
            .bind(&row.title)
            .bind(&row.company)
            .bind(&row.location)
            .bind(&row.description)
            .bind(&row.apply_link)
            .bind(row.posted_at.map(|at| at.to_rfc3339()))
            .execute(&self.pool)
            .await?;
            saved += 1;
        }
        Ok(saved)
    }

    async fn upsert_resources(&self, rows: Vec<ResourceRow>) -> StoreResult<u64> {
        let mut saved = 0u64;
        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO resources (name, category, description, website, phone_number)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(name) DO UPDATE SET
                  category=excluded.category,
                  description=excluded.description,
                  website=excluded.website,
                  phone_number=excluded.phone_number
                "#,
            )
            .bind(&row.name)
            .bind(&row.category)
            .bind(&row.description)
            .bind(&row.website)
            .bind(&row.phone_number)
            .execute(&self.pool)
            .await?;
            saved += 1;
        }
        Ok(saved)
    }

    async fn upsert_events(&self, rows: Vec<EventRow>) -> StoreResult<u64> {
        let mut saved = 0u64;
        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO events (name, description, date, time, location, signup_link)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(name) DO UPDATE SET
                  description=excluded.description,
                  date=excluded.date,
                  time=excluded.time,
                  location=excluded.location,
                  signup_link=excluded.signup_link
                "#,
            )
            .bind(&row.name)
            .bind(&row.description)
            .bind(row.date.map(|date| date.format("%Y-%m-%d").to_string()))
            .bind(&row.time)
            .bind(&row.location)
            .bind(&row.signup_link)
            .execute(&self.pool)
            .await?;
            saved += 1;
        }
        Ok(saved)
    }
}

#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    Sqlite(SqliteStore),
}

impl Store {
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    pub async fn sqlite(database_url: &str) -> StoreResult<Self> {
        Ok(Self::Sqlite(SqliteStore::connect(database_url).await?))
    }
}

impl RecordStore for Store {
    async fn search_trainings(&self, terms: &[String], limit: usize) -> StoreResult<Vec<TrainingRow>> {
        match self {
            Store::Memory(store) => store.search_trainings(terms, limit).await,
            Store::Sqlite(store) => store.search_trainings(terms, limit).await,
        }
    }

    async fn search_jobs(&self, terms: &[String], limit: usize) -> StoreResult<Vec<JobRow>> {
        match self {
            Store::Memory(store) => store.search_jobs(terms, limit).await,
            Store::Sqlite(store) => store.search_jobs(terms, limit).await,
        }
    }

    async fn search_resources(&self, terms: &[String], limit: usize) -> StoreResult<Vec<ResourceRow>> {
        match self {
            Store::Memory(store) => store.search_resources(terms, limit).await,
            Store::Sqlite(store) => store.search_resources(terms, limit).await,
        }
    }

    async fn list_upcoming_events(&self, today: NaiveDate, limit: usize) -> StoreResult<Vec<EventRow>> {
        match self {
            Store::Memory(store) => store.list_upcoming_events(today, limit).await,
            Store::Sqlite(store) => store.list_upcoming_events(today, limit).await,
        }
    }

    async fn upsert_trainings(&self, rows: Vec<TrainingRow>) -> StoreResult<u64> {
        match self {
            Store::Memory(store) => store.upsert_trainings(rows).await,
            Store::Sqlite(store) => store.upsert_trainings(rows).await,
        }
    }

    async fn upsert_jobs(&self, rows: Vec<JobRow>) -> StoreResult<u64> {
        match self {
            Store::Memory(store) => store.upsert_jobs(rows).await,
            Store::Sqlite(store) => store.upsert_jobs(rows).await,
        }
    }

    async fn upsert_resources(&self, rows: Vec<ResourceRow>) -> StoreResult<u64> {
        match self {
            Store::Memory(store) => store.upsert_resources(rows).await,
            Store::Sqlite(store) => store.upsert_resources(rows).await,
        }
    }

    async fn upsert_events(&self, rows: Vec<EventRow>) -> StoreResult<u64> {
        match self {
            Store::Memory(store) => store.upsert_events(rows).await,
            Store::Sqlite(store) => store.upsert_events(rows).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn training(name: &str, date: Option<(i32, u32, u32)>) -> TrainingRow {
        TrainingRow {
            name: name.to_string(),
            description: "test".to_string(),
            schedule: None,
            next_start_date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            signup_link: None,
            contact_info: None,
        }
    }

    #[tokio::test]
    async fn trainings_order_soonest_first_nulls_last() {
        let store = MemoryStore::new();
        store
            .upsert_trainings(vec![
                training("later", Some((2025, 12, 1))),
                training("tbd", None),
                training("sooner", Some((2025, 10, 1))),
            ])
            .await
            .unwrap();

        let rows = store.search_trainings(&[], 10).await.unwrap();
        let names: Vec<&str> = rows.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, ["sooner", "later", "tbd"]);
    }

    #[tokio::test]
    async fn jobs_order_newest_first() {
        let store = MemoryStore::new();
        store
            .upsert_jobs(vec![
                JobRow {
                    title: "old".to_string(),
                    company: "a".to_string(),
                    location: "trenton".to_string(),
                    description: String::new(),
                    apply_link: None,
                    posted_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single(),
                },
                JobRow {
                    title: "new".to_string(),
                    company: "b".to_string(),
                    location: "trenton".to_string(),
                    description: String::new(),
                    apply_link: None,
                    posted_at: Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).single(),
                },
            ])
            .await
            .unwrap();

        let rows = store.search_jobs(&[], 10).await.unwrap();
        assert_eq!(rows[0].title, "new");
    }

    #[tokio::test]
    async fn terms_combine_with_or_case_insensitive() {
        let store = MemoryStore::new();
        store
            .upsert_trainings(vec![
                training("Forklift Refresher", None),
                training("Welding Basics", None),
            ])
            .await
            .unwrap();

        let rows = store
            .search_trainings(&["FORKLIFT".to_string(), "welding".to_string()], 10)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);

        let rows = store
            .search_trainings(&["forklift".to_string()], 10)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Forklift Refresher");
    }

    #[tokio::test]
    async fn sqlite_round_trip_and_filtering() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        store
            .upsert_trainings(vec![
                training("Forklift Refresher", Some((2025, 11, 1))),
                training("Welding Basics", None),
            ])
            .await
            .unwrap();

        let rows = store
            .search_trainings(&["forklift".to_string()], 10)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].next_start_date,
            NaiveDate::from_ymd_opt(2025, 11, 1)
        );

        let all = store.search_trainings(&[], 10).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Forklift Refresher");
    }

    #[tokio::test]
    async fn events_listing_drops_past_dates_and_keeps_undated() {
        fn event(name: &str, date: Option<(i32, u32, u32)>) -> EventRow {
            EventRow {
                name: name.to_string(),
                description: String::new(),
                date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
                time: None,
                location: None,
                signup_link: None,
            }
        }

        let store = MemoryStore::new();
        store
            .upsert_events(vec![
                event("past session", Some((2025, 5, 1))),
                event("later session", Some((2025, 7, 1))),
                event("next session", Some((2025, 6, 15))),
                event("standing notice", None),
            ])
            .await
            .unwrap();

        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let rows = store.list_upcoming_events(today, 10).await.unwrap();
        let names: Vec<&str> = rows.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, ["next session", "later session", "standing notice"]);
    }

    #[tokio::test]
    async fn sqlite_events_round_trip_upcoming_filter() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        store
            .upsert_events(vec![
                EventRow {
                    name: "Resume Workshop".to_string(),
                    description: "Bring a draft.".to_string(),
                    date: NaiveDate::from_ymd_opt(2025, 7, 1),
                    time: Some("10:00 AM".to_string()),
                    location: None,
                    signup_link: None,
                },
                EventRow {
                    name: "Old Orientation".to_string(),
                    description: String::new(),
                    date: NaiveDate::from_ymd_opt(2024, 1, 1),
                    time: None,
                    location: None,
                    signup_link: None,
                },
            ])
            .await
            .unwrap();

        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let rows = store.list_upcoming_events(today, 10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Resume Workshop");
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2025, 7, 1));
    }

    #[tokio::test]
    async fn resources_order_alphabetical() {
        let store = MemoryStore::new();
        store
            .upsert_resources(vec![
                ResourceRow {
                    name: "Zebra Legal Aid".to_string(),
                    category: "legal".to_string(),
                    description: String::new(),
                    website: None,
                    phone_number: None,
                },
                ResourceRow {
                    name: "Arm In Arm".to_string(),
                    category: "food".to_string(),
                    description: String::new(),
                    website: None,
                    phone_number: None,
                },
            ])
            .await
            .unwrap();

        let rows = store.search_resources(&[], 10).await.unwrap();
        assert_eq!(rows[0].name, "Arm In Arm");
    }
}
