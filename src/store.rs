//! Local record store.
//!
//! A single SQLite table keyed by profile uid. Writes are upserts: a
//! re-harvested uid replaces the previous row in full, so re-running the
//! same range leaves one row per uid. Every upsert commits on its own, so
//! an interrupted run loses at most the record in flight.

use sqlx::{Row, SqlitePool};
use std::path::Path;

use crate::db;
use crate::error::HarvestError;
use crate::migrate;
use crate::models::PersonRecord;

/// Handle to the on-disk person store.
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    /// Open the store at `path`, creating the file and table if missing.
    pub async fn open(path: &Path) -> Result<Self, HarvestError> {
        let pool = db::connect(path).await?;
        migrate::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Insert `record`, or replace every column of the row with the same uid.
    pub async fn upsert(&self, record: &PersonRecord) -> Result<(), HarvestError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO persons (uid, name, local_address, permanent_address, national_id, phone)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(uid) DO UPDATE SET
                name = excluded.name,
                local_address = excluded.local_address,
                permanent_address = excluded.permanent_address,
                national_id = excluded.national_id,
                phone = excluded.phone
            "#,
        )
        .bind(record.uid)
        .bind(&record.name)
        .bind(&record.local_address)
        .bind(&record.permanent_address)
        .bind(&record.national_id)
        .bind(&record.phone)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn get(&self, uid: i64) -> Result<Option<PersonRecord>, HarvestError> {
        let row = sqlx::query(
            "SELECT uid, name, local_address, permanent_address, national_id, phone \
             FROM persons WHERE uid = ?",
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| row_to_record(&r)))
    }

    pub async fn count(&self) -> Result<i64, HarvestError> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM persons")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    /// Lowest and highest stored uid, or `None` for an empty store.
    pub async fn uid_span(&self) -> Result<Option<(i64, i64)>, HarvestError> {
        let row = sqlx::query("SELECT MIN(uid) AS lo, MAX(uid) AS hi FROM persons")
            .fetch_one(&self.pool)
            .await?;
        let lo: Option<i64> = row.get("lo");
        let hi: Option<i64> = row.get("hi");
        Ok(lo.zip(hi))
    }

    pub async fn count_with_phone(&self) -> Result<i64, HarvestError> {
        let n: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM persons WHERE phone IS NOT NULL AND phone != ''")
                .fetch_one(&self.pool)
                .await?;
        Ok(n)
    }

    /// Every stored record, ordered by uid.
    pub async fn all(&self) -> Result<Vec<PersonRecord>, HarvestError> {
        let rows = sqlx::query(
            "SELECT uid, name, local_address, permanent_address, national_id, phone \
             FROM persons ORDER BY uid ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_record).collect())
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> PersonRecord {
    PersonRecord {
        uid: row.get("uid"),
        name: row.get("name"),
        local_address: row
            .get::<Option<String>, _>("local_address")
            .unwrap_or_default(),
        permanent_address: row
            .get::<Option<String>, _>("permanent_address")
            .unwrap_or_default(),
        national_id: row
            .get::<Option<String>, _>("national_id")
            .unwrap_or_default(),
        phone: row.get::<Option<String>, _>("phone").unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(uid: i64, name: &str, phone: &str) -> PersonRecord {
        PersonRecord {
            uid,
            name: name.to_string(),
            local_address: "4 Hill Street".to_string(),
            permanent_address: "12 Lake Road".to_string(),
            national_id: "1234".to_string(),
            phone: phone.to_string(),
        }
    }

    #[tokio::test]
    async fn open_creates_file_and_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("person_data.db");

        let store = RecordStore::open(&path).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
        store.close().await;
        assert!(path.exists());
    }

    #[tokio::test]
    async fn open_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("person_data.db");

        let store = RecordStore::open(&path).await.unwrap();
        store.upsert(&record(1, "Asha Rao", "555")).await.unwrap();
        store.close().await;

        let store = RecordStore::open(&path).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
        store.close().await;
    }

    #[tokio::test]
    async fn upsert_twice_keeps_one_row() {
        let tmp = TempDir::new().unwrap();
        let store = RecordStore::open(&tmp.path().join("p.db")).await.unwrap();

        let r = record(1, "Asha Rao", "555");
        store.upsert(&r).await.unwrap();
        store.upsert(&r).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.get(1).await.unwrap(), Some(r));
        store.close().await;
    }

    #[tokio::test]
    async fn upsert_replaces_all_fields() {
        let tmp = TempDir::new().unwrap();
        let store = RecordStore::open(&tmp.path().join("p.db")).await.unwrap();

        store.upsert(&record(1, "Asha Rao", "555")).await.unwrap();
        let updated = PersonRecord {
            uid: 1,
            name: "Asha R.".to_string(),
            local_address: String::new(),
            permanent_address: String::new(),
            national_id: String::new(),
            phone: "777".to_string(),
        };
        store.upsert(&updated).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.get(1).await.unwrap(), Some(updated));
        store.close().await;
    }

    #[tokio::test]
    async fn get_missing_uid_is_none() {
        let tmp = TempDir::new().unwrap();
        let store = RecordStore::open(&tmp.path().join("p.db")).await.unwrap();
        assert_eq!(store.get(404).await.unwrap(), None);
        store.close().await;
    }

    #[tokio::test]
    async fn uid_span_and_phone_count() {
        let tmp = TempDir::new().unwrap();
        let store = RecordStore::open(&tmp.path().join("p.db")).await.unwrap();
        assert_eq!(store.uid_span().await.unwrap(), None);
        assert_eq!(store.count_with_phone().await.unwrap(), 0);

        store.upsert(&record(42, "Asha Rao", "555")).await.unwrap();
        store.upsert(&record(7, "Ravi Kumar", "")).await.unwrap();
        store.upsert(&record(19, "Meera Iyer", "777")).await.unwrap();

        assert_eq!(store.uid_span().await.unwrap(), Some((7, 42)));
        assert_eq!(store.count_with_phone().await.unwrap(), 2);
        store.close().await;
    }

    #[tokio::test]
    async fn all_is_ordered_by_uid() {
        let tmp = TempDir::new().unwrap();
        let store = RecordStore::open(&tmp.path().join("p.db")).await.unwrap();

        for uid in [30, 10, 20] {
            store
                .upsert(&record(uid, &format!("person {}", uid), "1"))
                .await
                .unwrap();
        }

        let uids: Vec<i64> = store.all().await.unwrap().iter().map(|r| r.uid).collect();
        assert_eq!(uids, vec![10, 20, 30]);
        store.close().await;
    }
}
