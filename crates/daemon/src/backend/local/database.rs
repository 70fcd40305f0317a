//! SQLite table for content records.

use std::path::Path;
use std::str::FromStr;

use chrono::SecondsFormat;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

use common::content::{parse_timestamp, ContentFilter, ContentRecord, ContentType, NewContent};

use super::LocalStoreError;

const SELECT_COLUMNS: &str = r#"
    SELECT id, content_type, title, link, board, class_name, created_at,
           quiz_time, marks, is_storage_file, file_name, storage_path
    FROM content
"#;

#[derive(Debug, sqlx::FromRow)]
struct ContentRow {
    id: String,
    content_type: String,
    title: String,
    link: String,
    board: String,
    class_name: String,
    created_at: String,
    quiz_time: Option<String>,
    marks: Option<String>,
    is_storage_file: bool,
    file_name: Option<String>,
    storage_path: Option<String>,
}

impl TryFrom<ContentRow> for ContentRecord {
    type Error = LocalStoreError;

    fn try_from(row: ContentRow) -> Result<Self, Self::Error> {
        let content_type = ContentType::from_str(&row.content_type)
            .map_err(|e| LocalStoreError::CorruptRow(format!("{}: {}", row.id, e)))?;
        let timestamp = parse_timestamp(&row.created_at)
            .map_err(|e| LocalStoreError::CorruptRow(format!("{}: {}", row.id, e)))?;

        Ok(ContentRecord {
            id: row.id,
            content_type,
            title: row.title,
            link: row.link,
            board: row.board,
            class: row.class_name,
            timestamp,
            time: row.quiz_time,
            marks: row.marks,
            is_storage_file: row.is_storage_file,
            file_name: row.file_name,
            storage_path: row.storage_path,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn open(path: &Path) -> Result<Self, LocalStoreError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Single-connection in-memory database; a second connection would see
    /// an empty schema.
    pub async fn in_memory() -> Result<Self, LocalStoreError> {
        let options = SqliteConnectOptions::new().filename(":memory:");

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    async fn run_migrations(&self) -> Result<(), LocalStoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub async fn select(
        &self,
        filter: &ContentFilter,
    ) -> Result<Vec<ContentRecord>, LocalStoreError> {
        let mut query = QueryBuilder::<Sqlite>::new(SELECT_COLUMNS);
        query.push(" WHERE 1 = 1");
        if let Some(content_type) = filter.content_type {
            query
                .push(" AND content_type = ")
                .push_bind(content_type.as_str());
        }
        if let Some(board) = &filter.board {
            query.push(" AND board = ").push_bind(board.clone());
        }
        if let Some(class) = &filter.class {
            query.push(" AND class_name = ").push_bind(class.clone());
        }
        query.push(" ORDER BY created_at DESC, rowid DESC");

        let rows = query
            .build_query_as::<ContentRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ContentRecord::try_from).collect()
    }

    pub async fn find(&self, id: &str) -> Result<Option<ContentRecord>, LocalStoreError> {
        let row = sqlx::query_as::<_, ContentRow>(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ContentRecord::try_from).transpose()
    }

    pub async fn insert(&self, row: NewContent) -> Result<ContentRecord, LocalStoreError> {
        let id = Uuid::new_v4().to_string();
        let created_at = row.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);

        sqlx::query(
            r#"
            INSERT INTO content (
                id, content_type, title, link, board, class_name, created_at,
                quiz_time, marks, is_storage_file, file_name, storage_path
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(row.content_type.as_str())
        .bind(&row.title)
        .bind(&row.link)
        .bind(&row.board)
        .bind(&row.class)
        .bind(&created_at)
        .bind(&row.time)
        .bind(&row.marks)
        .bind(row.is_storage_file)
        .bind(&row.file_name)
        .bind(&row.storage_path)
        .execute(&self.pool)
        .await?;

        // Read back so the returned timestamp has the stored precision.
        self.find(&id)
            .await?
            .ok_or_else(|| LocalStoreError::CorruptRow(format!("{}: missing after insert", id)))
    }

    pub async fn delete(&self, id: &str) -> Result<u64, LocalStoreError> {
        let result = sqlx::query("DELETE FROM content WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn ping(&self) -> Result<(), LocalStoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn new_content(title: &str, board: &str, class: &str, minutes: i64) -> NewContent {
        NewContent {
            content_type: ContentType::Quiz,
            title: title.into(),
            link: format!("https://example.com/{}", title),
            board: board.into(),
            class: class.into(),
            timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
                + Duration::minutes(minutes),
            time: Some("45".into()),
            marks: Some("50".into()),
            is_storage_file: false,
            file_name: None,
            storage_path: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let db = Database::in_memory().await.unwrap();
        let created = db
            .insert(new_content("algebra", "CBSE", "Class 10", 0))
            .await
            .unwrap();

        assert!(Uuid::parse_str(&created.id).is_ok());
        assert_eq!(created.time.as_deref(), Some("45"));

        let found = db.find(&created.id).await.unwrap().unwrap();
        assert_eq!(found, created);
        assert!(db.find("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_select_scope_newest_first() {
        let db = Database::in_memory().await.unwrap();
        for (title, class, minutes) in [
            ("first", "Class 10", 0),
            ("third", "Class 10", 20),
            ("second", "Class 10", 10),
            ("other", "Class 9", 30),
        ] {
            db.insert(new_content(title, "CBSE", class, minutes))
                .await
                .unwrap();
        }

        let filter = ContentFilter::scope("CBSE", "Class 10")
            .with_type(ContentType::Quiz);
        let titles: Vec<_> = db
            .select(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["third", "second", "first"]);

        let notes = db
            .select(&ContentFilter::of_type(ContentType::Note))
            .await
            .unwrap();
        assert!(notes.is_empty());
    }

    #[tokio::test]
    async fn test_delete_reports_rows() {
        let db = Database::in_memory().await.unwrap();
        let created = db
            .insert(new_content("gone", "CBSE", "Class 10", 0))
            .await
            .unwrap();
        assert_eq!(db.delete(&created.id).await.unwrap(), 1);
        assert_eq!(db.delete(&created.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_file_backed_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("content.sqlite");
        let db = Database::open(&path).await.unwrap();
        db.ping().await.unwrap();
        assert!(path.exists());
    }
}
