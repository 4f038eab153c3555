use async_trait::async_trait;
use aurora_core::{Article, ArticleStore, Error, Facets, InsertOutcome, QueryFilter, Result};
use chrono::{DateTime, TimeZone, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::StorageBackend;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS news_articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT,
        summary TEXT,
        url TEXT NOT NULL UNIQUE,
        source TEXT NOT NULL,
        category TEXT,
        country TEXT,
        language TEXT,
        published_at INTEGER,
        fetched_at INTEGER NOT NULL,
        image_url TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_news_articles_fetched_at ON news_articles (fetched_at)",
    "CREATE INDEX IF NOT EXISTS idx_news_articles_published_at ON news_articles (published_at)",
    // Add future migrations here
];

const ORDER_NEWEST_FIRST: &str = " ORDER BY published_at DESC, fetched_at DESC, id DESC";

fn persistence(context: &'static str) -> impl FnOnce(sqlx::Error) -> Error {
    move |e| Error::Persistence(format!("{}: {}", context, e))
}

fn to_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| Error::Persistence(format!("Invalid stored timestamp: {}", ms)))
}

fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn push_filters<'a>(builder: &mut QueryBuilder<'a, Sqlite>, filter: &'a QueryFilter) {
    builder.push(" WHERE 1 = 1");
    if let Some(country) = &filter.country {
        builder.push(" AND lower(country) = ").push_bind(country.as_str());
    }
    if let Some(language) = &filter.language {
        builder.push(" AND lower(language) = ").push_bind(language.as_str());
    }
    if let Some(category) = &filter.category {
        builder.push(" AND lower(category) = ").push_bind(category.as_str());
    }
    if let Some(keyword) = &filter.keyword {
        let pattern = like_pattern(keyword);
        builder
            .push(" AND (lower(title) LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR lower(description) LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

fn row_to_article(row: &SqliteRow) -> Result<Article> {
    let get_err = persistence("Failed to read article row");
    let read = || -> std::result::Result<_, sqlx::Error> {
        Ok((
            row.try_get::<i64, _>("id")?,
            row.try_get::<String, _>("title")?,
            row.try_get::<Option<String>, _>("description")?,
            row.try_get::<Option<String>, _>("summary")?,
            row.try_get::<String, _>("url")?,
            row.try_get::<String, _>("source")?,
            row.try_get::<Option<String>, _>("category")?,
            row.try_get::<Option<String>, _>("country")?,
            row.try_get::<Option<String>, _>("language")?,
            row.try_get::<Option<i64>, _>("published_at")?,
            row.try_get::<i64, _>("fetched_at")?,
            row.try_get::<Option<String>, _>("image_url")?,
        ))
    };
    let (id, title, description, summary, url, source, category, country, language, published_at, fetched_at, image_url) =
        read().map_err(get_err)?;

    Ok(Article {
        id: Some(id),
        title,
        description,
        summary,
        url,
        source,
        category,
        country,
        language,
        published_at: published_at.map(from_millis).transpose()?,
        fetched_at: from_millis(fetched_at)?,
        image_url,
    })
}

pub struct SQLiteStorage {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
}

#[async_trait]
impl StorageBackend for SQLiteStorage {
    fn get_error_message() -> &'static str {
        "SQLite database file and its directory should be writable"
    }

    async fn new() -> Result<Self> {
        let db_path = PathBuf::from("aurora.db");
        Self::new_with_path(&db_path).await
    }
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(persistence("Failed to connect to database"))?;

        // Run migrations
        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Persistence(format!("Failed to run migration {}: {}", i, e)))?;
        }
        debug!("SQLite migrations applied to {}", db_path.display());

        Ok(Self {
            pool: Arc::new(pool),
            db_path: db_path.clone(),
        })
    }

    pub fn get_db_path(&self) -> &PathBuf {
        &self.db_path
    }

    async fn distinct(&self, column: &str) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT {col} FROM news_articles WHERE {col} IS NOT NULL ORDER BY {col}",
            col = column
        );
        sqlx::query_scalar::<_, String>(&sql)
            .fetch_all(&*self.pool)
            .await
            .map_err(persistence("Failed to load facets"))
    }
}

#[async_trait]
impl ArticleStore for SQLiteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<Article>> {
        let row = sqlx::query("SELECT * FROM news_articles WHERE url = ?")
            .bind(url)
            .fetch_optional(&*self.pool)
            .await
            .map_err(persistence("Failed to look up article"))?;

        row.as_ref().map(row_to_article).transpose()
    }

    async fn insert(&self, article: &Article) -> Result<InsertOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO news_articles
            (title, description, summary, url, source, category, country, language, published_at, fetched_at, image_url)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(url) DO NOTHING
            "#,
        )
        .bind(&article.title)
        .bind(article.description.as_deref())
        .bind(article.summary.as_deref())
        .bind(&article.url)
        .bind(&article.source)
        .bind(article.category.as_deref())
        .bind(article.country.as_deref())
        .bind(article.language.as_deref())
        .bind(article.published_at.map(to_millis))
        .bind(to_millis(article.fetched_at))
        .bind(article.image_url.as_deref())
        .execute(&*self.pool)
        .await
        .map_err(persistence("Failed to store article"))?;

        if result.rows_affected() == 0 {
            Ok(InsertOutcome::Duplicate)
        } else {
            Ok(InsertOutcome::Inserted(result.last_insert_rowid()))
        }
    }

    async fn find_page(&self, filter: &QueryFilter) -> Result<(Vec<Article>, u64)> {
        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM news_articles");
        push_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&*self.pool)
            .await
            .map_err(persistence("Failed to count articles"))?;

        let mut page_query = QueryBuilder::<Sqlite>::new("SELECT * FROM news_articles");
        push_filters(&mut page_query, filter);
        page_query
            .push(ORDER_NEWEST_FIRST)
            .push(" LIMIT ")
            .push_bind(filter.size as i64)
            .push(" OFFSET ")
            .push_bind(filter.offset() as i64);

        let rows = page_query
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(persistence("Failed to query articles"))?;

        let articles = rows.iter().map(row_to_article).collect::<Result<Vec<_>>>()?;
        Ok((articles, total.max(0) as u64))
    }

    async fn fetched_since(&self, since: DateTime<Utc>) -> Result<Vec<Article>> {
        let sql = format!("SELECT * FROM news_articles WHERE fetched_at >= ?{}", ORDER_NEWEST_FIRST);
        let rows = sqlx::query(&sql)
            .bind(to_millis(since))
            .fetch_all(&*self.pool)
            .await
            .map_err(persistence("Failed to load recent articles"))?;

        rows.iter().map(row_to_article).collect()
    }

    async fn facets(&self) -> Result<Facets> {
        Ok(Facets {
            countries: self.distinct("country").await?,
            languages: self.distinct("language").await?,
            categories: self.distinct("category").await?,
            sources: self.distinct("source").await?,
        })
    }

    async fn delete_fetched_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(persistence("Failed to begin cleanup transaction"))?;

        let result = sqlx::query("DELETE FROM news_articles WHERE fetched_at < ?")
            .bind(to_millis(cutoff))
            .execute(&mut *tx)
            .await
            .map_err(persistence("Failed to delete old articles"))?;

        tx.commit()
            .await
            .map_err(persistence("Failed to commit cleanup transaction"))?;

        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM news_articles")
            .fetch_one(&*self.pool)
            .await
            .map_err(persistence("Failed to count articles"))?;
        Ok(count.max(0) as u64)
    }
}
