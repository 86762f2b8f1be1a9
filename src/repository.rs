use crate::error::RepositoryError;
use crate::models::{BlogPost, ContactInfo, Entity, Project, StoreStatus, TableStatus};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool, postgres::PgRow};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Schema applied by `PostgresRepository::ensure_schema`.
const SCHEMA: &str = include_str!("../schema.sql");

/// CrudRepository
///
/// The data-access contract for one entity type. Handlers only talk to this trait,
/// so the backing store (Postgres, in-memory) can be swapped without touching them.
///
/// **Send + Sync + async_trait** keep `Arc<dyn ...>` usable across Axum's task boundaries.
#[async_trait]
pub trait CrudRepository<T: Entity>: Send + Sync {
    /// Every stored record, ordered by id.
    async fn find_all(&self) -> Result<Vec<T>, RepositoryError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<T>, RepositoryError>;

    /// Insert-or-update. A record without an id is inserted and gets a fresh one from
    /// the store; a record with an id replaces the stored row with that id, failing
    /// with `RepositoryError::NotFound` if there is none.
    async fn save(&self, entity: T) -> Result<T, RepositoryError>;

    /// Returns whether a row was removed.
    async fn delete_by_id(&self, id: i64) -> Result<bool, RepositoryError>;

    async fn exists_by_id(&self, id: i64) -> Result<bool, RepositoryError>;

    async fn count(&self) -> Result<i64, RepositoryError>;
}

/// ProjectRepository
///
/// Projects add one filtered query on top of plain CRUD.
#[async_trait]
pub trait ProjectRepository: CrudRepository<Project> {
    /// Projects whose framework flag is set, evaluated by the store in one query.
    async fn find_framework_flagged(&self) -> Result<Vec<Project>, RepositoryError>;
}

/// StoreBackend
///
/// Which implementation serves the repositories. Reported by the database console.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Postgres => "postgres",
            StoreBackend::Memory => "memory",
        }
    }
}

/// Repositories
///
/// The persistence half of the application state: one repository per entity, all
/// backed by the same store. Cloning only bumps reference counts.
#[derive(Clone)]
pub struct Repositories {
    pub projects: Arc<dyn ProjectRepository>,
    pub blog_posts: Arc<dyn CrudRepository<BlogPost>>,
    pub contacts: Arc<dyn CrudRepository<ContactInfo>>,
    pub backend: StoreBackend,
}

impl Repositories {
    /// All three repositories share one connection pool.
    pub fn postgres(pool: PgPool) -> Self {
        let repo = Arc::new(PostgresRepository::new(pool));
        Self {
            projects: repo.clone(),
            blog_posts: repo.clone(),
            contacts: repo,
            backend: StoreBackend::Postgres,
        }
    }

    /// Fresh, empty in-memory tables. Used for local development without a database
    /// and throughout the test suite.
    pub fn in_memory() -> Self {
        Self {
            projects: Arc::new(MemoryRepository::<Project>::new()),
            blog_posts: Arc::new(MemoryRepository::<BlogPost>::new()),
            contacts: Arc::new(MemoryRepository::<ContactInfo>::new()),
            backend: StoreBackend::Memory,
        }
    }

    /// Row counts for every table, in a fixed order.
    pub async fn status(&self) -> Result<StoreStatus, RepositoryError> {
        let tables = vec![
            TableStatus {
                name: Project::TABLE.to_string(),
                rows: self.projects.count().await?,
            },
            TableStatus {
                name: BlogPost::TABLE.to_string(),
                rows: self.blog_posts.count().await?,
            },
            TableStatus {
                name: ContactInfo::TABLE.to_string(),
                rows: self.contacts.count().await?,
            },
        ];

        Ok(StoreStatus {
            backend: self.backend.as_str().to_string(),
            tables,
        })
    }
}

// --- Postgres ---

/// Column list and row mapping for an entity stored in Postgres.
trait PgTable: Entity + for<'r> FromRow<'r, PgRow> + Send + Unpin {
    const COLUMNS: &'static str;
}

impl PgTable for Project {
    const COLUMNS: &'static str = "id, title, description, repo_link, framework_flag";
}

impl PgTable for BlogPost {
    const COLUMNS: &'static str = "id, title, content";
}

impl PgTable for ContactInfo {
    const COLUMNS: &'static str = "id, email, phone, linkedin, github";
}

/// PostgresRepository
///
/// Implements every repository trait against PostgreSQL. Each call is a single
/// statement on a pooled connection, which the pool takes back on every exit path.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the tables if they are missing. Safe to run on every start.
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    async fn select_all<T: PgTable>(&self) -> Result<Vec<T>, RepositoryError> {
        let sql = format!("SELECT {} FROM {} ORDER BY id", T::COLUMNS, T::TABLE);
        Ok(sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?)
    }

    async fn select_one<T: PgTable>(&self, id: i64) -> Result<Option<T>, RepositoryError> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", T::COLUMNS, T::TABLE);
        Ok(sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_row<T: PgTable>(&self, id: i64) -> Result<bool, RepositoryError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", T::TABLE);
        let res = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(res.rows_affected() > 0)
    }

    async fn row_exists<T: PgTable>(&self, id: i64) -> Result<bool, RepositoryError> {
        let sql = format!("SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1)", T::TABLE);
        Ok(sqlx::query_scalar::<_, bool>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn count_rows<T: PgTable>(&self) -> Result<i64, RepositoryError> {
        let sql = format!("SELECT COUNT(*) FROM {}", T::TABLE);
        Ok(sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await?)
    }
}

#[async_trait]
impl CrudRepository<Project> for PostgresRepository {
    async fn find_all(&self) -> Result<Vec<Project>, RepositoryError> {
        self.select_all().await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Project>, RepositoryError> {
        self.select_one(id).await
    }

    async fn save(&self, project: Project) -> Result<Project, RepositoryError> {
        let Project {
            id,
            title,
            description,
            repo_link,
            framework_flag,
        } = project;

        match id {
            None => Ok(sqlx::query_as::<_, Project>(
                r#"INSERT INTO projects (title, description, repo_link, framework_flag)
                   VALUES ($1, $2, $3, $4)
                   RETURNING id, title, description, repo_link, framework_flag"#,
            )
            .bind(title)
            .bind(description)
            .bind(repo_link)
            .bind(framework_flag)
            .fetch_one(&self.pool)
            .await?),
            Some(id) => sqlx::query_as::<_, Project>(
                r#"UPDATE projects
                   SET title = $2, description = $3, repo_link = $4, framework_flag = $5
                   WHERE id = $1
                   RETURNING id, title, description, repo_link, framework_flag"#,
            )
            .bind(id)
            .bind(title)
            .bind(description)
            .bind(repo_link)
            .bind(framework_flag)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound {
                kind: Project::KIND,
                id,
            }),
        }
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, RepositoryError> {
        self.delete_row::<Project>(id).await
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, RepositoryError> {
        self.row_exists::<Project>(id).await
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        self.count_rows::<Project>().await
    }
}

#[async_trait]
impl ProjectRepository for PostgresRepository {
    async fn find_framework_flagged(&self) -> Result<Vec<Project>, RepositoryError> {
        Ok(sqlx::query_as::<_, Project>(
            r#"SELECT id, title, description, repo_link, framework_flag
               FROM projects
               WHERE framework_flag = true
               ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await?)
    }
}

#[async_trait]
impl CrudRepository<BlogPost> for PostgresRepository {
    async fn find_all(&self) -> Result<Vec<BlogPost>, RepositoryError> {
        self.select_all().await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<BlogPost>, RepositoryError> {
        self.select_one(id).await
    }

    async fn save(&self, post: BlogPost) -> Result<BlogPost, RepositoryError> {
        let BlogPost { id, title, content } = post;

        match id {
            None => Ok(sqlx::query_as::<_, BlogPost>(
                "INSERT INTO blog_posts (title, content) VALUES ($1, $2) RETURNING id, title, content",
            )
            .bind(title)
            .bind(content)
            .fetch_one(&self.pool)
            .await?),
            Some(id) => sqlx::query_as::<_, BlogPost>(
                "UPDATE blog_posts SET title = $2, content = $3 WHERE id = $1 RETURNING id, title, content",
            )
            .bind(id)
            .bind(title)
            .bind(content)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound {
                kind: BlogPost::KIND,
                id,
            }),
        }
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, RepositoryError> {
        self.delete_row::<BlogPost>(id).await
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, RepositoryError> {
        self.row_exists::<BlogPost>(id).await
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        self.count_rows::<BlogPost>().await
    }
}

#[async_trait]
impl CrudRepository<ContactInfo> for PostgresRepository {
    async fn find_all(&self) -> Result<Vec<ContactInfo>, RepositoryError> {
        self.select_all().await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ContactInfo>, RepositoryError> {
        self.select_one(id).await
    }

    async fn save(&self, contact: ContactInfo) -> Result<ContactInfo, RepositoryError> {
        let ContactInfo {
            id,
            email,
            phone,
            linkedin,
            github,
        } = contact;

        match id {
            None => Ok(sqlx::query_as::<_, ContactInfo>(
                r#"INSERT INTO contact_info (email, phone, linkedin, github)
                   VALUES ($1, $2, $3, $4)
                   RETURNING id, email, phone, linkedin, github"#,
            )
            .bind(email)
            .bind(phone)
            .bind(linkedin)
            .bind(github)
            .fetch_one(&self.pool)
            .await?),
            Some(id) => sqlx::query_as::<_, ContactInfo>(
                r#"UPDATE contact_info
                   SET email = $2, phone = $3, linkedin = $4, github = $5
                   WHERE id = $1
                   RETURNING id, email, phone, linkedin, github"#,
            )
            .bind(id)
            .bind(email)
            .bind(phone)
            .bind(linkedin)
            .bind(github)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound {
                kind: ContactInfo::KIND,
                id,
            }),
        }
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, RepositoryError> {
        self.delete_row::<ContactInfo>(id).await
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, RepositoryError> {
        self.row_exists::<ContactInfo>(id).await
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        self.count_rows::<ContactInfo>().await
    }
}

// --- In-memory ---

struct MemoryTable<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

/// MemoryRepository
///
/// Keeps one table in an ordered map behind a mutex. Ids start at 1 and are never
/// reused, mirroring an identity column.
pub struct MemoryRepository<T> {
    table: Mutex<MemoryTable<T>>,
}

impl<T> MemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(MemoryTable {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl<T> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> CrudRepository<T> for MemoryRepository<T> {
    async fn find_all(&self) -> Result<Vec<T>, RepositoryError> {
        Ok(self.table.lock().await.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<T>, RepositoryError> {
        Ok(self.table.lock().await.rows.get(&id).cloned())
    }

    async fn save(&self, mut entity: T) -> Result<T, RepositoryError> {
        let mut table = self.table.lock().await;

        let id = match entity.id() {
            Some(id) if table.rows.contains_key(&id) => id,
            Some(id) => return Err(RepositoryError::NotFound { kind: T::KIND, id }),
            None => {
                let id = table.next_id;
                table.next_id += 1;
                entity.set_id(Some(id));
                id
            }
        };

        table.rows.insert(id, entity.clone());
        Ok(entity)
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, RepositoryError> {
        Ok(self.table.lock().await.rows.remove(&id).is_some())
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, RepositoryError> {
        Ok(self.table.lock().await.rows.contains_key(&id))
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(self.table.lock().await.rows.len() as i64)
    }
}

#[async_trait]
impl ProjectRepository for MemoryRepository<Project> {
    async fn find_framework_flagged(&self) -> Result<Vec<Project>, RepositoryError> {
        Ok(self
            .table
            .lock()
            .await
            .rows
            .values()
            .filter(|p| p.framework_flag)
            .cloned()
            .collect())
    }
}
