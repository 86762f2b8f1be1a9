use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

/// Entity
///
/// Common surface of every persisted record type. The repository layer and the
/// generic handler helpers only need to read and overwrite the identifier, and to
/// name the record kind in error messages.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Human readable kind, used in "not found" messages (e.g. "Project").
    const KIND: &'static str;
    /// Table backing this entity in the relational store.
    const TABLE: &'static str;

    fn id(&self) -> Option<i64>;
    fn set_id(&mut self, id: Option<i64>);
}

// --- Core Application Schemas (Mapped to Database) ---

/// Project
///
/// A portfolio project from the `projects` table.
///
/// `id` is `None` only before the record has been persisted; the store assigns it on
/// insert and it never changes afterwards. Every body field defaults when missing so a
/// client may post a partial document; the record is still stored as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct Project {
    #[schema(example = 1)]
    pub id: Option<i64>,
    #[schema(example = "Portfolio API")]
    pub title: String,
    pub description: Option<String>,

    /// Link to the source code repository. Older clients send it as `githubLink`.
    #[serde(alias = "githubLink")]
    #[schema(example = "https://github.com/example/portfolio-api")]
    pub repo_link: Option<String>,

    /// Whether the project is built with Spring Boot. Older clients send `springBoot`.
    #[serde(alias = "springBoot")]
    pub framework_flag: bool,
}

impl Entity for Project {
    const KIND: &'static str = "Project";
    const TABLE: &'static str = "projects";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }
}

/// BlogPost
///
/// A blog entry from the `blog_posts` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct BlogPost {
    pub id: Option<i64>,
    pub title: String,
    pub content: String,
}

impl Entity for BlogPost {
    const KIND: &'static str = "BlogPost";
    const TABLE: &'static str = "blog_posts";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }
}

/// ContactInfo
///
/// One set of contact channels from the `contact_info` table. Every channel is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct ContactInfo {
    pub id: Option<i64>,
    #[schema(example = "someone@example.com")]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
}

impl Entity for ContactInfo {
    const KIND: &'static str = "ContactInfo";
    const TABLE: &'static str = "contact_info";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }
}

// --- Output Schemas ---

/// TableStatus
///
/// Row count of a single table, as reported by the database console.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct TableStatus {
    pub name: String,
    pub rows: i64,
}

/// StoreStatus
///
/// Output schema of `GET /db-console`: which backend serves the repositories and how
/// many rows each table holds.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct StoreStatus {
    #[schema(example = "postgres")]
    pub backend: String,
    pub tables: Vec<TableStatus>,
}
