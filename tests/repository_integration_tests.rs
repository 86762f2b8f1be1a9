use portfolio_api::{
    error::RepositoryError,
    models::{BlogPost, ContactInfo, Project},
    repository::{CrudRepository, PostgresRepository, ProjectRepository, Repositories},
};
use sqlx::PgPool;
use tokio::test;

// These tests need a disposable Postgres database:
//   DATABASE_URL=postgres://... cargo test -- --ignored
// Each test truncates the tables it touches.

// --- Test Context and Setup ---

struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    async fn setup() -> Self {
        dotenv::dotenv().ok();

        let db_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set to run integration tests");

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        PostgresRepository::new(pool.clone())
            .ensure_schema()
            .await
            .expect("Failed to apply the schema.");

        sqlx::raw_sql(
            "TRUNCATE projects, blog_posts, contact_info RESTART IDENTITY",
        )
        .execute(&pool)
        .await
        .expect("Failed to reset tables.");

        DbTestContext { pool }
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }
}

fn project(title: &str, flag: bool) -> Project {
    Project {
        title: title.to_string(),
        framework_flag: flag,
        ..Default::default()
    }
}

// --- Tests ---

#[test]
#[ignore = "needs DATABASE_URL"]
async fn test_schema_is_idempotent() {
    let ctx = DbTestContext::setup().await;
    ctx.repository().ensure_schema().await.unwrap();
    ctx.repository().ensure_schema().await.unwrap();
}

#[test]
#[ignore = "needs DATABASE_URL"]
async fn test_project_crud_round_trip() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let saved = CrudRepository::<Project>::save(
        &repo,
        Project {
            description: Some("desc".into()),
            repo_link: Some("https://github.com/example/x".into()),
            ..project("X", true)
        },
    )
    .await
    .unwrap();
    let id = saved.id.expect("identity column assigns an id");

    let found = CrudRepository::<Project>::find_by_id(&repo, id).await.unwrap();
    assert_eq!(found, Some(saved.clone()));
    assert!(CrudRepository::<Project>::exists_by_id(&repo, id).await.unwrap());

    let updated = CrudRepository::<Project>::save(
        &repo,
        Project {
            id: Some(id),
            ..project("Y", false)
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.title, "Y");
    assert_eq!(updated.description, None);

    assert!(CrudRepository::<Project>::delete_by_id(&repo, id).await.unwrap());
    assert!(!CrudRepository::<Project>::delete_by_id(&repo, id).await.unwrap());
    assert_eq!(CrudRepository::<Project>::count(&repo).await.unwrap(), 0);
}

#[test]
#[ignore = "needs DATABASE_URL"]
async fn test_update_of_missing_row_is_not_found() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let result = CrudRepository::<BlogPost>::save(
        &repo,
        BlogPost {
            id: Some(12345),
            title: "ghost".into(),
            content: String::new(),
        },
    )
    .await;

    assert!(matches!(
        result,
        Err(RepositoryError::NotFound { kind: "BlogPost", id: 12345 })
    ));
}

#[test]
#[ignore = "needs DATABASE_URL"]
async fn test_framework_flag_query_and_ordering() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    for (title, flag) in [("a", true), ("b", false), ("c", true)] {
        CrudRepository::<Project>::save(&repo, project(title, flag))
            .await
            .unwrap();
    }

    let all = CrudRepository::<Project>::find_all(&repo).await.unwrap();
    let ids: Vec<i64> = all.iter().filter_map(|p| p.id).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);

    let flagged = repo.find_framework_flagged().await.unwrap();
    assert_eq!(
        flagged.iter().map(|p| p.title.as_str()).collect::<Vec<_>>(),
        vec!["a", "c"]
    );
}

#[test]
#[ignore = "needs DATABASE_URL"]
async fn test_status_reports_postgres_backend() {
    let ctx = DbTestContext::setup().await;
    let repos = Repositories::postgres(ctx.pool.clone());

    repos
        .contacts
        .save(ContactInfo {
            email: Some("me@example.com".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    let status = repos.status().await.unwrap();
    assert_eq!(status.backend, "postgres");
    let contact_rows = status
        .tables
        .iter()
        .find(|t| t.name == "contact_info")
        .map(|t| t.rows);
    assert_eq!(contact_rows, Some(1));
}
