use crate::{
    error::ApiError,
    models::{BlogPost, ContactInfo, Entity, Project, StoreStatus},
    repository::{CrudRepository, Repositories},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

pub type ApiResult<T> = Result<T, ApiError>;

// --- Shared CRUD flow ---
//
// Every resource follows the same rules; the per-resource handlers below only pick the
// repository and carry the OpenAPI annotations.

async fn fetch<T, R>(repo: &R, id: i64) -> ApiResult<Json<T>>
where
    T: Entity,
    R: CrudRepository<T> + ?Sized,
{
    repo.find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(T::KIND, id))
}

/// Any client-supplied id is dropped; the store assigns a fresh one.
async fn create<T, R>(repo: &R, mut entity: T) -> ApiResult<(StatusCode, Json<T>)>
where
    T: Entity,
    R: CrudRepository<T> + ?Sized,
{
    entity.set_id(None);
    let saved = repo.save(entity).await?;
    tracing::info!(kind = T::KIND, id = ?saved.id(), "record created");
    Ok((StatusCode::CREATED, Json(saved)))
}

/// Full replacement. The path id overrides whatever id the body carries.
async fn replace<T, R>(repo: &R, id: i64, mut entity: T) -> ApiResult<Json<T>>
where
    T: Entity,
    R: CrudRepository<T> + ?Sized,
{
    if !repo.exists_by_id(id).await? {
        return Err(ApiError::not_found(T::KIND, id));
    }
    entity.set_id(Some(id));
    let saved = repo.save(entity).await?;
    tracing::info!(kind = T::KIND, id, "record replaced");
    Ok(Json(saved))
}

async fn remove<T, R>(repo: &R, id: i64) -> ApiResult<StatusCode>
where
    T: Entity,
    R: CrudRepository<T> + ?Sized,
{
    // The second check covers a row deleted by a concurrent request in between.
    if !repo.exists_by_id(id).await? || !repo.delete_by_id(id).await? {
        return Err(ApiError::not_found(T::KIND, id));
    }
    tracing::info!(kind = T::KIND, id, "record deleted");
    Ok(StatusCode::NO_CONTENT)
}

// --- Projects ---

/// list_projects
///
/// Every stored project, ordered by id. No pagination.
#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "projects",
    responses((status = 200, description = "All projects", body = [Project])),
    security(("basic_auth" = []))
)]
pub async fn list_projects(State(repos): State<Repositories>) -> ApiResult<Json<Vec<Project>>> {
    Ok(Json(repos.projects.find_all().await?))
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    tag = "projects",
    params(("id" = i64, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Found", body = Project),
        (status = 404, description = "No project with this id")
    ),
    security(("basic_auth" = []))
)]
pub async fn get_project(
    State(repos): State<Repositories>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Project>> {
    fetch(repos.projects.as_ref(), id).await
}

/// create_project
///
/// Stores a new project. The response carries the id assigned by the store.
#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "projects",
    request_body = Project,
    responses((status = 201, description = "Created", body = Project)),
    security(("basic_auth" = []))
)]
pub async fn create_project(
    State(repos): State<Repositories>,
    Json(payload): Json<Project>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    create(repos.projects.as_ref(), payload).await
}

/// update_project
///
/// Replaces the whole record. There is no partial update.
#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    tag = "projects",
    params(("id" = i64, Path, description = "Project ID")),
    request_body = Project,
    responses(
        (status = 200, description = "Updated", body = Project),
        (status = 404, description = "No project with this id")
    ),
    security(("basic_auth" = []))
)]
pub async fn update_project(
    State(repos): State<Repositories>,
    Path(id): Path<i64>,
    Json(payload): Json<Project>,
) -> ApiResult<Json<Project>> {
    replace(repos.projects.as_ref(), id, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    tag = "projects",
    params(("id" = i64, Path, description = "Project ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No project with this id")
    ),
    security(("basic_auth" = []))
)]
pub async fn delete_project(
    State(repos): State<Repositories>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    remove::<Project, _>(repos.projects.as_ref(), id).await
}

/// list_spring_boot_projects
///
/// Only the projects whose framework flag is set. The filter runs in the store.
#[utoipa::path(
    get,
    path = "/api/projects/spring-boot",
    tag = "projects",
    responses((status = 200, description = "Projects built with Spring Boot", body = [Project])),
    security(("basic_auth" = []))
)]
pub async fn list_spring_boot_projects(
    State(repos): State<Repositories>,
) -> ApiResult<Json<Vec<Project>>> {
    Ok(Json(repos.projects.find_framework_flagged().await?))
}

// --- Blog posts ---

#[utoipa::path(
    get,
    path = "/api/blogposts",
    tag = "blogposts",
    responses((status = 200, description = "All blog posts", body = [BlogPost])),
    security(("basic_auth" = []))
)]
pub async fn list_blog_posts(State(repos): State<Repositories>) -> ApiResult<Json<Vec<BlogPost>>> {
    Ok(Json(repos.blog_posts.find_all().await?))
}

#[utoipa::path(
    get,
    path = "/api/blogposts/{id}",
    tag = "blogposts",
    params(("id" = i64, Path, description = "Blog post ID")),
    responses(
        (status = 200, description = "Found", body = BlogPost),
        (status = 404, description = "No blog post with this id")
    ),
    security(("basic_auth" = []))
)]
pub async fn get_blog_post(
    State(repos): State<Repositories>,
    Path(id): Path<i64>,
) -> ApiResult<Json<BlogPost>> {
    fetch(repos.blog_posts.as_ref(), id).await
}

#[utoipa::path(
    post,
    path = "/api/blogposts",
    tag = "blogposts",
    request_body = BlogPost,
    responses((status = 201, description = "Created", body = BlogPost)),
    security(("basic_auth" = []))
)]
pub async fn create_blog_post(
    State(repos): State<Repositories>,
    Json(payload): Json<BlogPost>,
) -> ApiResult<(StatusCode, Json<BlogPost>)> {
    create(repos.blog_posts.as_ref(), payload).await
}

#[utoipa::path(
    put,
    path = "/api/blogposts/{id}",
    tag = "blogposts",
    params(("id" = i64, Path, description = "Blog post ID")),
    request_body = BlogPost,
    responses(
        (status = 200, description = "Updated", body = BlogPost),
        (status = 404, description = "No blog post with this id")
    ),
    security(("basic_auth" = []))
)]
pub async fn update_blog_post(
    State(repos): State<Repositories>,
    Path(id): Path<i64>,
    Json(payload): Json<BlogPost>,
) -> ApiResult<Json<BlogPost>> {
    replace(repos.blog_posts.as_ref(), id, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/blogposts/{id}",
    tag = "blogposts",
    params(("id" = i64, Path, description = "Blog post ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No blog post with this id")
    ),
    security(("basic_auth" = []))
)]
pub async fn delete_blog_post(
    State(repos): State<Repositories>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    remove::<BlogPost, _>(repos.blog_posts.as_ref(), id).await
}

// --- Contact info ---

#[utoipa::path(
    get,
    path = "/api/contact",
    tag = "contact",
    responses((status = 200, description = "All contact entries", body = [ContactInfo])),
    security(("basic_auth" = []))
)]
pub async fn list_contact_info(
    State(repos): State<Repositories>,
) -> ApiResult<Json<Vec<ContactInfo>>> {
    Ok(Json(repos.contacts.find_all().await?))
}

#[utoipa::path(
    get,
    path = "/api/contact/{id}",
    tag = "contact",
    params(("id" = i64, Path, description = "Contact entry ID")),
    responses(
        (status = 200, description = "Found", body = ContactInfo),
        (status = 404, description = "No contact entry with this id")
    ),
    security(("basic_auth" = []))
)]
pub async fn get_contact_info(
    State(repos): State<Repositories>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ContactInfo>> {
    fetch(repos.contacts.as_ref(), id).await
}

#[utoipa::path(
    post,
    path = "/api/contact",
    tag = "contact",
    request_body = ContactInfo,
    responses((status = 201, description = "Created", body = ContactInfo)),
    security(("basic_auth" = []))
)]
pub async fn create_contact_info(
    State(repos): State<Repositories>,
    Json(payload): Json<ContactInfo>,
) -> ApiResult<(StatusCode, Json<ContactInfo>)> {
    create(repos.contacts.as_ref(), payload).await
}

#[utoipa::path(
    put,
    path = "/api/contact/{id}",
    tag = "contact",
    params(("id" = i64, Path, description = "Contact entry ID")),
    request_body = ContactInfo,
    responses(
        (status = 200, description = "Updated", body = ContactInfo),
        (status = 404, description = "No contact entry with this id")
    ),
    security(("basic_auth" = []))
)]
pub async fn update_contact_info(
    State(repos): State<Repositories>,
    Path(id): Path<i64>,
    Json(payload): Json<ContactInfo>,
) -> ApiResult<Json<ContactInfo>> {
    replace(repos.contacts.as_ref(), id, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/contact/{id}",
    tag = "contact",
    params(("id" = i64, Path, description = "Contact entry ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No contact entry with this id")
    ),
    security(("basic_auth" = []))
)]
pub async fn delete_contact_info(
    State(repos): State<Repositories>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    remove::<ContactInfo, _>(repos.contacts.as_ref(), id).await
}

// --- Operations ---

/// health
///
/// Liveness probe for load balancers. Public.
#[utoipa::path(
    get,
    path = "/health",
    tag = "operations",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health() -> &'static str {
    "ok"
}

/// db_console
///
/// Read-only view of the store: active backend and per-table row counts. Public, so it
/// never returns record contents.
#[utoipa::path(
    get,
    path = "/db-console",
    tag = "operations",
    responses(
        (status = 200, description = "Store status", body = StoreStatus),
        (status = 500, description = "Store unreachable")
    )
)]
pub async fn db_console(State(repos): State<Repositories>) -> ApiResult<Json<StoreStatus>> {
    Ok(Json(repos.status().await?))
}
