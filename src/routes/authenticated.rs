use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// The three CRUD resources. Mounted under `/api` by `create_router`; every request
/// reaching these handlers has passed the access policy with valid Basic credentials.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Projects ---
        .route(
            "/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        // Static segment, so it takes precedence over `/projects/{id}`.
        .route(
            "/projects/spring-boot",
            get(handlers::list_spring_boot_projects),
        )
        .route(
            "/projects/{id}",
            get(handlers::get_project)
                .put(handlers::update_project)
                .delete(handlers::delete_project),
        )
        // --- Blog posts ---
        .route(
            "/blogposts",
            get(handlers::list_blog_posts).post(handlers::create_blog_post),
        )
        .route(
            "/blogposts/{id}",
            get(handlers::get_blog_post)
                .put(handlers::update_blog_post)
                .delete(handlers::delete_blog_post),
        )
        // --- Contact info ---
        .route(
            "/contact",
            get(handlers::list_contact_info).post(handlers::create_contact_info),
        )
        .route(
            "/contact/{id}",
            get(handlers::get_contact_info)
                .put(handlers::update_contact_info)
                .delete(handlers::delete_contact_info),
        )
}
