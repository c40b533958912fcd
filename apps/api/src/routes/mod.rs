pub mod health;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::cv::handlers as cv;
use crate::render::handlers as render;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Record + section editors
        .route("/api/v1/cv", get(cv::handle_get_cv))
        .route(
            "/api/v1/cv/meta/proficiency-levels",
            get(cv::handle_proficiency_levels),
        )
        .route("/api/v1/cv/personal-info", put(cv::handle_put_personal_info))
        .route("/api/v1/cv/languages", put(cv::handle_put_languages))
        .route("/api/v1/cv/book", put(cv::handle_put_book))
        .route("/api/v1/cv/skills", put(cv::handle_put_skills))
        // Nested-collection editing
        .route(
            "/api/v1/cv/collections/:kind/items",
            post(cv::handle_append),
        )
        .route(
            "/api/v1/cv/collections/:kind/items/:index",
            patch(cv::handle_update).delete(cv::handle_remove),
        )
        // Validate / save / export
        .route("/api/v1/cv/validate", post(cv::handle_validate))
        .route("/api/v1/cv/save", post(cv::handle_save))
        .route("/api/v1/cv/export/json", get(cv::handle_export_json))
        .route("/api/v1/cv/generate", post(render::handle_generate))
        // Store upload / download / converter
        .route("/api/v1/store/upload", post(render::handle_store_upload))
        .route("/api/v1/store/download", get(render::handle_store_download))
        .route("/api/v1/store/convert", post(render::handle_store_convert))
        // Template and style text
        .route(
            "/api/v1/files/template",
            get(render::handle_get_template).put(render::handle_put_template),
        )
        .route(
            "/api/v1/files/style",
            get(render::handle_get_style).put(render::handle_put_style),
        )
        .with_state(state)
}
