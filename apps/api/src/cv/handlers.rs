use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};

use crate::cv::codec;
use crate::cv::collections::CollectionKind;
use crate::cv::models::{
    is_proficiency_level, Book, CvRecord, Languages, PersonalInfo, PROFICIENCY_LEVELS,
};
use crate::cv::validation::validate;
use crate::errors::AppError;
use crate::state::AppState;
use crate::store;

/// GET /api/v1/cv
pub async fn handle_get_cv(State(state): State<AppState>) -> Json<CvRecord> {
    let session = state.session.read().await;
    Json(session.record.clone())
}

/// GET /api/v1/cv/meta/proficiency-levels
pub async fn handle_proficiency_levels() -> Json<[&'static str; 6]> {
    Json(PROFICIENCY_LEVELS)
}

/// PUT /api/v1/cv/personal-info
pub async fn handle_put_personal_info(
    State(state): State<AppState>,
    Json(body): Json<PersonalInfo>,
) -> StatusCode {
    let mut session = state.session.write().await;
    session.record.personal_info = body;
    StatusCode::NO_CONTENT
}

/// PUT /api/v1/cv/languages
///
/// Proficiency values must be members of the fixed six-level scale — the
/// interactive UI offers them through a select box and the API holds the
/// same line.
pub async fn handle_put_languages(
    State(state): State<AppState>,
    Json(body): Json<Languages>,
) -> Result<StatusCode, AppError> {
    for value in [
        &body.english_listening,
        &body.english_reading,
        &body.english_speaking,
        &body.english_writing,
        &body.hindi_listening,
        &body.hindi_reading,
        &body.hindi_speaking,
        &body.hindi_writing,
    ] {
        if !is_proficiency_level(value) {
            return Err(AppError::MalformedInput(format!(
                "Unknown proficiency level: {value}"
            )));
        }
    }
    let mut session = state.session.write().await;
    session.record.languages = body;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/cv/book
pub async fn handle_put_book(
    State(state): State<AppState>,
    Json(body): Json<Book>,
) -> StatusCode {
    let mut session = state.session.write().await;
    session.record.book = body;
    StatusCode::NO_CONTENT
}

/// Scalar skills fields; `softwares` is edited through the collection
/// endpoints and stays as-is.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SkillsUpdate {
    pub h_index: String,
    pub researchgate_score: String,
    pub programming_languages: String,
    pub parallel_computing: String,
    pub experiments: String,
}

/// PUT /api/v1/cv/skills
pub async fn handle_put_skills(
    State(state): State<AppState>,
    Json(body): Json<SkillsUpdate>,
) -> StatusCode {
    let mut session = state.session.write().await;
    let skills = &mut session.record.skills;
    skills.h_index = body.h_index;
    skills.researchgate_score = body.researchgate_score;
    skills.programming_languages = body.programming_languages;
    skills.parallel_computing = body.parallel_computing;
    skills.experiments = body.experiments;
    StatusCode::NO_CONTENT
}

#[derive(Debug, Deserialize)]
pub struct YearParam {
    pub year: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AppendResponse {
    /// Index of the new entry; `None` when a year-keyed append was refused
    /// because the year was missing or not all digits.
    pub index: Option<usize>,
}

/// POST /api/v1/cv/collections/:kind/items?year=YYYY
pub async fn handle_append(
    State(state): State<AppState>,
    Path(kind): Path<CollectionKind>,
    Query(params): Query<YearParam>,
) -> Json<AppendResponse> {
    let mut session = state.session.write().await;
    let index = session.record.append_item(kind, params.year.as_deref());
    Json(AppendResponse { index })
}

/// PATCH /api/v1/cv/collections/:kind/items/:index?year=YYYY
///
/// Body is a map of field name to new value; only named fields change.
pub async fn handle_update(
    State(state): State<AppState>,
    Path((kind, index)): Path<(CollectionKind, usize)>,
    Query(params): Query<YearParam>,
    Json(fields): Json<BTreeMap<String, String>>,
) -> StatusCode {
    let mut session = state.session.write().await;
    session
        .record
        .update_item(kind, params.year.as_deref(), index, &fields);
    StatusCode::NO_CONTENT
}

/// DELETE /api/v1/cv/collections/:kind/items/:index?year=YYYY
pub async fn handle_remove(
    State(state): State<AppState>,
    Path((kind, index)): Path<(CollectionKind, usize)>,
    Query(params): Query<YearParam>,
) -> StatusCode {
    let mut session = state.session.write().await;
    session.record.remove_item(kind, params.year.as_deref(), index);
    StatusCode::NO_CONTENT
}

#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
}

/// POST /api/v1/cv/validate
/// Always 200 — validation problems are data, not failures.
pub async fn handle_validate(State(state): State<AppState>) -> Json<ValidationReport> {
    let session = state.session.read().await;
    Json(ValidationReport {
        errors: validate(&session.record),
    })
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub db_filename: String,
    pub last_updated: String,
}

/// POST /api/v1/cv/save
///
/// Validates (422 with the accumulated messages when blocked), stamps
/// `last_updated`, and writes a fresh store file bundling the JSON with the
/// current template and style text into the data dir.
pub async fn handle_save(State(state): State<AppState>) -> Result<Json<SaveResponse>, AppError> {
    let mut session = state.session.write().await;

    let errors = validate(&session.record);
    if !errors.is_empty() {
        return Err(AppError::UnprocessableEntity(
            serde_json::to_string(&errors).unwrap_or_default(),
        ));
    }

    session.record.last_updated = Utc::now().to_rfc3339();
    let json = codec::encode(&session.record)
        .map_err(|e| anyhow::anyhow!("Failed to serialize record: {e}"))?;

    std::fs::create_dir_all(&state.config.data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create data dir: {e}"))?;
    let filename = store::db_filename("cv", Local::now());
    let path = state.config.data_dir.join(&filename);
    store::write_store(&path, &session.snapshot_files(&json))?;

    Ok(Json(SaveResponse {
        db_filename: filename,
        last_updated: session.record.last_updated.clone(),
    }))
}

/// GET /api/v1/cv/export/json
/// Pretty-printed full record, as a download.
pub async fn handle_export_json(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.session.read().await;
    let json = codec::encode(&session.record)
        .map_err(|e| anyhow::anyhow!("Failed to serialize record: {e}"))?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"cv_data.json\"",
            ),
        ],
        json,
    ))
}
