use std::io::Write as _;

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Local;
use serde::Serialize;
use tracing::{info, warn};

use crate::cv::codec;
use crate::cv::validation::validate;
use crate::errors::AppError;
use crate::render::{compile, preview, render_template};
use crate::state::AppState;
use crate::store;

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    /// The generated LaTeX document source.
    pub tex: String,
    /// Compiled PDF, when the external toolchain is available.
    pub pdf_base64: Option<String>,
    /// User-visible reason when the PDF is absent.
    pub pdf_note: Option<String>,
    /// One PNG per page, for display only. Empty when preview failed or no
    /// PDF was produced.
    pub preview_pages_base64: Vec<String>,
    /// Fresh store artifact written alongside the export.
    pub db_filename: String,
}

/// POST /api/v1/cv/generate
///
/// Validates (422 with accumulated messages when blocked), renders the
/// record through the uploaded template, then best-effort compiles and
/// rasterizes. Compiler/preview failures downgrade the response, they do
/// not fail it.
pub async fn handle_generate(
    State(state): State<AppState>,
) -> Result<Json<GenerateResponse>, AppError> {
    let session = state.session.read().await;

    let errors = validate(&session.record);
    if !errors.is_empty() {
        return Err(AppError::UnprocessableEntity(
            serde_json::to_string(&errors).unwrap_or_default(),
        ));
    }
    if session.template_tex.is_empty() || session.style_sty.is_empty() {
        return Err(AppError::Validation(
            "Please upload a store containing cv_template.tex and cv_style.sty".to_string(),
        ));
    }

    let tex = render_template(&session.record, &session.template_tex)?;
    let outcome = compile::compile_pdf(&state.config.pdflatex_bin, &tex, &session.style_sty).await?;

    let mut pages = Vec::new();
    if let Some(pdf) = &outcome.pdf {
        pages = preview::pdf_to_pages(&state.config.pdftoppm_bin, pdf).await?;
    }

    let json = codec::encode(&session.record)
        .map_err(|e| anyhow::anyhow!("Failed to serialize record: {e}"))?;
    std::fs::create_dir_all(&state.config.data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create data dir: {e}"))?;
    let filename = store::db_filename("cv", Local::now());
    store::write_store(
        &state.config.data_dir.join(&filename),
        &session.snapshot_files(&json),
    )?;

    info!(pdf = outcome.pdf.is_some(), pages = pages.len(), "generated CV");
    Ok(Json(GenerateResponse {
        tex,
        pdf_base64: outcome.pdf.as_deref().map(|b| BASE64.encode(b)),
        pdf_note: outcome.note,
        preview_pages_base64: pages.iter().map(|p| BASE64.encode(p)).collect(),
        db_filename: filename,
    }))
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Filenames dispatched into the session, in row order.
    pub loaded: Vec<String>,
}

/// POST /api/v1/store/upload
///
/// Accepts a multipart upload of a store file. The upload is staged in a
/// temp file that is removed on every exit path; the session only changes
/// when the whole store parses.
pub async fn handle_store_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::MalformedInput(format!("Invalid multipart upload: {e}")))?
        .ok_or_else(|| AppError::MalformedInput("Upload a .db store file".to_string()))?;
    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::MalformedInput(format!("Invalid multipart upload: {e}")))?;

    let mut tmp = tempfile::NamedTempFile::new()
        .map_err(|e| anyhow::anyhow!("Failed to create temp file: {e}"))?;
    tmp.write_all(&data)
        .map_err(|e| anyhow::anyhow!("Failed to stage upload: {e}"))?;

    let mut session = state.session.write().await;
    let loaded = session.load_store(tmp.path())?;
    info!(files = loaded.len(), "store loaded into session");
    Ok(Json(UploadResponse { loaded }))
}

/// GET /api/v1/store/download
///
/// Writes a fresh store bundling current JSON plus the original template and
/// style text, and streams it back.
pub async fn handle_store_download(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.session.read().await;
    let json = codec::encode(&session.record)
        .map_err(|e| anyhow::anyhow!("Failed to serialize record: {e}"))?;

    let dir = tempfile::tempdir().map_err(|e| anyhow::anyhow!("Failed to create temp dir: {e}"))?;
    let filename = store::db_filename("cv", Local::now());
    let path = dir.path().join(&filename);
    store::write_store(&path, &session.snapshot_files(&json))?;
    let bytes =
        std::fs::read(&path).map_err(|e| anyhow::anyhow!("Failed to read store file: {e}"))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    ))
}

/// POST /api/v1/store/convert
///
/// The standalone converter flow: takes `cv_data.json`, `cv_template.tex`
/// and `cv_style.sty` as multipart uploads and returns a store file built
/// from them, without touching the session.
pub async fn handle_store_convert(mut multipart: Multipart) -> Result<impl IntoResponse, AppError> {
    let mut json_content = None;
    let mut tex_content = None;
    let mut sty_content = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::MalformedInput(format!("Invalid multipart upload: {e}")))?
    {
        let key = field
            .file_name()
            .or(field.name())
            .unwrap_or_default()
            .to_string();
        let text = field
            .text()
            .await
            .map_err(|e| AppError::MalformedInput(format!("Invalid multipart upload: {e}")))?;
        if key == store::DATA_FILENAME || key.ends_with(".json") {
            json_content = Some(text);
        } else if key == store::TEMPLATE_FILENAME || key.ends_with(".tex") {
            tex_content = Some(text);
        } else if key == store::STYLE_FILENAME || key.ends_with(".sty") {
            sty_content = Some(text);
        } else {
            warn!(field = %key, "ignoring unrecognized convert upload field");
        }
    }

    let (Some(json), Some(tex), Some(sty)) = (json_content, tex_content, sty_content) else {
        return Err(AppError::Validation(
            "Please upload all three files: cv_data.json, cv_template.tex, and cv_style.sty."
                .to_string(),
        ));
    };

    let dir = tempfile::tempdir().map_err(|e| anyhow::anyhow!("Failed to create temp dir: {e}"))?;
    let filename = store::db_filename("cv", Local::now());
    let path = dir.path().join(&filename);
    store::write_store(
        &path,
        &[
            (store::DATA_FILENAME, json.as_str()),
            (store::TEMPLATE_FILENAME, tex.as_str()),
            (store::STYLE_FILENAME, sty.as_str()),
        ],
    )?;
    let bytes =
        std::fs::read(&path).map_err(|e| anyhow::anyhow!("Failed to read store file: {e}"))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    ))
}

/// GET /api/v1/files/template
pub async fn handle_get_template(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.session.read().await;
    if session.template_tex.is_empty() {
        return Err(AppError::NotFound("No template uploaded".to_string()));
    }
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"cv_template.tex\"",
            ),
        ],
        session.template_tex.clone(),
    ))
}

/// PUT /api/v1/files/template
pub async fn handle_put_template(State(state): State<AppState>, body: String) -> StatusCode {
    let mut session = state.session.write().await;
    session.template_tex = body;
    StatusCode::NO_CONTENT
}

/// GET /api/v1/files/style
pub async fn handle_get_style(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.session.read().await;
    if session.style_sty.is_empty() {
        return Err(AppError::NotFound("No style file uploaded".to_string()));
    }
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"cv_style.sty\"",
            ),
        ],
        session.style_sty.clone(),
    ))
}

/// PUT /api/v1/files/style
pub async fn handle_put_style(State(state): State<AppState>, body: String) -> StatusCode {
    let mut session = state.session.write().await;
    session.style_sty = body;
    StatusCode::NO_CONTENT
}
