//! The editing session: the one in-memory record plus the opaque template
//! and style texts that travel with it. There is exactly one mutator of the
//! session at any time (it lives behind a lock in `AppState`).

use std::path::Path;

use tracing::warn;

use crate::cv::codec;
use crate::cv::models::CvRecord;
use crate::errors::AppError;
use crate::store;

#[derive(Debug, Default)]
pub struct Session {
    pub record: CvRecord,
    pub template_tex: String,
    pub style_sty: String,
}

impl Session {
    /// Loads an uploaded store file into the session, dispatching rows by
    /// filename. The JSON payload is parsed and normalized; template and
    /// style payloads are opaque text. On any failure (unreadable store,
    /// malformed JSON) the session is left untouched.
    pub fn load_store(&mut self, path: &Path) -> Result<Vec<String>, AppError> {
        let rows = store::read_store(path)
            .map_err(|e| AppError::MalformedInput(format!("Not a valid CV store: {e}")))?;

        let mut record = None;
        let mut template = None;
        let mut style = None;
        let mut loaded = Vec::new();

        for row in rows {
            match row.filename.as_str() {
                store::DATA_FILENAME => {
                    let parsed = codec::decode(&row.content).map_err(|e| {
                        AppError::MalformedInput(format!(
                            "Invalid JSON in {}: {e}",
                            store::DATA_FILENAME
                        ))
                    })?;
                    record = Some(parsed);
                    loaded.push(row.filename);
                }
                store::TEMPLATE_FILENAME => {
                    template = Some(row.content);
                    loaded.push(row.filename);
                }
                store::STYLE_FILENAME => {
                    style = Some(row.content);
                    loaded.push(row.filename);
                }
                other => warn!(filename = %other, "ignoring unknown row in uploaded store"),
            }
        }

        // Everything parsed; only now touch the session.
        if let Some(record) = record {
            self.record = record;
        }
        if let Some(template) = template {
            self.template_tex = template;
        }
        if let Some(style) = style {
            self.style_sty = style;
        }
        Ok(loaded)
    }

    /// The three rows a freshly written store bundles: current JSON plus the
    /// original template and style text.
    pub fn snapshot_files<'a>(&'a self, json: &'a str) -> Vec<(&'static str, &'a str)> {
        vec![
            (store::DATA_FILENAME, json),
            (store::TEMPLATE_FILENAME, self.template_tex.as_str()),
            (store::STYLE_FILENAME, self.style_sty.as_str()),
        ]
    }
}
