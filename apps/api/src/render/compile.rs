//! External LaTeX compilation.
//!
//! One blocking `pdflatex` invocation per request, no retries. A missing
//! toolchain or a non-zero exit downgrades the export to text-only output —
//! reported, never fatal. All work happens inside a temp dir that is removed
//! on every exit path.

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::warn;

/// Outcome of a compilation attempt. `pdf` is absent when the external tool
/// is unavailable or failed; `note` then carries the user-visible reason.
#[derive(Debug)]
pub struct CompileOutcome {
    pub pdf: Option<Vec<u8>>,
    pub note: Option<String>,
}

const MANUAL_HINT: &str = "Download the LaTeX file and compile it manually.";

/// Compiles the generated document source to PDF. Only filesystem problems
/// with the scratch dir are errors; compiler failures come back as an
/// outcome without a PDF.
pub async fn compile_pdf(pdflatex_bin: &str, tex: &str, sty: &str) -> Result<CompileOutcome> {
    let dir = tempfile::tempdir().context("failed to create scratch dir for pdflatex")?;
    std::fs::write(dir.path().join("cv.tex"), tex).context("failed to write cv.tex")?;
    std::fs::write(dir.path().join("cv_style.sty"), sty).context("failed to write cv_style.sty")?;

    let output = Command::new(pdflatex_bin)
        .arg("-interaction=nonstopmode")
        .arg("cv.tex")
        .current_dir(dir.path())
        .output()
        .await;

    let outcome = match output {
        Err(e) => {
            warn!("pdflatex unavailable: {e}");
            CompileOutcome {
                pdf: None,
                note: Some(format!("pdflatex not found. {MANUAL_HINT}")),
            }
        }
        Ok(out) if !out.status.success() => {
            warn!(status = %out.status, "pdflatex failed");
            CompileOutcome {
                pdf: None,
                note: Some(format!("pdflatex compilation failed. {MANUAL_HINT}")),
            }
        }
        Ok(_) => match std::fs::read(dir.path().join("cv.pdf")) {
            Ok(bytes) => CompileOutcome {
                pdf: Some(bytes),
                note: None,
            },
            Err(e) => {
                warn!("pdflatex succeeded but produced no cv.pdf: {e}");
                CompileOutcome {
                    pdf: None,
                    note: Some(format!("pdflatex produced no PDF. {MANUAL_HINT}")),
                }
            }
        },
    };

    Ok(outcome)
}
