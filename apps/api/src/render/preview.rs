//! External PDF preview rasterization.
//!
//! Hands the compiled PDF to `pdftoppm` and collects one PNG per page, for
//! display only. Any failure yields an empty page list — preview is strictly
//! best-effort.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::warn;

/// Renders each page of the PDF to a PNG. Returns an empty vec when the
/// external tool is unavailable or fails.
pub async fn pdf_to_pages(pdftoppm_bin: &str, pdf: &[u8]) -> Result<Vec<Vec<u8>>> {
    let dir = tempfile::tempdir().context("failed to create scratch dir for pdftoppm")?;
    std::fs::write(dir.path().join("cv.pdf"), pdf).context("failed to write cv.pdf")?;

    let output = Command::new(pdftoppm_bin)
        .args(["-png", "cv.pdf", "page"])
        .current_dir(dir.path())
        .output()
        .await;

    match output {
        Err(e) => {
            warn!("pdftoppm unavailable: {e}");
            Ok(vec![])
        }
        Ok(out) if !out.status.success() => {
            warn!(status = %out.status, "pdftoppm failed");
            Ok(vec![])
        }
        Ok(_) => collect_pages(dir.path()),
    }
}

// pdftoppm writes page-<n>.png; sort numerically, not lexically.
fn collect_pages(dir: &Path) -> Result<Vec<Vec<u8>>> {
    let mut pages: Vec<(u32, Vec<u8>)> = Vec::new();
    for entry in std::fs::read_dir(dir).context("failed to list preview pages")? {
        let entry = entry.context("failed to read preview dir entry")?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(number) = name
            .strip_prefix("page-")
            .and_then(|rest| rest.strip_suffix(".png"))
            .and_then(|digits| digits.parse::<u32>().ok())
        else {
            continue;
        };
        let bytes = std::fs::read(entry.path()).context("failed to read preview page")?;
        pages.push((number, bytes));
    }
    pages.sort_by_key(|(number, _)| *number);
    Ok(pages.into_iter().map(|(_, bytes)| bytes).collect())
}
