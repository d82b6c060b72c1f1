use std::path::Path;

use anyhow::{Context, Result};
use lopdf::Document;
use tracing::{info, warn};

/// Page separator in plain-text statements.
const FORM_FEED: char = '\x0c';

/// Text of every page of the source statement, `None` where a page has no text.
pub fn read_pages(path: &Path) -> Result<Vec<Option<String>>> {
    let is_pdf = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);

    let pages = if is_pdf {
        read_pdf_pages(path)?
    } else {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading statement {}", path.display()))?;
        split_text_pages(&raw)
    };

    info!(path = %path.display(), pages = pages.len(), "statement loaded");
    Ok(pages)
}

fn read_pdf_pages(path: &Path) -> Result<Vec<Option<String>>> {
    let doc = Document::load(path).with_context(|| format!("opening statement {}", path.display()))?;
    let pages = doc
        .get_pages()
        .into_keys()
        .map(|number| match doc.extract_text(&[number]) {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => None,
            Err(e) => {
                warn!(page = number, error = %e, "no text on page");
                None
            }
        })
        .collect();
    Ok(pages)
}

fn split_text_pages(raw: &str) -> Vec<Option<String>> {
    raw.split(FORM_FEED)
        .map(|page| {
            if page.trim().is_empty() {
                None
            } else {
                Some(page.to_string())
            }
        })
        .collect()
}

/// Flatten page texts into one line stream, page order preserved.
pub fn to_lines(pages: &[Option<String>]) -> Vec<String> {
    pages
        .iter()
        .flatten()
        .flat_map(|text| text.replace("\r\n", "\n").split('\n').map(str::to_string).collect::<Vec<_>>())
        .collect()
}

// ── Tests ──
