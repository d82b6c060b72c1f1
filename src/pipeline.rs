//! The two stages end to end: statement → tables, tables → filled forms.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;

use crate::form::assemble::{self, Template};
use crate::form::mapper::{self, FormPlan, Totals};
use crate::form::{DocumentId, Taxpayer};
use crate::parser::sections::{LineGate, Section};
use crate::parser::{self, SectionRecords};
use crate::{statement, store};

/// Stage one: read the statement and write one table per section.
pub fn extract(statement_path: &Path, work_dir: &Path, gate: LineGate) -> Result<Vec<SectionRecords>> {
    let pages = statement::read_pages(statement_path)?;
    let lines = statement::to_lines(&pages);
    let sections = parser::extract_sections(&lines, gate);

    std::fs::create_dir_all(work_dir).with_context(|| format!("creating {}", work_dir.display()))?;
    for SectionRecords { section, records } in &sections {
        let path = store::table_path(work_dir, *section);
        store::write_section(&path, records)?;
        println!("Wrote {} ({} records)", path.display(), records.len());
    }
    Ok(sections)
}

/// Re-read the four tables, in section order.
pub fn load_tables(work_dir: &Path) -> Result<Vec<SectionRecords>> {
    Section::ALL
        .into_iter()
        .map(|section| {
            let records = store::read_section(&store::table_path(work_dir, section))?;
            Ok(SectionRecords { section, records })
        })
        .collect()
}

pub fn plans(tables: &[SectionRecords], taxpayer: &Taxpayer) -> Vec<FormPlan> {
    tables
        .iter()
        .map(|t| mapper::plan(DocumentId::from(t.section), &t.records, taxpayer))
        .collect()
}

/// Where stage two writes its documents.
#[derive(Debug, Clone)]
pub struct FillTargets {
    pub template: PathBuf,
    pub work_dir: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone)]
pub struct FillReport {
    pub documents: Vec<(DocumentId, PathBuf, usize)>,
    pub merged_pages: usize,
}

/// Stage two: one document per section, then all of them merged into `output`.
pub fn fill(targets: &FillTargets, taxpayer: &Taxpayer) -> Result<FillReport> {
    let template = Template::load(&targets.template)?;
    let tables = load_tables(&targets.work_dir)?;
    let plans = plans(&tables, taxpayer);

    let pb = ProgressBar::new(plans.len() as u64 + 1);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut documents = Vec::new();
    for (plan, table) in plans.iter().zip(&tables) {
        pb.set_message(plan.doc.code());
        let path = targets.work_dir.join(format!("{}.pdf", table.section.file_stem()));
        let pages = assemble::write(&template, std::slice::from_ref(plan), &path)?;
        documents.push((plan.doc, path, pages));
        pb.inc(1);
    }

    pb.set_message("merged");
    let merged_pages = assemble::write(&template, &plans, &targets.output)?;
    pb.inc(1);
    pb.finish_and_clear();

    info!(output = %targets.output.display(), pages = merged_pages, "forms filled");
    Ok(FillReport {
        documents,
        merged_pages,
    })
}

/// Per-section figures shown by the `summary` command.
#[derive(Debug, Clone, Serialize)]
pub struct SectionSummary {
    pub document: &'static str,
    pub section: Section,
    pub records: usize,
    pub pages: usize,
    pub totals: Totals,
}

pub fn summarize(tables: &[SectionRecords]) -> Vec<SectionSummary> {
    tables
        .iter()
        .map(|t| SectionSummary {
            document: DocumentId::from(t.section).code(),
            section: t.section,
            records: t.records.len(),
            pages: mapper::page_count(t.records.len()),
            totals: Totals::of(&t.records),
        })
        .collect()
}

pub fn record_count(tables: &[SectionRecords]) -> usize {
    tables.iter().map(|t| t.records.len()).sum()
}

// ── Tests ──
