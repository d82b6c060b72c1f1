pub mod classify;
pub mod records;
pub mod sections;

use records::TradeRecord;
use sections::{LineGate, Section};
use tracing::info;

/// Records of one section, in encounter order.
#[derive(Debug, Clone)]
pub struct SectionRecords {
    pub section: Section,
    pub records: Vec<TradeRecord>,
}

/// Two-pass pipeline per section: line stream → forwarded lines → records.
///
/// Every section scans the same full line stream with its own symbol context,
/// so the four results are independent of each other.
pub fn extract_sections<S: AsRef<str>>(lines: &[S], gate: LineGate) -> Vec<SectionRecords> {
    Section::ALL
        .into_iter()
        .map(|section| {
            let forwarded = sections::scan_section(lines, section, gate);
            let records = records::build_all(forwarded.iter().copied());
            info!(
                section = section.file_stem(),
                forwarded = forwarded.len(),
                records = records.len(),
                "section scanned"
            );
            SectionRecords { section, records }
        })
        .collect()
}

// ── Tests ──
