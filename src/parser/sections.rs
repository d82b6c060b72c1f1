use serde::Serialize;

/// Lines inside a section are only forwarded when they carry one of these.
pub const DETECTION_KEYWORDS: &[&str] = &["Symbol", "Sale", "Total of"];

/// One of the four tax-lot categories of the consolidated statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Section {
    ShortTermCovered,
    ShortTermNoncovered,
    LongTermCovered,
    LongTermNoncovered,
}

impl Section {
    /// Statement order, also the order of the merged form.
    pub const ALL: [Section; 4] = [
        Section::ShortTermCovered,
        Section::ShortTermNoncovered,
        Section::LongTermCovered,
        Section::LongTermNoncovered,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Section::ShortTermCovered => "SHORT TERM TRANSACTIONS FOR COVERED TAX LOTS",
            Section::ShortTermNoncovered => "SHORT TERM TRANSACTIONS FOR NONCOVERED TAX LOTS",
            Section::LongTermCovered => "LONG TERM TRANSACTIONS FOR COVERED TAX LOTS",
            Section::LongTermNoncovered => "LONG TERM TRANSACTIONS FOR NONCOVERED TAX LOTS",
        }
    }

    /// Stem shared by the section's intermediate table and its filled form.
    pub fn file_stem(self) -> &'static str {
        match self {
            Section::ShortTermCovered => "short_term_covered",
            Section::ShortTermNoncovered => "short_term_uncovered",
            Section::LongTermCovered => "long_term_covered",
            Section::LongTermNoncovered => "long_term_uncovered",
        }
    }

    pub fn is_long_term(self) -> bool {
        matches!(self, Section::LongTermCovered | Section::LongTermNoncovered)
    }

    pub fn is_covered(self) -> bool {
        matches!(self, Section::ShortTermCovered | Section::LongTermCovered)
    }

    fn other_headers(self) -> impl Iterator<Item = &'static str> {
        Section::ALL
            .into_iter()
            .filter(move |s| *s != self)
            .map(Section::header)
    }
}

/// Which in-section lines reach the record builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineGate {
    /// Only lines containing a detection keyword.
    #[default]
    Keywords,
    /// Every line between the header and the next section boundary.
    All,
}

impl LineGate {
    fn admits(self, line: &str) -> bool {
        match self {
            LineGate::Keywords => DETECTION_KEYWORDS.iter().any(|kw| line.contains(kw)),
            LineGate::All => true,
        }
    }
}

/// Slice the lines of one section out of the whole-document line stream.
///
/// Lines before the section header are ignored and the header itself is
/// consumed. The scan stops at the first line carrying another section's
/// header. Headers never overlap, so a section is one contiguous run.
pub fn scan_section<'a, S: AsRef<str>>(lines: &'a [S], section: Section, gate: LineGate) -> Vec<&'a str> {
    let header = section.header();
    let mut active = false;
    let mut forwarded = Vec::new();

    for line in lines {
        let line = line.as_ref();
        if active && section.other_headers().any(|h| line.contains(h)) {
            break;
        }
        if line.contains(header) {
            active = true;
            continue;
        }
        if active && gate.admits(line) {
            forwarded.push(line);
        }
    }

    forwarded
}

// ── Tests ──
