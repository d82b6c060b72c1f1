//! Form 8949 projection: field addressing, per-page value plans and the
//! lopdf-backed assembler.

pub mod assemble;
pub mod mapper;

#[cfg(test)]
pub(crate) mod test_template;

use std::fmt;

use crate::parser::sections::Section;

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("template has no page {0}")]
    MissingPage(usize),
    #[error("template is malformed: {0}")]
    Malformed(&'static str),
    #[error(transparent)]
    Pdf(#[from] lopdf::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Term {
    Short,
    Long,
}

impl Term {
    /// Zero-based page of the two-page template holding this layout.
    pub fn template_page(self) -> usize {
        match self {
            Term::Short => 0,
            Term::Long => 1,
        }
    }

    /// Digit used in the layout's field names (`f1_…` / `f2_…`).
    pub fn field_prefix(self) -> u8 {
        match self {
            Term::Short => 1,
            Term::Long => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Coverage {
    Covered,
    Noncovered,
}

/// One of the four output documents, 1:1 with [`Section`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentId {
    Stc,
    Stu,
    Ltc,
    Ltu,
}

impl DocumentId {
    pub const ALL: [DocumentId; 4] = [DocumentId::Stc, DocumentId::Stu, DocumentId::Ltc, DocumentId::Ltu];

    pub fn code(self) -> &'static str {
        match self {
            DocumentId::Stc => "STC",
            DocumentId::Stu => "STU",
            DocumentId::Ltc => "LTC",
            DocumentId::Ltu => "LTU",
        }
    }

    pub fn term(self) -> Term {
        match self {
            DocumentId::Stc | DocumentId::Stu => Term::Short,
            DocumentId::Ltc | DocumentId::Ltu => Term::Long,
        }
    }

    pub fn coverage(self) -> Coverage {
        match self {
            DocumentId::Stc | DocumentId::Ltc => Coverage::Covered,
            DocumentId::Stu | DocumentId::Ltu => Coverage::Noncovered,
        }
    }

    /// Name-suffix of fields on the given 1-based page, e.g. `STC_2`.
    pub fn page_suffix(self, page: usize) -> String {
        format!("{}_{}", self.code(), page)
    }
}

impl From<Section> for DocumentId {
    fn from(section: Section) -> Self {
        match (section.is_long_term(), section.is_covered()) {
            (false, true) => DocumentId::Stc,
            (false, false) => DocumentId::Stu,
            (true, true) => DocumentId::Ltc,
            (true, false) => DocumentId::Ltu,
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A field position on one template page, independent of layout prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// `f{prefix}_{n}[0]`: identity (1, 2), grid (3..=114) and totals.
    Text(u32),
    /// `c{prefix}_1[{n}]`: the coverage checkbox group.
    Check(u32),
}

impl Slot {
    /// Name of the slot on an unrenamed template page.
    pub fn base_name(self, term: Term) -> String {
        let prefix = term.field_prefix();
        match self {
            Slot::Text(n) => format!("f{}_{}[0]", prefix, n),
            Slot::Check(n) => format!("c{}_1[{}]", prefix, n),
        }
    }
}

/// Rename a template field for one page of one document: `f1_3[0]` → `f1_3[0]_STC_1`.
pub fn qualify(base: &str, doc: DocumentId, page: usize) -> String {
    format!("{}_{}", base, doc.page_suffix(page))
}

/// Value written into a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    /// Checkbox on-state name, without the leading slash.
    Check(String),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Check(_) => None,
        }
    }
}

/// Who the form is filed for; both parts may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Taxpayer {
    pub name: String,
    pub tin: String,
}

// ── Tests ──
