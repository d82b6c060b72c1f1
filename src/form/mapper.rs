use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use super::{qualify, Coverage, DocumentId, FieldValue, Slot, Taxpayer};
use crate::parser::records::TradeRecord;
use crate::store::{coerce_amount, COLUMNS};

pub const ROWS_PER_PAGE: usize = 14;
/// Grid slots on one page: 14 rows × 8 columns.
pub const FIELDS_PER_PAGE: usize = ROWS_PER_PAGE * COLUMNS.len();

const FIRST_GRID_FIELD: u32 = 3;
const NAME_FIELD: Slot = Slot::Text(1);
const TIN_FIELD: Slot = Slot::Text(2);
// 117 is the printed "adjustment code" total and stays empty.
const PROCEEDS_TOTAL: Slot = Slot::Text(115);
const COST_TOTAL: Slot = Slot::Text(116);
const ADJUSTMENT_TOTAL: Slot = Slot::Text(118);
const GAIN_TOTAL: Slot = Slot::Text(119);

/// Column sums over every record of a section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub proceeds: Decimal,
    pub cost_basis: Decimal,
    pub adjustment: Decimal,
    pub gain_loss: Decimal,
}

impl Totals {
    pub fn of(records: &[TradeRecord]) -> Self {
        records.iter().fold(Totals::default(), |acc, r| Totals {
            proceeds: acc.proceeds + coerce_amount(&r.proceeds),
            cost_basis: acc.cost_basis + coerce_amount(&r.cost_basis),
            adjustment: acc.adjustment + coerce_amount(&r.adjustment),
            gain_loss: acc.gain_loss + coerce_amount(&r.gain_loss),
        })
    }
}

/// Values of one page, addressed by template slot.
#[derive(Debug, Clone)]
pub struct PagePlan {
    /// 1-based, as used in field suffixes.
    pub number: usize,
    pub values: Vec<(Slot, FieldValue)>,
}

impl PagePlan {
    pub fn get(&self, slot: Slot) -> Option<&FieldValue> {
        self.values.iter().find(|(s, _)| *s == slot).map(|(_, v)| v)
    }
}

/// Everything needed to fill one section's document.
#[derive(Debug, Clone)]
pub struct FormPlan {
    pub doc: DocumentId,
    pub totals: Totals,
    pub pages: Vec<PagePlan>,
}

impl FormPlan {
    /// Field values of one page under their final, suffixed names.
    pub fn qualified_values(&self, page: &PagePlan) -> HashMap<String, FieldValue> {
        let term = self.doc.term();
        page.values
            .iter()
            .map(|(slot, value)| (qualify(&slot.base_name(term), self.doc, page.number), value.clone()))
            .collect()
    }
}

/// Pages needed for `records` rows; a trailing page always exists.
pub fn page_count(records: usize) -> usize {
    1 + records / ROWS_PER_PAGE
}

/// Two-decimal rendering used for grid amounts and totals.
pub fn money(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

/// Records flattened row-major into the eight form columns.
pub fn grid(records: &[TradeRecord]) -> Vec<String> {
    records
        .iter()
        .flat_map(|r| {
            [
                r.description.clone(),
                r.date_acquired.clone(),
                r.date_disposed.clone(),
                money(coerce_amount(&r.proceeds)),
                money(coerce_amount(&r.cost_basis)),
                r.code.clone(),
                money(coerce_amount(&r.adjustment)),
                money(coerce_amount(&r.gain_loss)),
            ]
        })
        .collect()
}

/// Spread a section's records over as many pages as it needs.
pub fn plan(doc: DocumentId, records: &[TradeRecord], taxpayer: &Taxpayer) -> FormPlan {
    let totals = Totals::of(records);
    let cells = grid(records);
    let count = page_count(records.len());
    let coverage = match doc.coverage() {
        Coverage::Covered => (Slot::Check(0), FieldValue::Check("1".to_string())),
        Coverage::Noncovered => (Slot::Check(1), FieldValue::Check("2".to_string())),
    };

    let pages = (0..count)
        .map(|i| {
            let start = (i * FIELDS_PER_PAGE).min(cells.len());
            let end = ((i + 1) * FIELDS_PER_PAGE).min(cells.len());
            let mut values: Vec<(Slot, FieldValue)> = cells[start..end]
                .iter()
                .enumerate()
                .map(|(j, cell)| (Slot::Text(FIRST_GRID_FIELD + j as u32), FieldValue::text(cell.as_str())))
                .collect();

            values.push(coverage.clone());
            values.push((NAME_FIELD, FieldValue::text(taxpayer.name.as_str())));
            values.push((TIN_FIELD, FieldValue::text(taxpayer.tin.as_str())));

            if i + 1 == count {
                values.push((PROCEEDS_TOTAL, FieldValue::text(money(totals.proceeds))));
                values.push((COST_TOTAL, FieldValue::text(money(totals.cost_basis))));
                values.push((ADJUSTMENT_TOTAL, FieldValue::text(money(totals.adjustment))));
                values.push((GAIN_TOTAL, FieldValue::text(money(totals.gain_loss))));
            }

            PagePlan { number: i + 1, values }
        })
        .collect();

    FormPlan {
        doc,
        totals,
        pages,
    }
}

// ── Tests ──
