use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::classify::{lead_token, LeadToken};

static DESCRIPTION_NOISE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)/ Symbol:|\.000").unwrap());

/// Rows shorter than this are layout noise.
const MIN_TOKENS: usize = 6;

/// Stands in for the adjustment/code pair when a lot has no adjustment.
const NO_ADJUSTMENT: &str = "...";

/// One disposition row, in the column order of the intermediate table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    #[serde(rename = "Description of Property")]
    pub description: String,
    #[serde(rename = "Date Acquired")]
    pub date_acquired: String,
    #[serde(rename = "Date Disposed")]
    pub date_disposed: String,
    #[serde(rename = "Proceeds")]
    pub proceeds: String,
    #[serde(rename = "Cost Basis")]
    pub cost_basis: String,
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "Amount of Adjustment")]
    pub adjustment: String,
    #[serde(rename = "Gain/Loss")]
    pub gain_loss: String,
}

/// The carried-forward symbol line, scoped to one section scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolContext(String);

impl SymbolContext {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Positional reading of a date-led line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowShape<'a> {
    /// `disposed qty proceeds acquired basis adjustment code gain`
    Adjusted {
        head: RowHead<'a>,
        adjustment: &'a str,
        code: &'a str,
        gain_loss: &'a str,
    },
    /// `disposed qty proceeds acquired basis ... gain`
    Unadjusted { head: RowHead<'a>, gain_loss: &'a str },
    Unparseable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowHead<'a> {
    pub date_disposed: &'a str,
    pub quantity: &'a str,
    pub proceeds: &'a str,
    pub date_acquired: &'a str,
    pub cost_basis: &'a str,
}

impl<'a> RowShape<'a> {
    pub fn parse(tokens: &[&'a str]) -> Self {
        let &[date_disposed, quantity, proceeds, date_acquired, cost_basis, ref rest @ ..] = tokens else {
            return RowShape::Unparseable;
        };
        let head = RowHead {
            date_disposed,
            quantity,
            proceeds,
            date_acquired,
            cost_basis,
        };
        match *rest {
            [NO_ADJUSTMENT, gain_loss, ..] => RowShape::Unadjusted { head, gain_loss },
            [NO_ADJUSTMENT, ..] => RowShape::Unparseable,
            [adjustment, code, gain_loss, ..] => RowShape::Adjusted {
                head,
                adjustment,
                code,
                gain_loss,
            },
            _ => RowShape::Unparseable,
        }
    }
}

/// What one forwarded line does to the section's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Record(TradeRecord),
    /// Line becomes the new symbol context.
    Context(String),
    Dropped,
}

/// Turn one forwarded line into a record, a new context, or nothing.
pub fn build(line: &str, ctx: &SymbolContext) -> LineOutcome {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < MIN_TOKENS {
        return LineOutcome::Dropped;
    }

    if lead_token(line) == LeadToken::Text {
        return LineOutcome::Context(line.trim().to_string());
    }

    let (head, adjustment, code, gain_loss) = match RowShape::parse(&tokens) {
        RowShape::Adjusted {
            head,
            adjustment,
            code,
            gain_loss,
        } => (head, adjustment, code, gain_loss),
        RowShape::Unadjusted { head, gain_loss } => (head, "", "", gain_loss),
        RowShape::Unparseable => {
            debug!(line, "dropping short data row");
            return LineOutcome::Dropped;
        }
    };

    LineOutcome::Record(TradeRecord {
        description: clean_description(&format!("{} sh. {}", head.quantity, ctx.as_str())),
        date_acquired: head.date_acquired.to_string(),
        date_disposed: head.date_disposed.to_string(),
        proceeds: head.proceeds.to_string(),
        cost_basis: head.cost_basis.to_string(),
        code: code.to_string(),
        adjustment: adjustment.to_string(),
        gain_loss: gain_loss.to_string(),
    })
}

/// Records of one section, in line order, with a fresh symbol context.
pub fn build_all<'a, I>(lines: I) -> Vec<TradeRecord>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut ctx = SymbolContext::default();
    let mut records = Vec::new();
    for line in lines {
        match build(line, &ctx) {
            LineOutcome::Record(r) => records.push(r),
            LineOutcome::Context(symbol) => ctx = SymbolContext(symbol),
            LineOutcome::Dropped => {}
        }
    }
    records
}

/// Strip template residue ("/ Symbol:") and zero share decimals (".000"),
/// then trim the ends. The dot is matched literally, so whole-share counts
/// like `1000` survive untouched.
pub fn clean_description(text: &str) -> String {
    DESCRIPTION_NOISE_RE.replace_all(text, "").trim().to_string()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(s: &str) -> SymbolContext {
        SymbolContext(s.to_string())
    }

    #[test]
    fn short_line_is_dropped() {
        for line in ["", "01/02/2023 10 1000.00 01/01/2023 900.00", "Symbol: AAPL"] {
            assert_eq!(build(line, &ctx("AAPL")), LineOutcome::Dropped);
        }
    }

    #[test]
    fn text_line_becomes_context() {
        let line = "  APPLE INC. / CUSIP: 037833100 / Symbol: AAPL  ";
        assert_eq!(
            build(line, &ctx("old")),
            LineOutcome::Context("APPLE INC. / CUSIP: 037833100 / Symbol: AAPL".to_string())
        );
    }

    #[test]
    fn unadjusted_row() {
        let line = "01/02/2023 10 1000.00 01/01/2023 900.00 ... 100.00";
        let LineOutcome::Record(r) = build(line, &ctx("AAPL")) else {
            panic!("expected a record");
        };
        assert_eq!(r.description, "10 sh. AAPL");
        assert_eq!(r.date_disposed, "01/02/2023");
        assert_eq!(r.date_acquired, "01/01/2023");
        assert_eq!(r.proceeds, "1000.00");
        assert_eq!(r.cost_basis, "900.00");
        assert_eq!(r.adjustment, "");
        assert_eq!(r.code, "");
        assert_eq!(r.gain_loss, "100.00");
    }

    #[test]
    fn year_led_row_is_a_record() {
        let line = "45 10 1000.00 01/01/2023 900.00 ... 100.00 Sale";
        let LineOutcome::Record(r) = build(line, &ctx("AAPL")) else {
            panic!("expected a record");
        };
        assert_eq!(r.date_disposed, "45");
        assert_eq!(r.description, "10 sh. AAPL");
    }

    #[test]
    fn adjusted_row_is_verbatim() {
        let line = "03/15/2023 5.000 1,250.00 02/01/2023 1,300.00 50.00 W 0.00 Sale";
        let LineOutcome::Record(r) = build(line, &ctx("TSLA")) else {
            panic!("expected a record");
        };
        assert_eq!((r.adjustment.as_str(), r.code.as_str(), r.gain_loss.as_str()), ("50.00", "W", "0.00"));
        assert_eq!(r.description, "5 sh. TSLA");
    }

    #[test]
    fn missing_trailing_tokens_are_dropped() {
        assert_eq!(build("01/02/2023 10 1000.00 01/01/2023 900.00 ...", &ctx("X")), LineOutcome::Dropped);
        assert_eq!(build("01/02/2023 10 1000.00 01/01/2023 900.00 50.00 W", &ctx("X")), LineOutcome::Dropped);
    }

    #[test]
    fn row_shapes() {
        let full = ["d", "q", "p", "a", "b", "1.00", "W", "2.00"];
        assert!(matches!(RowShape::parse(&full), RowShape::Adjusted { code: "W", .. }));
        let short = ["d", "q", "p", "a", "b", "...", "2.00"];
        assert!(matches!(RowShape::parse(&short), RowShape::Unadjusted { gain_loss: "2.00", .. }));
        assert_eq!(RowShape::parse(&["d", "q", "p", "a", "b", "..."]), RowShape::Unparseable);
        assert_eq!(RowShape::parse(&["d", "q"]), RowShape::Unparseable);
    }

    #[test]
    fn description_cleanup() {
        assert_eq!(
            clean_description("10.000 sh. APPLE INC. / CUSIP: 037833100 / Symbol: AAPL"),
            "10 sh. APPLE INC. / CUSIP: 037833100  AAPL"
        );
        assert_eq!(clean_description("1 sh. X / symbol: Y"), "1 sh. X  Y");
        assert_eq!(clean_description("2.0001 sh. Z"), "21 sh. Z");
        assert_eq!(clean_description("1000 sh. X"), "1000 sh. X");
        assert_eq!(clean_description("  3 sh. Y  "), "3 sh. Y");
    }

    #[test]
    fn context_carries_and_resets_per_call() {
        let lines = [
            "01/02/2023 1 10.00 01/01/2023 9.00 ... 1.00",
            "MICROSOFT CORP COMMON STOCK / Symbol: MSFT",
            "01/02/2023 2 20.00 01/01/2023 18.00 ... 2.00",
            "01/03/2023 3 30.00 01/01/2023 27.00 ... 3.00",
        ];
        let records = build_all(lines);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].description, "1 sh.");
        assert_eq!(records[1].description, "2 sh. MICROSOFT CORP COMMON STOCK  MSFT");
        assert_eq!(records[2].description, "3 sh. MICROSOFT CORP COMMON STOCK  MSFT");
    }
}
