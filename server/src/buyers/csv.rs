//! CSV codec for buyer import/export.
//!
//! Schema: header row `email,name,product_title,access_type,amount,ref_id,purchased_at`
//! with the last four columns optional. Fields containing commas, quotes or
//! newlines are quoted, with embedded quotes doubled.
//!
//! Import default: a blank `access_type` falls back to `basic`. It is never
//! run through product classification; that rule belongs to webhook ingestion
//! only.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::access::AccessTier;
use crate::member::normalize_email;

use super::types::{Buyer, BuyerImport};

const HEADERS: [&str; 7] = [
    "email",
    "name",
    "product_title",
    "access_type",
    "amount",
    "ref_id",
    "purchased_at",
];

/// A rejected import row. Row numbers are 1-based file line numbers so the
/// admin can find the offending line; row 0 flags a file-level problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

/// An accepted row together with its file line number, so persistence
/// failures can still be reported against the source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    pub line: usize,
    pub buyer: BuyerImport,
}

/// Parse outcome: accepted rows plus per-row rejections. A bad row never
/// aborts the rest of the file.
#[derive(Debug, Default)]
pub struct CsvParseOutcome {
    pub rows: Vec<CsvRow>,
    pub errors: Vec<RowError>,
}

/// Serialize buyers to CSV for export.
#[must_use]
pub fn buyers_to_csv(buyers: &[Buyer]) -> String {
    let mut out = String::new();
    out.push_str(&HEADERS.join(","));

    for buyer in buyers {
        out.push('\n');
        let fields = [
            escape_field(&buyer.email),
            escape_field(&buyer.name),
            escape_field(&buyer.product_title),
            buyer.access_type.as_str().to_string(),
            escape_field(buyer.amount.as_deref().unwrap_or("")),
            escape_field(buyer.ref_id.as_deref().unwrap_or("")),
            buyer.purchased_at.to_rfc3339(),
        ];
        out.push_str(&fields.join(","));
    }

    out
}

/// Parse an uploaded CSV file into buyer import rows.
pub fn parse_buyers_csv(content: &str) -> CsvParseOutcome {
    let mut outcome = CsvParseOutcome::default();

    let lines: Vec<(usize, &str)> = content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty())
        .collect();

    if lines.len() < 2 {
        outcome.errors.push(RowError {
            row: 0,
            message: "CSV file is empty or has no data rows".into(),
        });
        return outcome;
    }

    let header_fields: Vec<String> = parse_line(lines[0].1)
        .into_iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    let column = |name: &str| header_fields.iter().position(|h| h == name);

    let (Some(email_idx), Some(name_idx), Some(product_idx)) =
        (column("email"), column("name"), column("product_title"))
    else {
        outcome.errors.push(RowError {
            row: 0,
            message: "Required headers: email, name, product_title".into(),
        });
        return outcome;
    };
    let access_idx = column("access_type");
    let amount_idx = column("amount");
    let ref_id_idx = column("ref_id");
    let purchased_idx = column("purchased_at");

    for (line_no, line) in &lines[1..] {
        let values = parse_line(line);
        let field = |idx: Option<usize>| -> Option<&str> {
            idx.and_then(|i| values.get(i))
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let email = field(Some(email_idx));
        let name = field(Some(name_idx));
        let product_title = field(Some(product_idx));

        let (Some(email), Some(name), Some(product_title)) = (email, name, product_title) else {
            outcome.errors.push(RowError {
                row: *line_no,
                message: "email, name and product_title are required".into(),
            });
            continue;
        };

        // Blank access_type defaults to basic; an unrecognized value rejects
        // the row rather than defaulting.
        let access_type = match field(access_idx) {
            None => AccessTier::Basic,
            Some(raw) => match AccessTier::parse(&raw.to_lowercase()) {
                Some(tier) => tier,
                None => {
                    let valid: Vec<&str> =
                        AccessTier::ALL.iter().map(|t| t.as_str()).collect();
                    outcome.errors.push(RowError {
                        row: *line_no,
                        message: format!(
                            "Invalid access_type '{raw}'. Must be one of: {}",
                            valid.join(", ")
                        ),
                    });
                    continue;
                }
            },
        };

        let purchased_at = match field(purchased_idx) {
            None => None,
            Some(raw) => match DateTime::parse_from_rfc3339(raw) {
                Ok(ts) => Some(ts.with_timezone(&Utc)),
                Err(_) => {
                    outcome.errors.push(RowError {
                        row: *line_no,
                        message: format!("Invalid purchased_at '{raw}', expected RFC 3339"),
                    });
                    continue;
                }
            },
        };

        outcome.rows.push(CsvRow {
            line: *line_no,
            buyer: BuyerImport {
                email: normalize_email(email),
                name: name.to_string(),
                product_title: product_title.to_string(),
                access_type,
                amount: field(amount_idx).map(str::to_string),
                ref_id: field(ref_id_idx).map(str::to_string),
                purchased_at,
            },
        });
    }

    outcome
}

fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Split one CSV line, honoring quoted fields with doubled-quote escapes.
fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }

    fields.push(current);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn buyer(email: &str, name: &str, product: &str, tier: AccessTier) -> Buyer {
        let now = Utc::now();
        Buyer {
            id: Uuid::new_v4(),
            email: email.into(),
            name: name.into(),
            product_title: product.into(),
            access_type: tier,
            amount: None,
            ref_id: None,
            purchased_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_export_escapes_special_fields() {
        let mut b = buyer("alice@x.com", "Alice \"Ace\" A", "Paket, Lengkap", AccessTier::Pro);
        b.amount = Some("150000".into());

        let csv = buyers_to_csv(&[b]);
        let mut lines = csv.lines();

        assert_eq!(
            lines.next().unwrap(),
            "email,name,product_title,access_type,amount,ref_id,purchased_at"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("alice@x.com,\"Alice \"\"Ace\"\" A\",\"Paket, Lengkap\",pro,150000,,"));
    }

    #[test]
    fn test_parse_happy_path() {
        let csv = "email,name,product_title,access_type\n\
                   alice@x.com,Alice,Kelas Dasar,pro\n\
                   bob@x.com,Bob,Kelas Dasar,mindcare";

        let outcome = parse_buyers_csv(csv);

        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.rows.len(), 2);
        assert_eq!(outcome.rows[0].buyer.access_type, AccessTier::Pro);
        assert_eq!(outcome.rows[1].buyer.access_type, AccessTier::Mindcare);
    }

    #[test]
    fn test_blank_access_type_defaults_to_basic_without_classification() {
        // "Pro Bundle" would classify as pro; import must NOT classify
        let csv = "email,name,product_title,access_type,amount,ref_id,purchased_at\n\
                   alice@x.com,Alice,Pro Bundle,,,,";

        let outcome = parse_buyers_csv(csv);

        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.rows[0].buyer.access_type, AccessTier::Basic);
    }

    #[test]
    fn test_unknown_access_type_rejects_row_with_line_number() {
        let csv = "email,name,product_title,access_type\n\
                   alice@x.com,Alice,Kelas,pro\n\
                   bob@x.com,Bob,Kelas,platinum";

        let outcome = parse_buyers_csv(csv);

        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].row, 3);
        assert!(outcome.errors[0].message.contains("platinum"));
        assert!(outcome.errors[0].message.contains("basic, pro, ebook, mindcare"));
    }

    #[test]
    fn test_missing_required_fields_rejects_row() {
        let csv = "email,name,product_title\n\
                   ,Alice,Kelas\n\
                   bob@x.com,Bob,Kelas";

        let outcome = parse_buyers_csv(csv);

        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].row, 2);
    }

    #[test]
    fn test_emails_are_normalized() {
        let csv = "email,name,product_title\n\
                   \" Alice@X.COM \",Alice,Kelas";

        let outcome = parse_buyers_csv(csv);

        assert_eq!(outcome.rows[0].buyer.email, "alice@x.com");
    }

    #[test]
    fn test_quoted_fields_with_commas_and_quotes() {
        let csv = "email,name,product_title\n\
                   alice@x.com,\"A, \"\"Ace\"\"\",\"Kelas, Lanjutan\"";

        let outcome = parse_buyers_csv(csv);

        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.rows[0].buyer.name, "A, \"Ace\"");
        assert_eq!(outcome.rows[0].buyer.product_title, "Kelas, Lanjutan");
    }

    #[test]
    fn test_headers_may_be_reordered() {
        let csv = "name,email,access_type,product_title\n\
                   Alice,alice@x.com,ebook,Paket";

        let outcome = parse_buyers_csv(csv);

        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.rows[0].buyer.access_type, AccessTier::Ebook);
    }

    #[test]
    fn test_missing_required_header_is_file_error() {
        let csv = "email,name\nalice@x.com,Alice";

        let outcome = parse_buyers_csv(csv);

        assert!(outcome.rows.is_empty());
        assert_eq!(outcome.errors[0].row, 0);
    }

    #[test]
    fn test_empty_file() {
        let outcome = parse_buyers_csv("");
        assert!(outcome.rows.is_empty());
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].row, 0);
    }

    #[test]
    fn test_invalid_purchased_at_rejects_row() {
        let csv = "email,name,product_title,purchased_at\n\
                   alice@x.com,Alice,Kelas,last tuesday";

        let outcome = parse_buyers_csv(csv);

        assert!(outcome.rows.is_empty());
        assert_eq!(outcome.errors[0].row, 2);
    }
}
