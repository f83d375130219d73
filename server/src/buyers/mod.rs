//! Buyer records module.
//!
//! Buyers are purchasers recorded for the purpose of granting member access;
//! the normalized email is the sole identity key. Records arrive through the
//! sync webhook, admin manual entry, or CSV import, and members never mutate
//! them.

pub mod csv;
pub(crate) mod handlers;
mod queries;
mod router;
mod types;

pub use csv::{buyers_to_csv, parse_buyers_csv, CsvParseOutcome, RowError};
pub use queries::*;
pub use router::admin_router;
pub use types::*;
