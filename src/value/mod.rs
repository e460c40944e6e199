//! Response values with optional date-time conversion
//!
//! `QbValue` mirrors `serde_json::Value` with one extra variant for
//! date-times. Responses are revived into it when date conversion is on;
//! request params are lowered back to plain JSON before sending, with
//! every date-time written as an ISO-8601 string.

mod dates;
mod types;

pub use dates::{format_datetime, is_iso_datetime, parse_datetime};
pub use types::QbValue;

#[cfg(test)]
mod tests;
