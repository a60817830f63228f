use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Price value - uses Decimal for precision. Zero means "at market".
pub type Price = Decimal;

/// Share count. Signed so the same type carries positions (negative = short).
pub type Quantity = i64;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;
