//! Conversion of text operands to the parameter types PostgreSQL infers.
//!
//! The compiler keeps every operand as the text the client sent. Binding
//! text to an `int4` or `timestamptz` parameter would fail on the wire, so
//! each operand is parsed into the Rust type that encodes as the inferred
//! parameter type. A `numeric` parameter is bound as an exact decimal.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgArguments;
use sqlx::Arguments;

use crate::error::{ExecuteError, Result};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// An operand converted to a bindable value.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    Bool(bool),
    Int2(i16),
    Int4(i32),
    Int8(i64),
    Float4(f32),
    Float8(f64),
    Numeric(Decimal),
    Text(String),
    Timestamptz(DateTime<Utc>),
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
    Json(serde_json::Value),
}

impl BoundValue {
    /// Appends the value to `args`.
    ///
    /// # Errors
    ///
    /// Returns [`sqlx::Error::Encode`] if the driver cannot encode it.
    pub fn add_to(self, args: &mut PgArguments) -> Result<()> {
        let added = match self {
            Self::Bool(v) => args.add(v),
            Self::Int2(v) => args.add(v),
            Self::Int4(v) => args.add(v),
            Self::Int8(v) => args.add(v),
            Self::Float4(v) => args.add(v),
            Self::Float8(v) => args.add(v),
            Self::Numeric(v) => args.add(v),
            Self::Text(v) => args.add(v),
            Self::Timestamptz(v) => args.add(v),
            Self::Timestamp(v) => args.add(v),
            Self::Date(v) => args.add(v),
            Self::Json(v) => args.add(v),
        };
        added.map_err(|e| ExecuteError::Database(sqlx::Error::Encode(e)))
    }
}

/// Converts the operand for placeholder `$index` to `type_name`.
///
/// Type names are matched case-insensitively, so both sqlx's `INT4` and
/// `pg_type.typname`'s `int4` are accepted.
///
/// # Errors
///
/// Returns [`ExecuteError::InvalidParameter`] if `text` does not parse as
/// the type, or [`ExecuteError::UnsupportedParameterType`] for a type with
/// no conversion.
pub fn coerce(index: usize, type_name: &str, text: &str) -> Result<BoundValue> {
    let invalid = || ExecuteError::InvalidParameter {
        index,
        type_name: type_name.to_string(),
        value: text.to_string(),
    };
    let value = match type_name.to_ascii_lowercase().as_str() {
        "bool" | "boolean" => BoundValue::Bool(parse_bool(text).ok_or_else(invalid)?),
        "int2" | "smallint" => BoundValue::Int2(text.trim().parse().map_err(|_| invalid())?),
        "int4" | "integer" | "int" => BoundValue::Int4(text.trim().parse().map_err(|_| invalid())?),
        "int8" | "bigint" => BoundValue::Int8(text.trim().parse().map_err(|_| invalid())?),
        "float4" | "real" => BoundValue::Float4(text.trim().parse().map_err(|_| invalid())?),
        "float8" | "double precision" => {
            BoundValue::Float8(text.trim().parse().map_err(|_| invalid())?)
        }
        "numeric" | "decimal" => BoundValue::Numeric(parse_decimal(text).ok_or_else(invalid)?),
        "text" | "varchar" | "character varying" | "bpchar" | "character" | "char" | "name"
        | "citext" | "unknown" => BoundValue::Text(text.to_string()),
        "timestamptz" | "timestamp with time zone" => {
            BoundValue::Timestamptz(parse_timestamptz(text).ok_or_else(invalid)?)
        }
        "timestamp" | "timestamp without time zone" => {
            BoundValue::Timestamp(parse_timestamp(text).ok_or_else(invalid)?)
        }
        "date" => BoundValue::Date(
            NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").map_err(|_| invalid())?,
        ),
        "json" | "jsonb" => BoundValue::Json(serde_json::from_str(text).map_err(|_| invalid())?),
        _ => {
            return Err(ExecuteError::UnsupportedParameterType {
                index,
                type_name: type_name.to_string(),
            })
        }
    };
    Ok(value)
}

/// Accepts the spellings PostgreSQL's boolean input function accepts.
fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "t" | "true" | "y" | "yes" | "on" | "1" => Some(true),
        "f" | "false" | "n" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Plain or scientific notation, without rounding.
fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    Decimal::from_str_exact(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// RFC 3339, or a zone-less timestamp taken as UTC.
fn parse_timestamptz(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| parse_naive(text).map(|dt| dt.and_utc()))
}

/// A zone-less timestamp; an offset, if given, is converted to UTC.
fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    parse_naive(text).or_else(|| {
        DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|dt| dt.naive_utc())
    })
}

/// Converts every operand and collects them into driver arguments.
///
/// # Errors
///
/// Returns the first conversion failure.
pub fn bind_all(type_names: &[String], operands: &[String]) -> Result<PgArguments> {
    let mut args = PgArguments::default();
    for (i, (type_name, text)) in type_names.iter().zip(operands).enumerate() {
        coerce(i + 1, type_name, text)?.add_to(&mut args)?;
    }
    Ok(args)
}
