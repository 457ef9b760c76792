//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! parsing of stored columns and the creation clock so every entity maps rows
//! the same way.

use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

static LAST_CREATION_MICROS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Parse a decimal stored in its canonical text form.
pub(crate) fn parse_decimal(value: &str, label: &str) -> ResultEngine<Decimal> {
    Decimal::from_str(value)
        .map_err(|_| EngineError::InvalidAmount(format!("invalid {label}: {value}")))
}

/// Exact sum of two decimals, or `None` when it has no exact representation.
///
/// `Decimal::checked_add` rounds away low digits once the sum needs more than
/// 28 significant digits. Here the addition is carried out on the widened
/// mantissas and only trailing zeros may be dropped to make it fit.
pub(crate) fn exact_add(lhs: Decimal, rhs: Decimal) -> Option<Decimal> {
    add_at_common_scale(lhs, rhs)
        .or_else(|| add_at_common_scale(lhs.normalize(), rhs.normalize()))
}

fn add_at_common_scale(lhs: Decimal, rhs: Decimal) -> Option<Decimal> {
    let common = lhs.scale().max(rhs.scale());
    let widen = |value: Decimal| {
        10i128
            .checked_pow(common - value.scale())
            .and_then(|factor| value.mantissa().checked_mul(factor))
    };
    let mut mantissa = widen(lhs)?.checked_add(widen(rhs)?)?;
    let mut scale = common;
    loop {
        if let Ok(sum) = Decimal::try_from_i128_with_scale(mantissa, scale) {
            return Some(sum);
        }
        if scale == 0 || mantissa % 10 != 0 {
            return None;
        }
        mantissa /= 10;
        scale -= 1;
    }
}

/// Creation timestamp for a new row.
///
/// Strictly increasing within the process at microsecond resolution, the
/// finest one Postgres `timestamptz` keeps, so the stamped value and the
/// stored one are the same on every backend. Pagination uses it as the
/// primary sort key and as the pinned window bound.
pub(crate) fn creation_now() -> DateTime<Utc> {
    let wall = Utc::now().timestamp_micros();
    let mut last = LAST_CREATION_MICROS.load(Ordering::Relaxed);
    loop {
        let next = wall.max(last.saturating_add(1));
        match LAST_CREATION_MICROS.compare_exchange_weak(
            last,
            next,
            Ordering::AcqRel,
            Ordering::Relaxed,
        ) {
            Ok(_) => return DateTime::from_timestamp_nanos(next.saturating_mul(1_000)),
            Err(actual) => last = actual,
        }
    }
}
