//! Purpose: Exact decimal storage for JSON number literals.
//! Exports: `Number`.
//! Role: Leaf payload of `Node::Number`; never routes through a float.
//! Invariants: `as_str` keeps the source mantissa verbatim (sign, digits, trailing zeros).
//! Invariants: Exponents are spelled canonically: lowercase `e` and an explicit sign (`1E5` -> `1e+5`).
//! Invariants: Integer views never expand a huge exponent; out-of-range scales answer without arithmetic.
//! Invariants: Equality is numeric (`1.0 == 1.00`), independent of the literal spelling.
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, ToPrimitive, Zero};

/// Decimal digits of `u64::MAX`; no `i64`/`u64` has more.
const MAX_MACHINE_DIGITS: i64 = 20;

#[derive(Clone, Debug)]
pub struct Number {
    literal: Box<str>,
    decimal: BigDecimal,
}

impl Number {
    /// Parses a JSON number literal. `None` when the exponent does not fit the
    /// decimal representation.
    pub(crate) fn from_literal(literal: &str) -> Option<Self> {
        let decimal = BigDecimal::from_str(literal).ok()?;
        Some(Self {
            literal: canonical_exponent(literal).into(),
            decimal,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.literal
    }

    pub fn as_decimal(&self) -> &BigDecimal {
        &self.decimal
    }

    pub fn is_integer(&self) -> bool {
        if self.decimal.is_zero() {
            return true;
        }
        let (_, scale) = self.decimal.as_bigint_and_scale();
        // More fractional places than digits leaves a nonzero fraction.
        if scale > 0 && scale.unsigned_abs() > self.decimal.digits() {
            return false;
        }
        self.decimal.is_integer()
    }

    pub fn as_i64(&self) -> Option<i64> {
        if !self.fits_machine_integer() {
            return None;
        }
        self.decimal.to_i64()
    }

    pub fn as_u64(&self) -> Option<u64> {
        if !self.fits_machine_integer() {
            return None;
        }
        self.decimal.to_u64()
    }

    /// Lossy on purpose; callers opt into float semantics explicitly.
    pub fn as_f64(&self) -> Option<f64> {
        self.decimal.to_f64()
    }

    fn fits_machine_integer(&self) -> bool {
        if !self.is_integer() {
            return false;
        }
        if self.decimal.is_zero() {
            return true;
        }
        let (_, scale) = self.decimal.as_bigint_and_scale();
        let digits = i64::try_from(self.decimal.digits()).unwrap_or(i64::MAX);
        digits.saturating_sub(scale) <= MAX_MACHINE_DIGITS
    }
}

/// Lowercases the exponent marker and makes its sign explicit, matching the
/// spelling the parser hands back.
fn canonical_exponent(literal: &str) -> Cow<'_, str> {
    let Some(marker) = literal.find(['e', 'E']) else {
        return Cow::Borrowed(literal);
    };
    let (mantissa, rest) = literal.split_at(marker);
    let exponent = &rest[1..];
    let signed = exponent.starts_with(['+', '-']);
    if rest.starts_with('e') && signed {
        return Cow::Borrowed(literal);
    }
    let sign = if signed { "" } else { "+" };
    Cow::Owned(format!("{mantissa}e{sign}{exponent}"))
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.decimal == other.decimal
    }
}

impl Eq for Number {}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal)
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        Self {
            literal: value.to_string().into(),
            decimal: BigDecimal::from(value),
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self {
            literal: value.to_string().into(),
            decimal: BigDecimal::from(value),
        }
    }
}
