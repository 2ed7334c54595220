//! Logical value types and their text-format mnemonics.
//!
//! Callers describe operands with four logical types.  Each one maps onto a
//! single physical value type of the module text format:
//!
//! | Logical  | Physical |
//! |----------|----------|
//! | `int`    | `i32`    |
//! | `long`   | `i64`    |
//! | `float`  | `f32`    |
//! | `double` | `f64`    |
//!
//! Operator families that only exist for one class of types take
//! [`IntegerType`] or [`FloatType`] instead of [`ValueType`].

use serde::{Deserialize, Serialize};
use std::fmt;

// ══════════════════════════════════════════════════════════════════════════════
// ValueType
// ══════════════════════════════════════════════════════════════════════════════

/// One of the four logical numeric types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Int,
    Long,
    Float,
    Double,
}

impl ValueType {
    /// All logical types, in declaration order.
    pub const ALL: [ValueType; 4] = [Self::Int, Self::Long, Self::Float, Self::Double];

    /// Physical mnemonic (`i32`, `i64`, `f32`, `f64`).
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Int => "i32",
            Self::Long => "i64",
            Self::Float => "f32",
            Self::Double => "f64",
        }
    }

    /// Width of the physical type in bytes.
    pub const fn byte_width(self) -> u32 {
        match self {
            Self::Int | Self::Float => 4,
            Self::Long | Self::Double => 8,
        }
    }

    /// The integer classification, if this type is integer-like.
    pub const fn as_integer(self) -> Option<IntegerType> {
        match self {
            Self::Int => Some(IntegerType::Int),
            Self::Long => Some(IntegerType::Long),
            Self::Float | Self::Double => None,
        }
    }

    /// The float classification, if this type is float-like.
    pub const fn as_float(self) -> Option<FloatType> {
        match self {
            Self::Float => Some(FloatType::Float),
            Self::Double => Some(FloatType::Double),
            Self::Int | Self::Long => None,
        }
    }

    pub const fn is_integer(self) -> bool {
        self.as_integer().is_some()
    }

    pub const fn is_float(self) -> bool {
        self.as_float().is_some()
    }

    /// Instruction name for `op` on this type, e.g. `i32.add`.
    pub fn instr(self, op: &str) -> String {
        format!("{}.{op}", self.mnemonic())
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Classified types
// ══════════════════════════════════════════════════════════════════════════════

/// Integer-classified logical types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegerType {
    Int,
    Long,
}

/// Float-classified logical types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloatType {
    Float,
    Double,
}

impl From<IntegerType> for ValueType {
    fn from(ty: IntegerType) -> Self {
        match ty {
            IntegerType::Int => ValueType::Int,
            IntegerType::Long => ValueType::Long,
        }
    }
}

impl From<FloatType> for ValueType {
    fn from(ty: FloatType) -> Self {
        match ty {
            FloatType::Float => ValueType::Float,
            FloatType::Double => ValueType::Double,
        }
    }
}

impl IntegerType {
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Int => "i32",
            Self::Long => "i64",
        }
    }
}

impl FloatType {
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Float => "f32",
            Self::Double => "f64",
        }
    }
}

impl fmt::Display for IntegerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl fmt::Display for FloatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Reference types
// ══════════════════════════════════════════════════════════════════════════════

/// Element type of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefType {
    FuncRef,
    ExternRef,
}

impl RefType {
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::FuncRef => "funcref",
            Self::ExternRef => "externref",
        }
    }
}

impl fmt::Display for RefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Conversion tables
// ══════════════════════════════════════════════════════════════════════════════

/// Numeric conversion instruction for the ordered pair `(from, to)`.
///
/// Integer sources are read as signed, float-to-integer conversions truncate
/// with signed semantics.  Returns `None` for `from == to`: there is no
/// identity conversion.
pub const fn conversion(from: ValueType, to: ValueType) -> Option<&'static str> {
    use ValueType::*;
    match (from, to) {
        (Int, Long) => Some("i64.extend_i32_s"),
        (Int, Float) => Some("f32.convert_i32_s"),
        (Int, Double) => Some("f64.convert_i32_s"),

        (Long, Int) => Some("i32.wrap_i64"),
        (Long, Float) => Some("f32.convert_i64_s"),
        (Long, Double) => Some("f64.convert_i64_s"),

        (Float, Int) => Some("i32.trunc_f32_s"),
        (Float, Long) => Some("i64.trunc_f32_s"),
        (Float, Double) => Some("f64.promote_f32"),

        (Double, Int) => Some("i32.trunc_f64_s"),
        (Double, Long) => Some("i64.trunc_f64_s"),
        (Double, Float) => Some("f32.demote_f64"),

        (Int, Int) | (Long, Long) | (Float, Float) | (Double, Double) => None,
    }
}

/// The type whose bit pattern has the same width as `ty` but the other
/// classification (`i32` ↔ `f32`, `i64` ↔ `f64`).
pub const fn reinterpret_target(ty: ValueType) -> ValueType {
    match ty {
        ValueType::Int => ValueType::Float,
        ValueType::Float => ValueType::Int,
        ValueType::Long => ValueType::Double,
        ValueType::Double => ValueType::Long,
    }
}

/// Bit-reinterpretation instruction reading a value of type `from`.
pub const fn reinterpretation(from: ValueType) -> &'static str {
    match from {
        ValueType::Int => "f32.reinterpret_i32",
        ValueType::Float => "i32.reinterpret_f32",
        ValueType::Long => "f64.reinterpret_i64",
        ValueType::Double => "i64.reinterpret_f64",
    }
}
