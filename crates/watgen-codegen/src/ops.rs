//! Numeric operations: arithmetic, comparison, bitwise, float and
//! conversion instructions.
//!
//! Each one is a single node whose header is the typed mnemonic and whose
//! children are the operands, in order.

use watgen_types::ty::{self, FloatType, IntegerType, ValueType};

use crate::generator::Generator;
use crate::node::Node;

fn unary(mnemonic: String, value: Node) -> Node {
    Node::group([mnemonic], vec![value])
}

fn binary(mnemonic: String, left: Node, right: Node) -> Node {
    Node::group([mnemonic], vec![left, right])
}

/// `<ty>.<op>_s` for integers, `<ty>.<op>` for floats.
fn signed(ty: ValueType, op: &str) -> String {
    if ty.is_integer() {
        ty.instr(&format!("{op}_s"))
    } else {
        ty.instr(op)
    }
}

fn int(ty: IntegerType, op: &str) -> String {
    format!("{}.{op}", ty.mnemonic())
}

fn float(ty: FloatType, op: &str) -> String {
    format!("{}.{op}", ty.mnemonic())
}

impl Generator {
    // ── Arithmetic ───────────────────────────────────────────────────────

    pub fn add(&self, ty: ValueType, left: Node, right: Node) -> Node {
        binary(ty.instr("add"), left, right)
    }

    pub fn subtract(&self, ty: ValueType, left: Node, right: Node) -> Node {
        binary(ty.instr("sub"), left, right)
    }

    pub fn multiply(&self, ty: ValueType, left: Node, right: Node) -> Node {
        binary(ty.instr("mul"), left, right)
    }

    /// Signed division for integers, plain division for floats.
    pub fn divide(&self, ty: ValueType, left: Node, right: Node) -> Node {
        binary(signed(ty, "div"), left, right)
    }

    pub fn divide_unsigned(&self, ty: IntegerType, left: Node, right: Node) -> Node {
        binary(int(ty, "div_u"), left, right)
    }

    /// Signed remainder.
    pub fn modulo(&self, ty: IntegerType, left: Node, right: Node) -> Node {
        binary(int(ty, "rem_s"), left, right)
    }

    pub fn modulo_unsigned(&self, ty: IntegerType, left: Node, right: Node) -> Node {
        binary(int(ty, "rem_u"), left, right)
    }

    // ── Comparison ───────────────────────────────────────────────────────

    pub fn less_than(&self, ty: ValueType, left: Node, right: Node) -> Node {
        binary(signed(ty, "lt"), left, right)
    }

    pub fn greater_than(&self, ty: ValueType, left: Node, right: Node) -> Node {
        binary(signed(ty, "gt"), left, right)
    }

    pub fn less_than_or_equal_to(&self, ty: ValueType, left: Node, right: Node) -> Node {
        binary(signed(ty, "le"), left, right)
    }

    pub fn greater_than_or_equal_to(&self, ty: ValueType, left: Node, right: Node) -> Node {
        binary(signed(ty, "ge"), left, right)
    }

    pub fn less_than_unsigned(&self, ty: IntegerType, left: Node, right: Node) -> Node {
        binary(int(ty, "lt_u"), left, right)
    }

    pub fn greater_than_unsigned(&self, ty: IntegerType, left: Node, right: Node) -> Node {
        binary(int(ty, "gt_u"), left, right)
    }

    pub fn less_than_or_equal_to_unsigned(&self, ty: IntegerType, left: Node, right: Node) -> Node {
        binary(int(ty, "le_u"), left, right)
    }

    pub fn greater_than_or_equal_to_unsigned(&self, ty: IntegerType, left: Node, right: Node) -> Node {
        binary(int(ty, "ge_u"), left, right)
    }

    pub fn equal_to(&self, ty: ValueType, left: Node, right: Node) -> Node {
        binary(ty.instr("eq"), left, right)
    }

    pub fn not_equal_to(&self, ty: ValueType, left: Node, right: Node) -> Node {
        binary(ty.instr("ne"), left, right)
    }

    // ── Integer / bitwise ────────────────────────────────────────────────

    /// Logical not: 1 if the value is zero, else 0 (`eqz`).
    pub fn not(&self, ty: IntegerType, value: Node) -> Node {
        unary(int(ty, "eqz"), value)
    }

    pub fn and(&self, ty: IntegerType, left: Node, right: Node) -> Node {
        binary(int(ty, "and"), left, right)
    }

    pub fn or(&self, ty: IntegerType, left: Node, right: Node) -> Node {
        binary(int(ty, "or"), left, right)
    }

    pub fn xor(&self, ty: IntegerType, left: Node, right: Node) -> Node {
        binary(int(ty, "xor"), left, right)
    }

    pub fn left_shift(&self, ty: IntegerType, left: Node, right: Node) -> Node {
        binary(int(ty, "shl"), left, right)
    }

    /// Arithmetic (sign-propagating) right shift.
    pub fn right_shift(&self, ty: IntegerType, left: Node, right: Node) -> Node {
        binary(int(ty, "shr_s"), left, right)
    }

    /// Logical (zero-filling) right shift.
    pub fn right_unsigned_shift(&self, ty: IntegerType, left: Node, right: Node) -> Node {
        binary(int(ty, "shr_u"), left, right)
    }

    pub fn left_rotate(&self, ty: IntegerType, left: Node, right: Node) -> Node {
        binary(int(ty, "rotl"), left, right)
    }

    pub fn right_rotate(&self, ty: IntegerType, left: Node, right: Node) -> Node {
        binary(int(ty, "rotr"), left, right)
    }

    pub fn count_leading_zeros(&self, ty: IntegerType, value: Node) -> Node {
        unary(int(ty, "clz"), value)
    }

    pub fn count_trailing_zeros(&self, ty: IntegerType, value: Node) -> Node {
        unary(int(ty, "ctz"), value)
    }

    pub fn count_ones(&self, ty: IntegerType, value: Node) -> Node {
        unary(int(ty, "popcnt"), value)
    }

    // ── Float ────────────────────────────────────────────────────────────

    pub fn min(&self, ty: FloatType, a: Node, b: Node) -> Node {
        binary(float(ty, "min"), a, b)
    }

    pub fn max(&self, ty: FloatType, a: Node, b: Node) -> Node {
        binary(float(ty, "max"), a, b)
    }

    /// Magnitude of `a` with the sign of `b`.
    pub fn copy_sign(&self, ty: FloatType, a: Node, b: Node) -> Node {
        binary(float(ty, "copysign"), a, b)
    }

    pub fn floor(&self, ty: FloatType, value: Node) -> Node {
        unary(float(ty, "floor"), value)
    }

    pub fn ceil(&self, ty: FloatType, value: Node) -> Node {
        unary(float(ty, "ceil"), value)
    }

    /// Round to nearest, ties to even.
    pub fn round(&self, ty: FloatType, value: Node) -> Node {
        unary(float(ty, "nearest"), value)
    }

    pub fn truncate(&self, ty: FloatType, value: Node) -> Node {
        unary(float(ty, "trunc"), value)
    }

    pub fn absolute_value(&self, ty: FloatType, value: Node) -> Node {
        unary(float(ty, "abs"), value)
    }

    pub fn negate(&self, ty: FloatType, value: Node) -> Node {
        unary(float(ty, "neg"), value)
    }

    pub fn square_root(&self, ty: FloatType, value: Node) -> Node {
        unary(float(ty, "sqrt"), value)
    }

    // ── Conversion ───────────────────────────────────────────────────────

    /// Convert `value` from one logical type to another.
    ///
    /// Converting a type to itself needs no instruction, so the operand is
    /// returned unchanged.
    pub fn convert(&self, from: ValueType, to: ValueType, value: Node) -> Node {
        match ty::conversion(from, to) {
            Some(mnemonic) => unary(mnemonic.to_string(), value),
            None => value,
        }
    }

    /// Reinterpret the bits of `value` as the other type of the same width
    /// (`i32` ↔ `f32`, `i64` ↔ `f64`).
    pub fn reinterpret(&self, from: ValueType, value: Node) -> Node {
        unary(ty::reinterpretation(from).to_string(), value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use watgen_types::ValueType::{Int, Long};

    const F32: ValueType = ValueType::Float;
    const F64: ValueType = ValueType::Double;

    fn gen() -> Generator {
        Generator::new("out/test")
    }

    fn one(g: &Generator, ty: ValueType) -> Node {
        g.constant(ty, 1)
    }

    #[test]
    fn comparisons_are_signed_for_integers_only() {
        let g = gen();
        assert_eq!(g.less_than(Int, one(&g, Int), one(&g, Int)).head(), Some("i32.lt_s"));
        assert_eq!(g.greater_than(Long, one(&g, Long), one(&g, Long)).head(), Some("i64.gt_s"));
        assert_eq!(g.less_than_or_equal_to(F32, one(&g, F32), one(&g, F32)).head(), Some("f32.le"));
        assert_eq!(g.greater_than_or_equal_to(F64, one(&g, F64), one(&g, F64)).head(), Some("f64.ge"));
        assert_eq!(g.equal_to(Long, one(&g, Long), one(&g, Long)).head(), Some("i64.eq"));
        assert_eq!(g.not_equal_to(F64, one(&g, F64), one(&g, F64)).head(), Some("f64.ne"));
        assert_eq!(
            g.less_than_unsigned(IntegerType::Int, one(&g, Int), one(&g, Int)).head(),
            Some("i32.lt_u")
        );
        assert_eq!(
            g.greater_than_or_equal_to_unsigned(IntegerType::Long, one(&g, Long), one(&g, Long)).head(),
            Some("i64.ge_u")
        );
    }

    #[test]
    fn division_depends_on_classification() {
        let g = gen();
        assert_eq!(g.divide(Int, one(&g, Int), one(&g, Int)).head(), Some("i32.div_s"));
        assert_eq!(g.divide(F64, one(&g, F64), one(&g, F64)).head(), Some("f64.div"));
        assert_eq!(
            g.divide_unsigned(IntegerType::Long, one(&g, Long), one(&g, Long)).head(),
            Some("i64.div_u")
        );
        assert_eq!(g.modulo(IntegerType::Int, one(&g, Int), one(&g, Int)).head(), Some("i32.rem_s"));
        assert_eq!(
            g.modulo_unsigned(IntegerType::Int, one(&g, Int), one(&g, Int)).head(),
            Some("i32.rem_u")
        );
    }

    #[test]
    fn integer_ops_use_integer_mnemonics() {
        let g = gen();
        let a = || one(&g, Int);
        assert_eq!(g.right_shift(IntegerType::Int, a(), a()).head(), Some("i32.shr_s"));
        assert_eq!(g.right_unsigned_shift(IntegerType::Int, a(), a()).head(), Some("i32.shr_u"));
        assert_eq!(g.left_rotate(IntegerType::Int, a(), a()).head(), Some("i32.rotl"));
        assert_eq!(g.count_trailing_zeros(IntegerType::Int, a()).head(), Some("i32.ctz"));
        assert_eq!(g.count_leading_zeros(IntegerType::Int, a()).head(), Some("i32.clz"));
        assert_eq!(g.count_ones(IntegerType::Int, a()).head(), Some("i32.popcnt"));
        assert_eq!(g.not(IntegerType::Int, a()).head(), Some("i32.eqz"));
        assert_eq!(g.xor(IntegerType::Long, one(&g, Long), one(&g, Long)).head(), Some("i64.xor"));
    }

    #[test]
    fn float_unary_ops_take_one_operand() {
        let g = gen();
        let v = || one(&g, F64);
        for node in [
            g.floor(FloatType::Double, v()),
            g.ceil(FloatType::Double, v()),
            g.round(FloatType::Double, v()),
            g.truncate(FloatType::Double, v()),
            g.absolute_value(FloatType::Double, v()),
            g.negate(FloatType::Double, v()),
            g.square_root(FloatType::Double, v()),
        ] {
            assert_eq!(node.children().len(), 1);
        }
        assert_eq!(g.round(FloatType::Float, one(&g, F32)).head(), Some("f32.nearest"));
        assert_eq!(g.copy_sign(FloatType::Double, v(), v()).children().len(), 2);
        assert_eq!(g.max(FloatType::Float, one(&g, F32), one(&g, F32)).head(), Some("f32.max"));
    }

    #[test]
    fn convert_uses_the_pair_table() {
        let g = gen();
        let node = g.convert(Int, F32, one(&g, Int));
        assert_eq!(node.head(), Some("f32.convert_i32_s"));
        assert_eq!(node.children(), &[one(&g, Int)]);
        assert_eq!(g.convert(Int, Long, one(&g, Int)).head(), Some("i64.extend_i32_s"));
        assert_eq!(g.convert(F64, F32, one(&g, F64)).head(), Some("f32.demote_f64"));
    }

    #[test]
    fn identity_convert_returns_operand() {
        let g = gen();
        assert_eq!(g.convert(Long, Long, one(&g, Long)), one(&g, Long));
    }

    #[test]
    fn reinterpret_crosses_classification() {
        let g = gen();
        assert_eq!(g.reinterpret(F32, one(&g, F32)).head(), Some("i32.reinterpret_f32"));
        assert_eq!(g.reinterpret(Long, one(&g, Long)).head(), Some("f64.reinterpret_i64"));
    }
}
