//! Constant folding for enum initializers.
//!
//! Arithmetic follows IEEE-754 doubles; bitwise operators truncate their
//! operands to 32-bit integers first, like the JavaScript operators do.

use crate::ast::{BinaryOp, Expr, ExprKind, UnaryOp};

/// ECMAScript `ToInt32`.
pub fn to_int32(value: f64) -> i32 {
    to_uint32(value) as i32
}

/// ECMAScript `ToUint32`.
pub fn to_uint32(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    value.trunc().rem_euclid(4_294_967_296.0) as u32
}

/// `base ** exponent` with the JavaScript special cases that differ from
/// C `pow`.
fn js_pow(base: f64, exponent: f64) -> f64 {
    if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
        return f64::NAN;
    }
    base.powf(exponent)
}

/// Fold `expr` bottom-up, replacing every foldable subtree with its literal
/// value.
pub fn fold(expr: &mut Expr) {
    match &mut expr.kind {
        ExprKind::Unary { arg, .. } => fold(arg),
        ExprKind::Binary { op, left, right } if !op.is_assign() && *op != BinaryOp::Comma => {
            fold(left);
            fold(right);
        }
        _ => return,
    }
    if let Some(kind) = fold_node(&expr.kind) {
        expr.kind = kind;
    }
}

fn fold_node(kind: &ExprKind) -> Option<ExprKind> {
    match kind {
        ExprKind::Unary { op, arg } => {
            let ExprKind::Number(value) = arg.kind else {
                return None;
            };
            let result = match op {
                UnaryOp::Pos => value,
                UnaryOp::Neg => -value,
                UnaryOp::Cpl => f64::from(!to_int32(value)),
                _ => return None,
            };
            Some(ExprKind::Number(result))
        }
        ExprKind::Binary { op, left, right } => fold_binary(*op, &left.kind, &right.kind),
        _ => None,
    }
}

/// Fold one binary operator applied to two literals.
pub fn fold_binary(op: BinaryOp, left: &ExprKind, right: &ExprKind) -> Option<ExprKind> {
    match (left, right) {
        (ExprKind::Number(a), ExprKind::Number(b)) => {
            fold_numbers(op, *a, *b).map(ExprKind::Number)
        }
        (ExprKind::String(a), ExprKind::String(b)) if op == BinaryOp::Add => {
            Some(ExprKind::String(format!("{a}{b}")))
        }
        (ExprKind::String(a), ExprKind::Number(b)) if op == BinaryOp::Add => {
            Some(ExprKind::String(format!("{a}{}", number_to_string(*b))))
        }
        (ExprKind::Number(a), ExprKind::String(b)) if op == BinaryOp::Add => {
            Some(ExprKind::String(format!("{}{b}", number_to_string(*a))))
        }
        _ => None,
    }
}

fn fold_numbers(op: BinaryOp, a: f64, b: f64) -> Option<f64> {
    let shift = to_uint32(b) & 31;
    let value = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Rem => a % b,
        BinaryOp::Pow => js_pow(a, b),
        BinaryOp::Shl => f64::from(to_int32(a).wrapping_shl(shift)),
        BinaryOp::Shr => f64::from(to_int32(a).wrapping_shr(shift)),
        BinaryOp::UShr => f64::from(to_uint32(a).wrapping_shr(shift)),
        BinaryOp::BitwiseAnd => f64::from(to_int32(a) & to_int32(b)),
        BinaryOp::BitwiseOr => f64::from(to_int32(a) | to_int32(b)),
        BinaryOp::BitwiseXor => f64::from(to_int32(a) ^ to_int32(b)),
        _ => return None,
    };
    Some(value)
}

/// ECMAScript `Number::toString` for radix 10.
pub fn number_to_string(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-Infinity" } else { "Infinity" }.to_string();
    }
    if value < 0.0 {
        return format!("-{}", number_to_string(-value));
    }

    // Shortest round-trip digits "d.ddde[-]x"
    let sci = format!("{value:e}");
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let k = digits.len() as i32;
    let n = exponent + 1;

    if k <= n && n <= 21 {
        let mut out = digits;
        out.extend(std::iter::repeat('0').take((n - k) as usize));
        out
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{int}.{frac}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", "0".repeat((-n) as usize))
    } else {
        let sign = if n - 1 < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{first}e{sign}{}", (n - 1).abs())
        } else {
            format!("{first}.{rest}e{sign}{}", (n - 1).abs())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    fn num(value: f64) -> Expr {
        Expr::new(ExprKind::Number(value), Span::empty(0))
    }

    fn eval(op: BinaryOp, a: f64, b: f64) -> f64 {
        let mut expr = Expr::binary(op, num(a), num(b));
        fold(&mut expr);
        match expr.kind {
            ExprKind::Number(value) => value,
            other => panic!("not folded: {other:?}"),
        }
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval(BinaryOp::Add, 1.0, 2.0), 3.0);
        assert_eq!(eval(BinaryOp::Div, 1.0, 0.0), f64::INFINITY);
        assert_eq!(eval(BinaryOp::Div, -1.0, 0.0), f64::NEG_INFINITY);
        assert!(eval(BinaryOp::Div, 0.0, 0.0).is_nan());
        assert_eq!(eval(BinaryOp::Rem, -123.0, 100.0), -23.0);
        assert_eq!(number_to_string(eval(BinaryOp::Pow, 2.25, -3.0)), "0.0877914951989026");
        assert!(eval(BinaryOp::Pow, 1.0, f64::NAN).is_nan());
    }

    #[test]
    fn test_bitwise_uses_int32() {
        assert_eq!(eval(BinaryOp::Shl, 987654321.0, 34.0), -344350012.0);
        assert_eq!(eval(BinaryOp::Shr, -16.0, 2.0), -4.0);
        assert_eq!(eval(BinaryOp::UShr, -1.0, 0.0), 4294967295.0);
        assert_eq!(eval(BinaryOp::BitwiseOr, 4294967296.5, 1.0), 1.0);
        assert_eq!(eval(BinaryOp::BitwiseAnd, f64::NAN, 7.0), 0.0);
        assert_eq!(eval(BinaryOp::BitwiseXor, 5.0, 3.0), 6.0);
    }

    #[test]
    fn test_nested_and_unary() {
        // -(1 << 3) | ~0
        let shl = Expr::binary(BinaryOp::Shl, num(1.0), num(3.0));
        let neg = Expr::new(
            ExprKind::Unary {
                op: UnaryOp::Neg,
                arg: Box::new(shl),
            },
            Span::empty(0),
        );
        let cpl = Expr::new(
            ExprKind::Unary {
                op: UnaryOp::Cpl,
                arg: Box::new(num(0.0)),
            },
            Span::empty(0),
        );
        let mut expr = Expr::binary(BinaryOp::BitwiseOr, neg, cpl);
        fold(&mut expr);
        assert_eq!(expr.kind, ExprKind::Number(-1.0));
    }

    #[test]
    fn test_strings() {
        let a = Expr::new(ExprKind::String("a".into()), Span::empty(0));
        let mut expr = Expr::binary(BinaryOp::Add, a, num(1.5));
        fold(&mut expr);
        assert_eq!(expr.kind, ExprKind::String("a1.5".into()));

        let b = Expr::new(ExprKind::String("b".into()), Span::empty(0));
        let mut expr = Expr::binary(BinaryOp::Sub, b, num(1.0));
        fold(&mut expr);
        assert!(matches!(expr.kind, ExprKind::Binary { .. }));
    }

    #[test]
    fn test_unfoldable_operand_is_kept() {
        let ident = Expr::new(
            ExprKind::Ident(crate::ast::Ident {
                name: "x".into(),
                symbol: None,
            }),
            Span::empty(0),
        );
        let product = Expr::binary(BinaryOp::Mul, num(2.0), num(3.0));
        let mut expr = Expr::binary(BinaryOp::Add, ident, product);
        fold(&mut expr);
        let ExprKind::Binary { right, .. } = expr.kind else {
            panic!("expected binary");
        };
        assert_eq!(right.kind, ExprKind::Number(6.0));
    }

    #[test]
    fn test_number_to_string() {
        assert_eq!(number_to_string(0.0), "0");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(123.0), "123");
        assert_eq!(number_to_string(-1.5), "-1.5");
        assert_eq!(number_to_string(0.1), "0.1");
        assert_eq!(number_to_string(1e21), "1e+21");
        assert_eq!(number_to_string(1e20), "100000000000000000000");
        assert_eq!(number_to_string(1.5e-7), "1.5e-7");
        assert_eq!(number_to_string(0.000001), "0.000001");
        assert_eq!(number_to_string(4294967295.0), "4294967295");
    }
}
