use pretty_assertions::assert_eq;

use crate::Span;

use super::*;

#[test]
fn arena_allocates_lists_contiguously() {
    let mut arena = TemplateArena::new();
    let name = arena.intern("x");
    let a = arena.alloc_expr(Expr::new(ExprKind::Ident(name), Span::new(0, 1)));
    let b = arena.alloc_expr(Expr::new(ExprKind::Int(2), Span::new(4, 5)));
    let first = arena.alloc_expr_list([a, b]);
    let second = arena.alloc_expr_list([b]);

    assert_eq!(arena.expr_list(first), &[a, b]);
    assert_eq!(arena.expr_list(second), &[b]);
    assert_eq!(arena.name(name), "x");
    assert_eq!(arena.expr(b).kind, ExprKind::Int(2));
}

#[test]
fn empty_ranges_slice_to_nothing() {
    let arena = TemplateArena::new();
    assert!(arena.stmt_list(StmtRange::EMPTY).is_empty());
    assert!(arena.name_list(NameRange::EMPTY).is_empty());
}

#[test]
fn operator_precedence_ordering() {
    assert!(BinaryOp::Mul.precedence() > BinaryOp::Add.precedence());
    assert!(BinaryOp::Add.precedence() > RANGE_PRECEDENCE);
    assert!(RANGE_PRECEDENCE > BinaryOp::Eq.precedence());
    assert!(BinaryOp::And.precedence() > BinaryOp::Or.precedence());
    assert!(UNARY_PRECEDENCE > BinaryOp::Mod.precedence());
}

#[test]
fn liquid_logical_spelling() {
    assert_eq!(BinaryOp::And.as_liquid_symbol(), "and");
    assert_eq!(BinaryOp::FloorDiv.as_liquid_symbol(), "//");
}

#[test]
fn terminators() {
    assert!(StmtKind::Break.is_terminator());
    assert!(StmtKind::Return(None).is_terminator());
    assert!(!StmtKind::Error.is_terminator());
}
