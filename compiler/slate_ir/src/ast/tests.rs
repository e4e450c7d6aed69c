use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_arena_alloc_and_get() {
    let mut arena = ExprArena::new();
    let a = arena.alloc(Expr::new(ExprKind::Int(1), Span::new(0, 1)));
    let b = arena.alloc(Expr::new(ExprKind::Var("x".into()), Span::new(4, 6)));
    assert_eq!(a.index(), 0);
    assert_eq!(b.index(), 1);
    assert_eq!(arena.get(b).kind, ExprKind::Var("x".into()));
    assert_eq!(arena.len(), 2);
}

#[test]
fn test_expr_id_debug() {
    assert_eq!(format!("{:?}", ExprId::new(3)), "#3");
}

#[test]
fn test_precedence_ordering() {
    assert!(BinaryOp::Mul.precedence() > BinaryOp::Add.precedence());
    assert!(BinaryOp::Add.precedence() > BinaryOp::Concat.precedence());
    assert!(BinaryOp::Concat.precedence() > BinaryOp::Gt.precedence());
    assert!(BinaryOp::Gt.precedence() > BinaryOp::Eq.precedence());
    assert!(BinaryOp::And.precedence() > BinaryOp::Or.precedence());
    assert!(BinaryOp::Or.precedence() > BinaryOp::Coalesce.precedence());
}

#[test]
fn test_intrinsic_names_round_trip() {
    for intrinsic in [
        Intrinsic::Include,
        Intrinsic::Yield,
        Intrinsic::SectionStart,
        Intrinsic::SectionEnd,
    ] {
        assert_eq!(Intrinsic::from_name(intrinsic.name()), Some(intrinsic));
    }
    assert_eq!(Intrinsic::from_name("count"), None);
}

#[test]
fn test_compound_assign_desugars() {
    assert_eq!(AssignOp::Assign.binary(), None);
    assert_eq!(AssignOp::Concat.binary(), Some(BinaryOp::Concat));
}

#[test]
fn test_node_count_includes_nested_bodies() {
    let mut arena = ExprArena::new();
    let cond = arena.alloc(Expr::new(ExprKind::Bool(true), Span::DUMMY));
    let program = Program::new(
        arena,
        vec![
            Node::Text("a".into()),
            Node::If {
                branches: vec![Branch {
                    condition: cond,
                    body: vec![Node::Text("b".into())],
                }],
                otherwise: Some(vec![Node::Text("c".into())]),
            },
        ],
    );
    assert_eq!(program.node_count(), 4);
}
