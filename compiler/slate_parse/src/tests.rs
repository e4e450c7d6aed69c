use pretty_assertions::assert_eq;
use slate_ir::{BinaryOp, ExprKind, Intrinsic, Node, Program};

use super::*;

fn parse_ok(source: &str) -> Program {
    parse(source).unwrap_or_else(|e| panic!("failed to parse {source:?}: {e}"))
}

fn parse_err(source: &str) -> ParseError {
    match parse(source) {
        Ok(program) => panic!("expected error for {source:?}, got {program:?}"),
        Err(e) => e,
    }
}

#[test]
fn plain_text_is_one_node() {
    let program = parse_ok("hello world");
    assert_eq!(program.nodes, vec![Node::Text("hello world".into())]);
}

#[test]
fn echo_between_text() {
    let program = parse_ok("a<% echo 1 + 2; %>b");
    assert_eq!(program.nodes.len(), 3);
    let Node::Echo { expr, .. } = &program.nodes[1] else {
        panic!("expected echo, got {:?}", program.nodes[1]);
    };
    assert!(matches!(
        program.arena.get(*expr).kind,
        ExprKind::Binary {
            op: BinaryOp::Add,
            ..
        }
    ));
}

#[test]
fn line_break_after_close_tag_is_swallowed() {
    let program = parse_ok("<% $x = 1; %>\nnext\r\n<% echo $x; %>\r\nend");
    assert_eq!(program.nodes[1], Node::Text("next\r\n".into()));
    assert_eq!(program.nodes[3], Node::Text("end".into()));
}

#[test]
fn if_elseif_else_nests() {
    let program = parse_ok(
        "<% if ($a): %>A<% elseif ($b): %>B<% else: %>C<% endif; %>",
    );
    assert_eq!(program.nodes.len(), 1);
    let Node::If {
        branches,
        otherwise,
    } = &program.nodes[0]
    else {
        panic!("expected if");
    };
    assert_eq!(branches.len(), 2);
    assert_eq!(branches[0].body, vec![Node::Text("A".into())]);
    assert_eq!(branches[1].body, vec![Node::Text("B".into())]);
    assert_eq!(otherwise.as_deref(), Some(&[Node::Text("C".into())][..]));
}

#[test]
fn foreach_with_key_and_value() {
    let program = parse_ok("<% foreach($items as $k => $v): %>x<% endforeach; %>");
    let Node::Foreach {
        key, value, body, ..
    } = &program.nodes[0]
    else {
        panic!("expected foreach");
    };
    assert_eq!(key.as_deref(), Some("k"));
    assert_eq!(value, "v");
    assert_eq!(body, &vec![Node::Text("x".into())]);
}

#[test]
fn for_clauses_may_be_empty() {
    let program = parse_ok("<% for ($i = 0; $i < 3; $i++): %>.<% endfor; %><% for (;;): %><% endfor; %>");
    let Node::For {
        init,
        condition,
        step,
        ..
    } = &program.nodes[0]
    else {
        panic!("expected for");
    };
    assert_eq!((init.len(), condition.len(), step.len()), (1, 1, 1));
    assert!(matches!(&program.nodes[1], Node::For { init, .. } if init.is_empty()));
}

#[test]
fn multiple_statements_in_one_block() {
    let program = parse_ok("<% $a = 1; $b = 2; echo $a, $b %>");
    assert_eq!(program.nodes.len(), 4);
    assert!(matches!(program.nodes[2], Node::Echo { .. }));
    assert!(matches!(program.nodes[3], Node::Echo { .. }));
}

#[test]
fn intrinsics_are_resolved() {
    let program = parse_ok("<% echo __yield(__section_end()); %>");
    let Node::Echo { expr, .. } = &program.nodes[0] else {
        panic!("expected echo");
    };
    let ExprKind::Intrinsic { intrinsic, args } = &program.arena.get(*expr).kind else {
        panic!("expected intrinsic");
    };
    assert_eq!(*intrinsic, Intrinsic::Yield);
    assert!(matches!(
        program.arena.get(args[0]).kind,
        ExprKind::Intrinsic {
            intrinsic: Intrinsic::SectionEnd,
            ..
        }
    ));
}

#[test]
fn intrinsic_arity_is_checked() {
    let err = parse_err("<% echo __yield(); %>");
    assert!(matches!(
        err.kind,
        ParseErrorKind::IntrinsicArity {
            name: "__yield",
            found: 0,
            ..
        }
    ));
}

#[test]
fn precedence_mul_over_add_and_concat() {
    let program = parse_ok("<% echo 'n=' . 1 + 2 * 3; %>");
    let Node::Echo { expr, .. } = &program.nodes[0] else {
        panic!("expected echo");
    };
    let ExprKind::Binary { op, right, .. } = &program.arena.get(*expr).kind else {
        panic!("expected binary");
    };
    assert_eq!(*op, BinaryOp::Concat);
    assert!(matches!(
        program.arena.get(*right).kind,
        ExprKind::Binary {
            op: BinaryOp::Add,
            ..
        }
    ));
}

#[test]
fn array_literals_both_forms() {
    let program = parse_ok("<% $a = ['x' => 1, 2,]; $b = array(1, 2); %>");
    assert_eq!(program.nodes.len(), 2);
}

#[test]
fn unterminated_block_reports_line() {
    let err = parse_err("line one\nline two <% echo 1;");
    assert_eq!(err.kind, ParseErrorKind::UnterminatedBlock);
    assert_eq!(err.line, 2);
}

#[test]
fn unclosed_if_is_error() {
    let err = parse_err("<% if ($a): %>body");
    assert_eq!(err.kind, ParseErrorKind::UnclosedBlock { construct: "if" });
}

#[test]
fn stray_closer_is_error() {
    let err = parse_err("text<% endforeach; %>");
    assert_eq!(
        err.kind,
        ParseErrorKind::UnmatchedClose {
            found: "endforeach",
            opener: "foreach"
        }
    );
}

#[test]
fn crossed_blocks_report_inner_construct() {
    let err = parse_err("<% if ($a): %><% foreach ($b as $c): %><% endif; %>");
    assert_eq!(err.kind, ParseErrorKind::UnclosedBlock { construct: "foreach" });
}

#[test]
fn elseif_after_else_is_error() {
    let err = parse_err("<% if ($a): %><% else: %><% elseif ($b): %><% endif; %>");
    assert_eq!(err.kind, ParseErrorKind::AfterElse { found: "elseif" });
}

#[test]
fn assignment_to_literal_is_error() {
    let err = parse_err("<% 1 = 2; %>");
    assert_eq!(err.kind, ParseErrorKind::InvalidAssignTarget);
}

#[test]
fn missing_semicolon_between_statements() {
    let err = parse_err("<% echo 1 echo 2 %>");
    assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }));
}

#[test]
fn comments_inside_blocks_are_ignored() {
    let program = parse_ok("<% // just a note %>\n<% /* block */ %>\nafter");
    assert_eq!(program.nodes, vec![Node::Text("after".into())]);
}

#[test]
fn deeply_nested_parentheses() {
    let depth = 5_000;
    let source = format!("<% echo {}1{}; %>", "(".repeat(depth), ")".repeat(depth));
    let program = parse_ok(&source);
    assert_eq!(program.nodes.len(), 1);
}
