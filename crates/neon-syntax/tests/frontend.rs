use indoc::indoc;
use neon_syntax::ast::{ExprKind, Lit};
use neon_syntax::{parse, parse_source, tokenize, StmtKind, TokenKind};
use pretty_assertions::assert_eq;

const HELLO: &str = indoc! {r#"
    func main() {
        greeting: string = "foo"
        string_add(greeting, "bar")
        println(greeting)
    }
"#};

#[test]
fn hello_program_goes_through_lexer_and_parser() {
    let tokens = tokenize(HELLO).unwrap();
    assert_eq!(tokens.first().map(|t| t.kind), Some(TokenKind::Func));
    assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));

    let prog = parse(tokens).unwrap();
    let Some(StmtKind::Func { body, ret, .. }) = prog.function("main").map(|s| &s.kind) else {
        panic!("main manquante");
    };
    assert!(ret.is_none());
    assert_eq!(body.len(), 3);

    let StmtKind::Expr(call) = &body[1].kind else { panic!("{:?}", body[1]) };
    let ExprKind::Call { callee, args } = &call.kind else { panic!("{call:?}") };
    assert_eq!(callee.as_variable(), Some("string_add"));
    assert_eq!(args[1].kind, ExprKind::Literal(Lit::Str("bar".into())));
}

#[test]
fn blank_lines_and_comments_only() {
    let prog = parse_source("\n// rien\n\n   \n").unwrap();
    assert!(prog.stmts.is_empty());
}

#[test]
fn error_render_points_at_fragment() {
    let err = parse_source("func main() {\n    x := (1 + 2\n}\n").unwrap_err();
    assert_eq!(err.msg, "unmatched parentheses");
    assert_eq!(err.line, 2);
    assert_eq!(err.render(false), "error: unmatched parentheses, line 2\n 2 |     x := (1 + 2\n   |                ^\n");
}

#[test]
fn nested_blocks() {
    let prog = parse_source("{\n  {\n    print 1\n  }\n}\n").unwrap();
    let StmtKind::Block(outer) = &prog.stmts[0].kind else { panic!() };
    let StmtKind::Block(inner) = &outer[0].kind else { panic!() };
    assert!(matches!(inner[0].kind, StmtKind::Print(_)));
}
