//! pretty.rs — Dump arborescent de l'AST (`neon ast`)
//!
//! Une ligne par nœud, indentation de deux espaces par niveau :
//! ```text
//! Func main(): int
//!   Print
//!     Binary +
//!       Literal 1
//!       Literal 2
//! ```

use std::fmt::Write as _;

use crate::ast::{Expr, ExprKind, Lit, Program, Stmt, StmtKind};

pub fn dump(program: &Program) -> String {
    let mut out = String::new();
    for s in &program.stmts {
        stmt(&mut out, s, 0);
    }
    out
}

fn line(out: &mut String, depth: usize, text: &str) {
    let _ = writeln!(out, "{}{text}", "  ".repeat(depth));
}

fn stmt(out: &mut String, s: &Stmt, depth: usize) {
    match &s.kind {
        StmtKind::Expr(e) => {
            line(out, depth, "Expr");
            expr(out, e, depth + 1);
        }
        StmtKind::Print(e) => {
            line(out, depth, "Print");
            expr(out, e, depth + 1);
        }
        StmtKind::Return(value) => {
            line(out, depth, "Return");
            if let Some(e) = value {
                expr(out, e, depth + 1);
            }
        }
        StmtKind::Func { name, params, ret, body } => {
            let params: Vec<String> = params.iter().map(|p| format!("{}: {}", p.name, p.ty)).collect();
            let ret = ret.as_ref().map(|t| format!(": {t}")).unwrap_or_default();
            line(out, depth, &format!("Func {name}({}){ret}", params.join(", ")));
            for s in body {
                stmt(out, s, depth + 1);
            }
        }
        StmtKind::Declare { name, ty, value } => {
            match ty {
                Some(t) => line(out, depth, &format!("Declare {name}: {t}")),
                None => line(out, depth, &format!("Declare {name} :=")),
            }
            expr(out, value, depth + 1);
        }
        StmtKind::Assign { name, value } => {
            line(out, depth, &format!("Assign {name}"));
            expr(out, value, depth + 1);
        }
        StmtKind::Block(body) => {
            line(out, depth, "Block");
            for s in body {
                stmt(out, s, depth + 1);
            }
        }
    }
}

fn expr(out: &mut String, e: &Expr, depth: usize) {
    match &e.kind {
        ExprKind::Literal(lit) => {
            let text = match lit {
                Lit::Int(n) => n.to_string(),
                Lit::Float(x) => format!("{x:?}"),
                Lit::Str(s) => format!("\"{s}\""),
                Lit::Bool(b) => b.to_string(),
            };
            line(out, depth, &format!("Literal {text}"));
        }
        ExprKind::Variable(name) => line(out, depth, &format!("Variable {name}")),
        ExprKind::Unary { op, right } => {
            line(out, depth, &format!("Unary {}", op.symbol()));
            expr(out, right, depth + 1);
        }
        ExprKind::Binary { op, left, right } => {
            line(out, depth, &format!("Binary {}", op.symbol()));
            expr(out, left, depth + 1);
            expr(out, right, depth + 1);
        }
        ExprKind::Group(inner) => {
            line(out, depth, "Group");
            expr(out, inner, depth + 1);
        }
        ExprKind::Array(items) => {
            line(out, depth, "Array");
            for i in items {
                expr(out, i, depth + 1);
            }
        }
        ExprKind::Call { callee, args } => {
            line(out, depth, "Call");
            expr(out, callee, depth + 1);
            for a in args {
                expr(out, a, depth + 1);
            }
        }
        ExprKind::Index { array, index } => {
            line(out, depth, "Index");
            expr(out, array, depth + 1);
            expr(out, index, depth + 1);
        }
    }
}
