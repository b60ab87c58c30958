//! emit_c.rs — Backend C
//!
//! Produit une unité de traduction C autonome :
//! ```text
//! PRELUDE (headers, println, string_add)
//! globales            static T x;
//! prototypes          T f(...);
//! neon_init()         initialisation des globales + code de premier niveau
//! fonctions           `main` devient `neon_main`
//! main(argc, argv)    neon_init(); neon_main(); statut borné à 0..=255
//! ```
//!
//! `string_add` alloue un nouveau tampon à chaque appel : la capacité
//! n'est jamais à la charge de l'appelant. `string_add(x, e)` en instruction,
//! avec `x` variable, devient `x = string_add(x, e);`.
//!
//! Le C produit se comporte comme l'interpréteur : promotion int → float,
//! comparaisons de chaînes par `strcmp`, division entière par zéro fatale
//! (`error: division by zero, line N`, statut 1), flottants affichés par
//! `print_float` au format de `neon_runtime::format_float`.
//!
//! Non supporté (→ `CompileError::Unsupported`) : tableaux, indexation,
//! fonctions imbriquées.

use std::collections::HashMap;
use std::fmt::Write as _;

use neon_runtime::ENTRY_SYMBOL;
use neon_syntax::ast::{BinOp, Expr, ExprKind, Lit, Param, Program, Stmt, StmtKind, Type, TypeMod, TypeName, UnOp};
use neon_syntax::Kind;

use crate::error::{CompileError, Result};

pub const PRELUDE: &str = r#"/* Généré par neon. Ne pas éditer. */
#include <inttypes.h>
#include <math.h>
#include <stdbool.h>
#include <stdint.h>
#include <stdio.h>
#include <stdlib.h>
#include <string.h>

static void println(const char *msg)
{
    fputs(msg, stdout);
    fputc('\n', stdout);
}

static char *string_add(const char *a, const char *b)
{
    size_t la = strlen(a);
    size_t lb = strlen(b);
    char *r = malloc(la + lb + 1);
    if (r == NULL) {
        fputs("neon: out of memory\n", stderr);
        exit(1);
    }
    memcpy(r, a, la);
    memcpy(r + la, b, lb + 1);
    return r;
}

static void neon_fail(const char *msg, int line)
{
    fflush(stdout);
    fprintf(stderr, "error: %s, line %d\n", msg, line);
    exit(1);
}

static int64_t neon_div(int64_t a, int64_t b, int line)
{
    if (b == 0) {
        neon_fail("division by zero", line);
    }
    if (b == -1 && a == INT64_MIN) {
        neon_fail("integer overflow", line);
    }
    return a / b;
}

static int64_t neon_mod(int64_t a, int64_t b, int line)
{
    if (b == 0) {
        neon_fail("division by zero", line);
    }
    if (b == -1 && a == INT64_MIN) {
        neon_fail("integer overflow", line);
    }
    return a % b;
}

/* Chiffres les plus courts qui relisent la même valeur ; notation fixe pour
   un exposant dans [-5, 17). */
static void print_float(double x)
{
    char buf[64];
    int p;
    int exp;
    if (isnan(x)) {
        println("nan");
        return;
    }
    if (isinf(x)) {
        println(x < 0 ? "-inf" : "inf");
        return;
    }
    if (x == 0.0) {
        println(signbit(x) ? "-0" : "0");
        return;
    }
    for (p = 1; p < 17; p++) {
        snprintf(buf, sizeof buf, "%.*e", p - 1, x);
        if (strtod(buf, NULL) == x) {
            break;
        }
    }
    snprintf(buf, sizeof buf, "%.*e", p - 1, x);
    exp = atoi(strchr(buf, 'e') + 1);
    if (exp >= -5 && exp < 17) {
        snprintf(buf, sizeof buf, "%.*f", p - 1 - exp > 0 ? p - 1 - exp : 0, x);
    }
    println(buf);
}
"#;

/// Builtins du runtime : nom, arité.
const BUILTINS: [(&str, usize); 2] = [("println", 1), ("string_add", 2)];

/// Compile un programme neon en C.
pub fn emit_c(program: &Program) -> Result<String> {
    let mut em = Emitter::default();
    em.collect_functions(program)?;
    em.emit_program(program)
}

/// Conversion de type neon → C.
pub fn c_type(ty: &Type, line: u32) -> Result<String> {
    let mut s = match &ty.name {
        TypeName::Int | TypeName::I64 => "int64_t".to_string(),
        TypeName::I32 => "int32_t".into(),
        TypeName::I16 => "int16_t".into(),
        TypeName::I8 => "int8_t".into(),
        TypeName::U64 => "uint64_t".into(),
        TypeName::U32 => "uint32_t".into(),
        TypeName::U16 => "uint16_t".into(),
        TypeName::U8 => "uint8_t".into(),
        TypeName::Float | TypeName::F64 => "double".into(),
        TypeName::F32 => "float".into(),
        TypeName::Bool => "bool".into(),
        TypeName::Char => "char".into(),
        TypeName::String => "char*".into(),
        TypeName::User(name) => format!("ne_{name}_t"),
    };
    for m in &ty.mods {
        match m {
            TypeMod::Pointer => s.push('*'),
            TypeMod::Array => return Err(CompileError::Unsupported { what: "array type", line }),
        }
    }
    Ok(s)
}

fn ret_type(ret: Option<&Type>, line: u32) -> Result<String> {
    ret.map_or_else(|| Ok("void".to_string()), |t| c_type(t, line))
}

fn c_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn c_name(name: &str) -> &str {
    if name == "main" { ENTRY_SYMBOL } else { name }
}

struct Signature {
    params: Vec<Type>,
    ret: Option<Type>,
}

#[derive(Default)]
struct Emitter {
    funcs: HashMap<String, Signature>,
    globals: HashMap<String, Type>,
    scopes: Vec<HashMap<String, Type>>,
    indent: usize,
}

impl Emitter {
    fn collect_functions(&mut self, program: &Program) -> Result<()> {
        for s in &program.stmts {
            if let StmtKind::Func { name, params, ret, .. } = &s.kind {
                if BUILTINS.iter().any(|(b, _)| b == name) {
                    return Err(CompileError::semantic(format!("'{name}' is a builtin function"), s.line));
                }
                let sig = Signature { params: params.iter().map(|p| p.ty.clone()).collect(), ret: ret.clone() };
                if self.funcs.insert(name.clone(), sig).is_some() {
                    return Err(CompileError::semantic(format!("function '{name}' defined twice"), s.line));
                }
            }
        }
        Ok(())
    }

    fn emit_program(&mut self, program: &Program) -> Result<String> {
        let main = program
            .function("main")
            .ok_or_else(|| CompileError::semantic("no entry point: missing 'func main'", 1))?;
        let main_returns_int = self.check_main(main)?;

        // Code de premier niveau → neon_init (enregistre aussi les globales).
        self.indent = 1;
        let mut init = String::new();
        let mut global_decls = String::new();
        for s in &program.stmts {
            match &s.kind {
                StmtKind::Func { .. } => {}
                StmtKind::Declare { name, ty, value } => {
                    let code = self.expr(value)?;
                    let ty = self.declared_type(name, ty.as_ref(), value, s.line)?;
                    let _ = writeln!(global_decls, "static {} {name};", c_type(&ty, s.line)?);
                    self.globals.insert(name.clone(), ty);
                    self.line(&mut init, &format!("{name} = {code};"));
                }
                StmtKind::Return(_) => {
                    return Err(CompileError::semantic("return outside of a function", s.line));
                }
                _ => self.stmt(&mut init, s)?,
            }
        }

        let mut out = String::from(PRELUDE);
        out.push('\n');
        if !global_decls.is_empty() {
            out.push_str(&global_decls);
            out.push('\n');
        }
        for s in &program.stmts {
            if let StmtKind::Func { name, params, ret, .. } = &s.kind {
                let _ = writeln!(out, "{};", self.header(name, params, ret.as_ref(), s.line)?);
            }
        }
        out.push('\n');
        out.push_str("static void neon_init(void)\n{\n");
        out.push_str(&init);
        out.push_str("}\n\n");

        for s in &program.stmts {
            if let StmtKind::Func { name, params, ret, body } = &s.kind {
                out.push_str(&self.header(name, params, ret.as_ref(), s.line)?);
                out.push_str("\n{\n");
                self.scopes.push(params.iter().map(|p| (p.name.clone(), p.ty.clone())).collect());
                self.indent = 1;
                for st in body {
                    self.stmt(&mut out, st)?;
                }
                self.scopes.pop();
                out.push_str("}\n\n");
            }
        }

        out.push_str("int main(int argc, char **argv)\n{\n    (void)argc;\n    (void)argv;\n    neon_init();\n");
        if main_returns_int {
            let _ = writeln!(out, "    int64_t status = {ENTRY_SYMBOL}();");
            out.push_str("    return status < 0 ? 0 : status > 255 ? 255 : (int)status;\n");
        } else {
            let _ = writeln!(out, "    {ENTRY_SYMBOL}();\n    return 0;");
        }
        out.push_str("}\n");
        log::debug!("emit_c: {} fonction(s), {} octets de C", self.funcs.len(), out.len());
        Ok(out)
    }

    /// `main` : sans paramètre, retourne `int` ou rien.
    fn check_main(&self, main: &Stmt) -> Result<bool> {
        let StmtKind::Func { params, ret, .. } = &main.kind else {
            return Ok(false);
        };
        if !params.is_empty() {
            return Err(CompileError::semantic("'main' takes no parameters", main.line));
        }
        match ret.as_ref().map(Type::kind) {
            None => Ok(false),
            Some(Kind::Int) => Ok(true),
            Some(_) => Err(CompileError::semantic("'main' must return int or nothing", main.line)),
        }
    }

    fn header(&self, name: &str, params: &[Param], ret: Option<&Type>, line: u32) -> Result<String> {
        let params = if params.is_empty() {
            "void".to_string()
        } else {
            params
                .iter()
                .map(|p| Ok(format!("{} {}", c_type(&p.ty, line)?, p.name)))
                .collect::<Result<Vec<_>>>()?
                .join(", ")
        };
        Ok(format!("{} {}({params})", ret_type(ret, line)?, c_name(name)))
    }

    fn line(&self, out: &mut String, text: &str) {
        let _ = writeln!(out, "{}{text}", "    ".repeat(self.indent));
    }

    fn lookup(&self, name: &str) -> Option<&Type> {
        self.scopes.iter().rev().find_map(|s| s.get(name)).or_else(|| self.globals.get(name))
    }

    fn declared_type(&self, name: &str, ty: Option<&Type>, value: &Expr, line: u32) -> Result<Type> {
        match ty {
            Some(t) => Ok(t.clone()),
            None => self.type_of(value).ok_or_else(|| CompileError::CannotInfer { name: name.to_string(), line }),
        }
    }

    /* ───────────── Instructions ───────────── */

    fn stmt(&mut self, out: &mut String, s: &Stmt) -> Result<()> {
        match &s.kind {
            StmtKind::Expr(e) => {
                if let ExprKind::Call { callee, args } = &e.kind {
                    if let (Some("string_add"), [first, second]) = (callee.as_variable(), args.as_slice()) {
                        if let Some(var) = first.as_variable() {
                            let rhs = self.expr(second)?;
                            self.expr(first)?;
                            self.line(out, &format!("{var} = string_add({var}, {rhs});"));
                            return Ok(());
                        }
                    }
                }
                let code = self.expr(e)?;
                self.line(out, &format!("{code};"));
            }
            StmtKind::Print(e) => {
                let code = self.expr(e)?;
                let text = match self.type_of(e).map(|t| t.kind()) {
                    Some(Kind::String) => format!("println({code});"),
                    Some(Kind::Int) => format!("printf(\"%\" PRId64 \"\\n\", (int64_t)({code}));"),
                    Some(Kind::Float) => format!("print_float({code});"),
                    Some(Kind::Bool) => format!("println(({code}) ? \"true\" : \"false\");"),
                    Some(Kind::None) | None => {
                        return Err(CompileError::Unsupported { what: "print of a value without a known type", line: s.line })
                    }
                };
                self.line(out, &text);
            }
            StmtKind::Return(None) => self.line(out, "return;"),
            StmtKind::Return(Some(e)) => {
                let code = self.expr(e)?;
                self.line(out, &format!("return {code};"));
            }
            StmtKind::Declare { name, ty, value } => {
                let code = self.expr(value)?;
                let ty = self.declared_type(name, ty.as_ref(), value, s.line)?;
                self.line(out, &format!("{} {name} = {code};", c_type(&ty, s.line)?));
                if let Some(scope) = self.scopes.last_mut() {
                    scope.insert(name.clone(), ty);
                } else {
                    self.globals.insert(name.clone(), ty);
                }
            }
            StmtKind::Assign { name, value } => {
                if self.lookup(name).is_none() {
                    return Err(CompileError::semantic(format!("undefined variable '{name}'"), s.line));
                }
                let code = self.expr(value)?;
                self.line(out, &format!("{name} = {code};"));
            }
            StmtKind::Block(body) => {
                self.line(out, "{");
                self.indent += 1;
                self.scopes.push(HashMap::new());
                for st in body {
                    self.stmt(out, st)?;
                }
                self.scopes.pop();
                self.indent -= 1;
                self.line(out, "}");
            }
            StmtKind::Func { .. } => return Err(CompileError::Unsupported { what: "nested function", line: s.line }),
        }
        Ok(())
    }

    /* ───────────── Expressions ───────────── */

    fn type_of(&self, e: &Expr) -> Option<Type> {
        match &e.kind {
            ExprKind::Literal(lit) => Some(Type::simple(match lit {
                Lit::Int(_) => TypeName::Int,
                Lit::Float(_) => TypeName::Float,
                Lit::Str(_) => TypeName::String,
                Lit::Bool(_) => TypeName::Bool,
            })),
            ExprKind::Variable(name) => self.lookup(name).cloned(),
            ExprKind::Unary { op: UnOp::Not, .. } => Some(Type::simple(TypeName::Bool)),
            ExprKind::Unary { op: UnOp::Neg, right } => self.type_of(right),
            ExprKind::Binary { op, left, right } => {
                if op.is_comparison() || matches!(op, BinOp::And | BinOp::Or) {
                    Some(Type::simple(TypeName::Bool))
                } else {
                    match (self.kind_of(left)?, self.kind_of(right)?) {
                        (Kind::String, Kind::String) if *op == BinOp::Add => Some(Type::simple(TypeName::String)),
                        (Kind::Int, Kind::Int) => Some(Type::simple(TypeName::Int)),
                        (Kind::Int | Kind::Float, Kind::Float) | (Kind::Float, Kind::Int) => {
                            Some(Type::simple(TypeName::Float))
                        }
                        _ => None,
                    }
                }
            }
            ExprKind::Group(inner) => self.type_of(inner),
            ExprKind::Call { callee, .. } => match callee.as_variable()? {
                "string_add" => Some(Type::simple(TypeName::String)),
                "println" => None,
                name => self.funcs.get(name).and_then(|sig| sig.ret.clone()),
            },
            ExprKind::Array(_) | ExprKind::Index { .. } => None,
        }
    }

    fn kind_of(&self, e: &Expr) -> Option<Kind> {
        self.type_of(e).map(|t| t.kind())
    }

    fn expr(&self, e: &Expr) -> Result<String> {
        Ok(match &e.kind {
            ExprKind::Literal(Lit::Int(n)) => n.to_string(),
            ExprKind::Literal(Lit::Float(x)) => format!("{x:?}"),
            ExprKind::Literal(Lit::Str(s)) => c_string(s),
            ExprKind::Literal(Lit::Bool(b)) => b.to_string(),
            ExprKind::Variable(name) => {
                if self.lookup(name).is_none() {
                    return Err(CompileError::semantic(format!("undefined variable '{name}'"), e.line));
                }
                name.clone()
            }
            ExprKind::Unary { op, right } => format!("({}{})", op.symbol(), self.expr(right)?),
            ExprKind::Binary { op, left, right } => {
                let (l, r) = (self.expr(left)?, self.expr(right)?);
                let kinds = (self.kind_of(left), self.kind_of(right));
                match (op, kinds) {
                    (BinOp::Add, (Some(Kind::String), Some(Kind::String))) => format!("string_add({l}, {r})"),
                    (op, (Some(Kind::String), Some(Kind::String))) if op.is_comparison() => {
                        format!("(strcmp({l}, {r}) {} 0)", op.symbol())
                    }
                    (BinOp::Div, (Some(Kind::Int), Some(Kind::Int))) => format!("neon_div({l}, {r}, {})", e.line),
                    (BinOp::Mod, (Some(Kind::Int), Some(Kind::Int))) => format!("neon_mod({l}, {r}, {})", e.line),
                    (BinOp::Mod, (Some(Kind::Float), _) | (_, Some(Kind::Float))) => format!("fmod({l}, {r})"),
                    _ => format!("({l} {} {r})", op.symbol()),
                }
            }
            ExprKind::Group(inner) => format!("({})", self.expr(inner)?),
            ExprKind::Call { callee, args } => {
                let Some(name) = callee.as_variable() else {
                    return Err(CompileError::Unsupported { what: "call of a non-identifier", line: e.line });
                };
                let arity = BUILTINS
                    .iter()
                    .find(|(b, _)| *b == name)
                    .map(|(_, n)| *n)
                    .or_else(|| self.funcs.get(name).map(|sig| sig.params.len()))
                    .ok_or_else(|| CompileError::semantic(format!("unknown function '{name}'"), e.line))?;
                if arity != args.len() {
                    return Err(CompileError::semantic(
                        format!("'{name}' expects {arity} argument(s), got {}", args.len()),
                        e.line,
                    ));
                }
                let args = args.iter().map(|a| self.expr(a)).collect::<Result<Vec<_>>>()?;
                format!("{}({})", c_name(name), args.join(", "))
            }
            ExprKind::Array(_) => return Err(CompileError::Unsupported { what: "array literal", line: e.line }),
            ExprKind::Index { .. } => return Err(CompileError::Unsupported { what: "indexing", line: e.line }),
        })
    }
}

/* --------------------------------- Tests --------------------------------- */
