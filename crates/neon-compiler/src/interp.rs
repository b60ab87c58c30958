//! interp.rs — Interpréteur neon (parcours d'arbre)
//!
//! `Interpreter` est un `UserProgram` : le runtime l'appelle une fois avec sa
//! poignée de sortie. Déroulé :
//! 1. enregistre les fonctions de premier niveau,
//! 2. évalue le reste du premier niveau (globales),
//! 3. appelle `main()` ; un `int` retourné devient le statut de sortie.
//!
//! Les chaînes sont des `neon_runtime::Text` ; `+` et `string_add` passent par
//! `neon_runtime::string_add`. `string_add(x, e)` avec `x` variable modifie `x`.

use std::collections::HashMap;
use std::fmt;

use neon_runtime::{format_float, string_add, ExitStatus, Result, Runtime, RuntimeError, Text, UserProgram};
use neon_syntax::ast::{BinOp, Expr, ExprKind, Lit, Param, Program, Stmt, StmtKind, Type, UnOp};
use neon_syntax::Kind;

pub const DEFAULT_MAX_DEPTH: usize = 1024;

/* ─────────────────────────── Valeurs ─────────────────────────── */

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(Text),
    Array(Vec<Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Text(_) => "string",
            Self::Array(_) => "array",
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Self::Int(_) => Kind::Int,
            Self::Float(_) => Kind::Float,
            Self::Bool(_) => Kind::Bool,
            Self::Text(_) => Kind::String,
            Self::None | Self::Array(_) => Kind::None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => f.write_str(&format_float(*x)),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Text(t) => write!(f, "{t}"),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/* ─────────────────────────── Interpréteur ─────────────────────────── */

pub struct Interpreter {
    program: Program,
    max_depth: usize,
}

impl Interpreter {
    pub fn new(program: Program) -> Self {
        Self { program, max_depth: DEFAULT_MAX_DEPTH }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl UserProgram for Interpreter {
    fn run(&mut self, rt: &mut Runtime<'_>) -> Result<ExitStatus> {
        Machine::new(&self.program, self.max_depth, rt)?.run_program()
    }
}

fn type_err(msg: impl fmt::Display, line: u32) -> RuntimeError {
    RuntimeError::Type(format!("{msg}, line {line}"))
}

fn fail(msg: impl fmt::Display, line: u32) -> RuntimeError {
    RuntimeError::Msg(format!("{msg}, line {line}"))
}

/// Convertit `v` vers le type déclaré (`int` → `float` permis).
fn coerce(v: Value, ty: &Type, what: &str, line: u32) -> Result<Value> {
    match (ty.kind(), v) {
        (Kind::None, v) => Ok(v),
        #[allow(clippy::cast_precision_loss)]
        (Kind::Float, Value::Int(n)) => Ok(Value::Float(n as f64)),
        (k, v) if k == v.kind() => Ok(v),
        (_, v) => Err(type_err(format!("{what} declared {ty}, got {}", v.type_name()), line)),
    }
}

enum Flow {
    Normal,
    Return(Value),
}

struct Func<'p> {
    params: &'p [Param],
    ret: Option<&'p Type>,
    body: &'p [Stmt],
}

struct Machine<'p, 'r, 'o> {
    rt: &'r mut Runtime<'o>,
    funcs: HashMap<&'p str, Func<'p>>,
    program: &'p Program,
    globals: HashMap<String, Value>,
    /// Portées de la fonction courante (vide au premier niveau).
    scopes: Vec<HashMap<String, Value>>,
    depth: usize,
    max_depth: usize,
}

impl<'p, 'r, 'o> Machine<'p, 'r, 'o> {
    fn new(program: &'p Program, max_depth: usize, rt: &'r mut Runtime<'o>) -> Result<Self> {
        let mut funcs = HashMap::new();
        for s in &program.stmts {
            if let StmtKind::Func { name, params, ret, body } = &s.kind {
                if matches!(name.as_str(), "println" | "string_add") {
                    return Err(fail(format!("'{name}' is a builtin function"), s.line));
                }
                let f = Func { params, ret: ret.as_ref(), body };
                if funcs.insert(name.as_str(), f).is_some() {
                    return Err(fail(format!("function '{name}' defined twice"), s.line));
                }
            }
        }
        Ok(Self { rt, funcs, program, globals: HashMap::new(), scopes: Vec::new(), depth: 0, max_depth })
    }

    fn run_program(&mut self) -> Result<ExitStatus> {
        let program = self.program;
        for s in &program.stmts {
            match &s.kind {
                StmtKind::Func { .. } => {}
                StmtKind::Return(_) => return Err(fail("return outside of a function", s.line)),
                _ => {
                    self.exec(s)?;
                }
            }
        }
        log::debug!("interp: {} globale(s), appel de main", self.globals.len());

        if !self.funcs.contains_key("main") {
            return Err(RuntimeError::msg("no entry point: missing 'func main'"));
        }
        match self.call("main", Vec::new(), 1)? {
            Value::Int(n) => Ok(ExitStatus::saturating(n)),
            _ => Ok(ExitStatus::SUCCESS),
        }
    }

    /* ───────────── Variables ───────────── */

    fn declare(&mut self, name: &str, v: Value) {
        match self.scopes.last_mut() {
            Some(scope) => scope.insert(name.to_string(), v),
            None => self.globals.insert(name.to_string(), v),
        };
    }

    fn slot(&mut self, name: &str) -> Option<&mut Value> {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(v) = scope.get_mut(name) {
                return Some(v);
            }
        }
        self.globals.get_mut(name)
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|s| s.get(name)).or_else(|| self.globals.get(name))
    }

    /* ───────────── Instructions ───────────── */

    fn exec_block(&mut self, body: &'p [Stmt]) -> Result<Flow> {
        for s in body {
            if let Flow::Return(v) = self.exec(s)? {
                return Ok(Flow::Return(v));
            }
        }
        Ok(Flow::Normal)
    }

    fn exec(&mut self, s: &'p Stmt) -> Result<Flow> {
        match &s.kind {
            StmtKind::Expr(e) => {
                self.eval(e)?;
            }
            StmtKind::Print(e) => {
                let v = self.eval(e)?;
                let text = match v {
                    Value::Text(t) => t,
                    other => Text::from(other.to_string()),
                };
                self.rt.println(&text)?;
            }
            StmtKind::Return(e) => {
                let v = match e {
                    Some(e) => self.eval(e)?,
                    None => Value::None,
                };
                return Ok(Flow::Return(v));
            }
            StmtKind::Declare { name, ty, value } => {
                let v = self.eval(value)?;
                let v = match ty {
                    Some(t) => coerce(v, t, &format!("'{name}'"), s.line)?,
                    None => v,
                };
                self.declare(name, v);
            }
            StmtKind::Assign { name, value } => {
                let v = self.eval(value)?;
                let Some(slot) = self.slot(name) else {
                    return Err(RuntimeError::Undefined(name.clone()));
                };
                *slot = match (&*slot, v) {
                    #[allow(clippy::cast_precision_loss)]
                    (Value::Float(_), Value::Int(n)) => Value::Float(n as f64),
                    (Value::None, v) => v,
                    (old, v) if old.kind() == v.kind() => v,
                    (old, v) => {
                        return Err(type_err(
                            format!("cannot assign {} to '{name}' ({})", v.type_name(), old.type_name()),
                            s.line,
                        ))
                    }
                };
            }
            StmtKind::Block(body) => {
                self.scopes.push(HashMap::new());
                let flow = self.exec_block(body);
                self.scopes.pop();
                return flow;
            }
            StmtKind::Func { .. } => return Err(fail("nested functions are not supported", s.line)),
        }
        Ok(Flow::Normal)
    }

    /* ───────────── Appels ───────────── */

    fn call(&mut self, name: &str, args: Vec<Value>, line: u32) -> Result<Value> {
        let Some(f) = self.funcs.get(name) else {
            return Err(RuntimeError::Undefined(name.to_string()));
        };
        let (params, ret, body) = (f.params, f.ret, f.body);
        if params.len() != args.len() {
            return Err(fail(format!("'{name}' expects {} argument(s), got {}", params.len(), args.len()), line));
        }
        if self.depth >= self.max_depth {
            return Err(fail(format!("maximum call depth exceeded ({})", self.max_depth), line));
        }

        let mut frame = HashMap::with_capacity(params.len());
        for (p, v) in params.iter().zip(args) {
            frame.insert(p.name.clone(), coerce(v, &p.ty, &format!("parameter '{}'", p.name), line)?);
        }

        let saved = std::mem::replace(&mut self.scopes, vec![frame]);
        self.depth += 1;
        log::trace!("interp: appel {name} (profondeur {})", self.depth);
        let flow = self.exec_block(body);
        self.depth -= 1;
        self.scopes = saved;

        let v = match flow? {
            Flow::Return(v) => v,
            Flow::Normal => Value::None,
        };
        match ret {
            Some(t) => coerce(v, t, &format!("return value of '{name}'"), line),
            None => Ok(v),
        }
    }

    fn call_expr(&mut self, callee: &Expr, args: &'p [Expr], line: u32) -> Result<Value> {
        let Some(name) = callee.as_variable() else {
            return Err(type_err("only named functions can be called", line));
        };
        match (name, args) {
            ("println", [msg]) => match self.eval(msg)? {
                Value::Text(t) => {
                    self.rt.println(&t)?;
                    Ok(Value::None)
                }
                other => Err(type_err(format!("println expects a string, got {}", other.type_name()), line)),
            },
            ("string_add", [a, b]) => {
                let Value::Text(tail) = self.eval(b)? else {
                    return Err(type_err("string_add expects strings", line));
                };
                if let Some(var) = a.as_variable() {
                    match self.slot(var) {
                        Some(Value::Text(head)) => return Ok(Value::Text(string_add(head, &tail).clone())),
                        Some(_) => return Err(type_err("string_add expects strings", line)),
                        None => return Err(RuntimeError::Undefined(var.to_string())),
                    }
                }
                let Value::Text(mut head) = self.eval(a)? else {
                    return Err(type_err("string_add expects strings", line));
                };
                string_add(&mut head, &tail);
                Ok(Value::Text(head))
            }
            ("println" | "string_add", _) => {
                let arity = if name == "println" { 1 } else { 2 };
                Err(fail(format!("'{name}' expects {arity} argument(s), got {}", args.len()), line))
            }
            _ => {
                let values = args.iter().map(|a| self.eval(a)).collect::<Result<Vec<_>>>()?;
                self.call(name, values, line)
            }
        }
    }

    /* ───────────── Expressions ───────────── */

    fn eval(&mut self, e: &'p Expr) -> Result<Value> {
        let line = e.line;
        match &e.kind {
            ExprKind::Literal(lit) => Ok(match lit {
                Lit::Int(n) => Value::Int(*n),
                Lit::Float(x) => Value::Float(*x),
                Lit::Str(s) => Value::Text(Text::from(s.as_str())),
                Lit::Bool(b) => Value::Bool(*b),
            }),
            ExprKind::Variable(name) => self.get(name).cloned().ok_or_else(|| RuntimeError::Undefined(name.clone())),
            ExprKind::Group(inner) => self.eval(inner),
            ExprKind::Array(items) => Ok(Value::Array(items.iter().map(|i| self.eval(i)).collect::<Result<_>>()?)),
            ExprKind::Index { array, index } => {
                let (arr, idx) = (self.eval(array)?, self.eval(index)?);
                match (arr, idx) {
                    (Value::Array(items), Value::Int(i)) => {
                        let len = items.len();
                        usize::try_from(i)
                            .ok()
                            .and_then(|i| items.into_iter().nth(i))
                            .ok_or_else(|| fail(format!("index {i} out of bounds (len {len})"), line))
                    }
                    (a, i) => Err(type_err(format!("cannot index {} with {}", a.type_name(), i.type_name()), line)),
                }
            }
            ExprKind::Call { callee, args } => self.call_expr(callee, args, line),
            ExprKind::Unary { op, right } => match (op, self.eval(right)?) {
                (UnOp::Neg, Value::Int(n)) => n.checked_neg().map(Value::Int).ok_or_else(|| fail("integer overflow", line)),
                (UnOp::Neg, Value::Float(x)) => Ok(Value::Float(-x)),
                (UnOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                (op, v) => Err(type_err(format!("bad operand type for '{}': {}", op.symbol(), v.type_name()), line)),
            },
            ExprKind::Binary { op: op @ (BinOp::And | BinOp::Or), left, right } => {
                let Value::Bool(l) = self.eval(left)? else {
                    return Err(type_err(format!("'{}' expects bools", op.symbol()), line));
                };
                if (*op == BinOp::And && !l) || (*op == BinOp::Or && l) {
                    return Ok(Value::Bool(l));
                }
                match self.eval(right)? {
                    Value::Bool(r) => Ok(Value::Bool(r)),
                    _ => Err(type_err(format!("'{}' expects bools", op.symbol()), line)),
                }
            }
            ExprKind::Binary { op, left, right } => {
                let l = self.eval(left)?;
                let r = self.eval(right)?;
                binary(*op, l, r, line)
            }
        }
    }
}

/* ─────────────────────────── Opérateurs ─────────────────────────── */

#[allow(clippy::cast_precision_loss)]
fn binary(op: BinOp, l: Value, r: Value, line: u32) -> Result<Value> {
    use Value::{Bool, Float, Int};
    let mismatch = |l: &Value, r: &Value| {
        type_err(format!("unsupported operand types for '{}': {} and {}", op.symbol(), l.type_name(), r.type_name()), line)
    };

    if op.is_comparison() {
        let ord = match (&l, &r) {
            (Int(a), Int(b)) => a.partial_cmp(b),
            (Int(a), Float(b)) => (*a as f64).partial_cmp(b),
            (Float(a), Int(b)) => a.partial_cmp(&(*b as f64)),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Bool(a), Bool(b)) if matches!(op, BinOp::Eq | BinOp::Ne) => Some(a.cmp(b)),
            _ => return Err(mismatch(&l, &r)),
        };
        let res = match ord {
            None => op == BinOp::Ne,
            Some(o) => match op {
                BinOp::Eq => o.is_eq(),
                BinOp::Ne => o.is_ne(),
                BinOp::Gt => o.is_gt(),
                BinOp::Lt => o.is_lt(),
                BinOp::Ge => o.is_ge(),
                _ => o.is_le(),
            },
        };
        return Ok(Bool(res));
    }

    match (l, r) {
        (Value::Text(mut a), Value::Text(b)) if op == BinOp::Add => {
            string_add(&mut a, &b);
            Ok(Value::Text(a))
        }
        (Int(a), Int(b)) => {
            let res = match op {
                BinOp::Add => a.checked_add(b),
                BinOp::Sub => a.checked_sub(b),
                BinOp::Mul => a.checked_mul(b),
                BinOp::Div | BinOp::Mod if b == 0 => return Err(fail("division by zero", line)),
                BinOp::Div => a.checked_div(b),
                BinOp::Mod => a.checked_rem(b),
                _ => return Err(mismatch(&Int(a), &Int(b))),
            };
            res.map(Int).ok_or_else(|| fail("integer overflow", line))
        }
        (l @ (Int(_) | Float(_)), r @ (Int(_) | Float(_))) => {
            let as_f = |v: &Value| match v {
                Int(n) => *n as f64,
                Float(x) => *x,
                _ => 0.0,
            };
            let (a, b) = (as_f(&l), as_f(&r));
            Ok(Float(match op {
                BinOp::Add => a + b,
                BinOp::Sub => a - b,
                BinOp::Mul => a * b,
                BinOp::Div => a / b,
                BinOp::Mod => a % b,
                _ => return Err(mismatch(&l, &r)),
            }))
        }
        (l, r) => Err(mismatch(&l, &r)),
    }
}

/* --------------------------------- Tests --------------------------------- */
#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use neon_runtime::execute;
    use neon_syntax::parse_source;
    use pretty_assertions::assert_eq;

    fn run_with(src: &str, depth: usize) -> (Result<ExitStatus>, String) {
        let mut it = Interpreter::new(parse_source(src).unwrap()).with_max_depth(depth);
        let mut out = Vec::new();
        let res = execute(&mut it, &mut out);
        (res, String::from_utf8(out).unwrap())
    }

    fn run(src: &str) -> (Result<ExitStatus>, String) {
        run_with(src, 64)
    }

    #[test]
    fn hello() {
        let (res, out) = run("func main() {\n println(\"hello\")\n}\n");
        assert_eq!(res.unwrap(), ExitStatus::SUCCESS);
        assert_eq!(out, "hello\n");
    }

    #[test]
    fn string_add_mutates_variable() {
        let (res, out) = run(indoc! {r#"
            func main() {
                greeting: string = "foo"
                string_add(greeting, "bar")
                println(greeting)
                println(string_add("a", "b"))
                s := greeting + "!"
                println(s)
                println(greeting)
            }
        "#});
        assert!(res.is_ok());
        assert_eq!(out, "foobar\nab\nfoobar!\nfoobar\n");
    }

    #[test]
    fn globals_functions_and_exit_status() {
        let (res, out) = run(indoc! {r#"
            base := 40
            func add(a: int, b: int): int {
                return a + b
            }
            func main(): int {
                total := add(base, 2)
                print total
                print total / 5
                print 7.0 / 2
                print 1 < 2 && !false
                return total - 35
            }
        "#});
        assert_eq!(out, "42\n8\n3.5\ntrue\n");
        assert_eq!(res.unwrap(), ExitStatus::new(7));
    }

    #[test]
    fn exit_status_is_clamped() {
        assert_eq!(run("func main(): int {\n return 1000\n}").0.unwrap(), ExitStatus::new(255));
        assert_eq!(run("func main(): int {\n return -4\n}").0.unwrap(), ExitStatus::SUCCESS);
    }

    #[test]
    fn empty_main_prints_nothing() {
        let (res, out) = run("func main() {\n}\n");
        assert!(res.unwrap().is_success());
        assert!(out.is_empty());
    }

    #[test]
    fn missing_entry_point() {
        let (res, out) = run("print \"top\"\n");
        assert_eq!(res.unwrap_err().to_string(), "no entry point: missing 'func main'");
        assert_eq!(out, "top\n");
    }

    #[test]
    fn blocks_scope_and_arrays() {
        let (res, out) = run(indoc! {r#"
            func main() {
                x := 1
                {
                    x = 2
                    y := [10, 20, 30]
                    print y[1] + x
                    print y
                }
                print x
            }
        "#});
        assert!(res.is_ok());
        assert_eq!(out, "22\n[10, 20, 30]\n2\n");
    }

    #[test]
    fn runtime_errors() {
        let err = |src: &str| run(src).0.unwrap_err();
        assert_eq!(err("func main() {\n print 1 / 0\n}").to_string(), "division by zero, line 2");
        assert_eq!(err("func main() {\n print 5 % 0\n}").to_string(), "division by zero, line 2");
        assert!(matches!(err("func main() {\n print nope\n}"), RuntimeError::Undefined(n) if n == "nope"));
        assert!(matches!(err("func main() {\n nope()\n}"), RuntimeError::Undefined(_)));
        assert_eq!(err("func f(a: int) {\n}\nfunc main() {\n f()\n}").to_string(), "'f' expects 1 argument(s), got 0, line 4");
        assert_eq!(err("func main() {\n print [1][3]\n}").to_string(), "index 3 out of bounds (len 1), line 2");
        assert_eq!(
            err("func main() {\n println(3)\n}").to_string(),
            "type error: println expects a string, got int, line 2"
        );
        assert_eq!(
            err("func main() {\n x: int = \"s\"\n}").to_string(),
            "type error: 'x' declared int, got string, line 2"
        );
        assert_eq!(
            err("func main() {\n print \"a\" - 1\n}").to_string(),
            "type error: unsupported operand types for '-': string and int, line 2"
        );
    }

    #[test]
    fn output_before_error_is_kept() {
        let (res, out) = run("func main() {\n println(\"before\")\n x := 1 / 0\n println(\"after\")\n}");
        assert!(res.is_err());
        assert_eq!(out, "before\n");
    }

    #[test]
    fn call_depth_guard() {
        let (res, _) = run_with("func f(n: int): int {\n return f(n + 1)\n}\nfunc main() {\n f(0)\n}", 16);
        assert_eq!(res.unwrap_err().to_string(), "maximum call depth exceeded (16), line 2");
    }

    #[test]
    fn float_declarations_accept_ints() {
        let (res, out) = run("func main() {\n x: float = 2\n x = 3\n print x / 2\n}");
        assert!(res.is_ok());
        assert_eq!(out, "1.5\n");
    }
}
