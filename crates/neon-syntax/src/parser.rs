//! parser.rs — Analyse syntaxique neon
//!
//! Descente récursive sur les instructions, précédence (Pratt) sur les
//! expressions. Les instructions se terminent par un saut de ligne, la fin
//! du fichier, ou une accolade fermante (`func f() { return 1 }`).
//!
//! Grammaire :
//! ```text
//! program := { NEWLINE | stmt }* EOF
//! stmt    := 'func' IDENT '(' params ')' [':' type] block
//!          | 'return' [expr] | 'print' expr | block
//!          | IDENT ':' type '=' expr | IDENT ':=' expr | IDENT '=' expr
//!          | expr
//! type    := { '*' | '[' ']' } IDENT
//! expr    := || < && < comparaisons < + - < * / % < unaire < postfix < atome
//! ```
//!
//! Le parser ne fait aucune vérification de types ni de noms. L'imbrication
//! (expressions, blocs) est bornée par `MAX_NESTING`.

use crate::ast::{BinOp, Expr, ExprKind, Lit, Param, Program, Stmt, StmtKind, Type, TypeMod, TypeName, UnOp};
use crate::diagnostics::SyntaxError;
use crate::lexer::tokenize;
use crate::token::{Token, TokenKind};

type PResult<T> = Result<T, SyntaxError>;

/// Profondeur maximale d'imbrication des expressions et des blocs.
pub const MAX_NESTING: usize = 128;

/// Tokens → `Program`.
pub fn parse(tokens: Vec<Token>) -> PResult<Program> {
    Parser::new(tokens).parse_program()
}

/// Source → `Program` (lexer + parser), erreurs enrichies de la ligne source.
pub fn parse_source(source: &str) -> PResult<Program> {
    let tokens = tokenize(source)?;
    parse(tokens).map_err(|e| e.with_source(source))
}

pub struct Parser {
    toks: Vec<Token>,
    i: usize,
    depth: usize,
}

fn binop(kind: TokenKind) -> Option<BinOp> {
    use TokenKind as T;
    Some(match kind {
        T::OrOr => BinOp::Or,
        T::AndAnd => BinOp::And,
        T::EqualEqual => BinOp::Eq,
        T::NotEqual => BinOp::Ne,
        T::Greater => BinOp::Gt,
        T::Less => BinOp::Lt,
        T::GreaterEqual => BinOp::Ge,
        T::LessEqual => BinOp::Le,
        T::Plus => BinOp::Add,
        T::Minus => BinOp::Sub,
        T::Star => BinOp::Mul,
        T::Slash => BinOp::Div,
        T::Percent => BinOp::Mod,
        _ => return None,
    })
}

impl Parser {
    pub fn new(mut toks: Vec<Token>) -> Self {
        if !toks.last().is_some_and(|t| t.is(TokenKind::Eof)) {
            let line = toks.last().map_or(1, |t| t.line);
            toks.push(Token { kind: TokenKind::Eof, lexeme: String::new(), line, start: 0, end: 0 });
        }
        Self { toks, i: 0, depth: 0 }
    }

    pub fn parse_program(&mut self) -> PResult<Program> {
        let stmts = self.parse_stmts(TokenKind::Eof)?;
        log::debug!("parser: {} instruction(s) de premier niveau", stmts.len());
        Ok(Program { stmts })
    }

    /* ───────────── Curseur ───────────── */

    fn peek(&self) -> &Token {
        &self.toks[self.i.min(self.toks.len() - 1)]
    }

    fn peek_kind_at(&self, ahead: usize) -> TokenKind {
        self.toks.get(self.i + ahead).map_or(TokenKind::Eof, |t| t.kind)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().is(kind)
    }

    fn bump(&mut self) -> Token {
        let t = self.peek().clone();
        if self.i < self.toks.len() - 1 {
            self.i += 1;
        }
        t
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn err_at(tok: &Token, msg: impl Into<String>) -> SyntaxError {
        SyntaxError::new(msg, tok.line, tok.start, tok.end)
    }

    fn nested<T>(&mut self, what: &str, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(Self::err_at(self.peek(), format!("{what} nested too deeply")));
        }
        self.depth += 1;
        let res = f(self);
        self.depth -= 1;
        res
    }

    fn expect(&mut self, kind: TokenKind, msg: impl Into<String>) -> PResult<Token> {
        if self.check(kind) {
            Ok(self.bump())
        } else {
            Err(Self::err_at(self.peek(), msg))
        }
    }

    fn expect_ident(&mut self) -> PResult<String> {
        let t = self.peek().clone();
        if t.is(TokenKind::Ident) {
            self.bump();
            Ok(t.lexeme)
        } else {
            Err(Self::err_at(&t, format!("expected identifier, got '{}'", t.kind)))
        }
    }

    /* ───────────── Instructions ───────────── */

    fn parse_stmts(&mut self, until: TokenKind) -> PResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        loop {
            while self.eat(TokenKind::Newline) {}
            if self.check(until) {
                break;
            }
            if self.check(TokenKind::Eof) {
                return Err(Self::err_at(self.peek(), "expected right brace after block"));
            }
            stmts.push(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> PResult<Stmt> {
        let tok = self.peek().clone();
        let line = tok.line;
        let kind = match tok.kind {
            TokenKind::Func => {
                self.bump();
                self.parse_func()?
            }
            TokenKind::Return => {
                self.bump();
                if self.at_stmt_end() {
                    StmtKind::Return(None)
                } else {
                    StmtKind::Return(Some(self.parse_expr()?))
                }
            }
            TokenKind::Print => {
                self.bump();
                if self.at_stmt_end() {
                    return Err(Self::err_at(&tok, "expected expression after 'print'"));
                }
                StmtKind::Print(self.parse_expr()?)
            }
            TokenKind::LBrace => StmtKind::Block(self.parse_block()?),
            TokenKind::Ident if self.peek_kind_at(1) == TokenKind::Colon => {
                let name = self.expect_ident()?;
                self.bump(); // ':'
                let ty = self.parse_type()?;
                self.expect(TokenKind::Equal, format!("expected '=' in declaration of '{name}'"))?;
                let value = self.parse_expr()?;
                StmtKind::Declare { name, ty: Some(ty), value }
            }
            TokenKind::Ident if self.peek_kind_at(1) == TokenKind::ColonEqual => {
                let name = self.expect_ident()?;
                self.bump(); // ':='
                StmtKind::Declare { name, ty: None, value: self.parse_expr()? }
            }
            TokenKind::Ident if self.peek_kind_at(1) == TokenKind::Equal => {
                let name = self.expect_ident()?;
                self.bump(); // '='
                StmtKind::Assign { name, value: self.parse_expr()? }
            }
            _ => StmtKind::Expr(self.parse_expr()?),
        };
        self.end_stmt()?;
        Ok(Stmt::new(kind, line))
    }

    fn at_stmt_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Newline | TokenKind::Eof | TokenKind::RBrace)
    }

    fn end_stmt(&mut self) -> PResult<()> {
        let t = self.peek();
        match t.kind {
            TokenKind::Newline => {
                self.bump();
                Ok(())
            }
            TokenKind::Eof | TokenKind::RBrace => Ok(()),
            TokenKind::Equal | TokenKind::ColonEqual => {
                Err(Self::err_at(t, format!("expected identifier on left side of '{}'", t.kind)))
            }
            _ => Err(Self::err_at(t, format!("unexpected '{}' after statement", t.lexeme))),
        }
    }

    fn parse_func(&mut self) -> PResult<StmtKind> {
        let name = self.expect_ident()?;
        self.expect(TokenKind::LParen, "expected arg list")?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                let pname = self.expect_ident()?;
                self.expect(TokenKind::Colon, "expected colon before type")?;
                let ty = self.parse_type()?;
                params.push(Param { name: pname, ty });
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "expected right paren after arg list")?;
        let ret = if self.eat(TokenKind::Colon) { Some(self.parse_type()?) } else { None };
        let body = self.parse_block()?;
        Ok(StmtKind::Func { name, params, ret, body })
    }

    fn parse_block(&mut self) -> PResult<Vec<Stmt>> {
        let t = self.peek().clone();
        if !t.is(TokenKind::LBrace) {
            return Err(Self::err_at(&t, format!("expected block, found '{}'", t.kind)));
        }
        self.nested("block", |p| {
            p.bump();
            let stmts = p.parse_stmts(TokenKind::RBrace)?;
            p.bump(); // '}'
            Ok(stmts)
        })
    }

    fn parse_type(&mut self) -> PResult<Type> {
        let mut mods = Vec::new();
        loop {
            let t = self.bump();
            match t.kind {
                TokenKind::Star => mods.push(TypeMod::Pointer),
                TokenKind::LSquare => {
                    self.expect(TokenKind::RSquare, "expected ']' in array type")?;
                    mods.push(TypeMod::Array);
                }
                TokenKind::Ident => return Ok(Type { name: TypeName::from_word(&t.lexeme), mods }),
                TokenKind::Eof => return Err(Self::err_at(&t, "unexpected end of input")),
                _ => return Err(Self::err_at(&t, format!("invalid token in type: '{}'", t.kind))),
            }
        }
    }

    /* ───────────── Expressions ───────────── */

    pub fn parse_expr(&mut self) -> PResult<Expr> {
        self.parse_bp(0)
    }

    fn at_operand_end(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Newline
                | TokenKind::Eof
                | TokenKind::RParen
                | TokenKind::RSquare
                | TokenKind::RBrace
                | TokenKind::Comma
        )
    }

    // Gauche-associatif : l'opérande droite ne reprend que des opérateurs plus forts.
    fn parse_bp(&mut self, min_prec: u8) -> PResult<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let tok = self.peek().clone();
            let Some(op) = binop(tok.kind) else { break };
            let prec = op.precedence();
            if prec <= min_prec {
                break;
            }
            self.bump();
            if self.at_operand_end() {
                return Err(Self::err_at(
                    &tok,
                    format!("expected expression on right side of '{}'", op.symbol()),
                ));
            }
            let rhs = self.parse_bp(prec)?;
            lhs = Expr::new(ExprKind::Binary { op, left: Box::new(lhs), right: Box::new(rhs) }, tok.line);
        }
        Ok(lhs)
    }

    // Toute sous-expression (parenthèses, arguments, unaires) repasse par ici.
    fn parse_unary(&mut self) -> PResult<Expr> {
        self.nested("expression", Self::parse_unary_inner)
    }

    fn parse_unary_inner(&mut self) -> PResult<Expr> {
        let tok = self.peek().clone();
        let op = match tok.kind {
            TokenKind::Minus => UnOp::Neg,
            TokenKind::Not => UnOp::Not,
            _ => return self.parse_postfix(),
        };
        self.bump();
        if self.at_operand_end() {
            return Err(Self::err_at(&tok, format!("expected expression on right side of '{}'", op.symbol())));
        }
        let right = self.parse_unary()?;
        Ok(Expr::new(ExprKind::Unary { op, right: Box::new(right) }, tok.line))
    }

    fn parse_postfix(&mut self) -> PResult<Expr> {
        let mut node = self.parse_atom()?;
        loop {
            let tok = self.peek().clone();
            match tok.kind {
                TokenKind::LParen => {
                    self.bump();
                    let args = self.parse_list(TokenKind::RParen, "unmatched parentheses")?;
                    node = Expr::new(ExprKind::Call { callee: Box::new(node), args }, tok.line);
                }
                TokenKind::LSquare => {
                    self.bump();
                    if self.check(TokenKind::RSquare) {
                        return Err(Self::err_at(self.peek(), "missing expression as index"));
                    }
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::RSquare, "unmatched square brackets")?;
                    node = Expr::new(ExprKind::Index { array: Box::new(node), index: Box::new(index) }, tok.line);
                }
                _ => break,
            }
        }
        Ok(node)
    }

    /// Liste séparée par des virgules, jusqu'à `close` (consommé).
    fn parse_list(&mut self, close: TokenKind, unmatched: &str) -> PResult<Vec<Expr>> {
        let mut items = Vec::new();
        if self.eat(close) {
            return Ok(items);
        }
        loop {
            items.push(self.parse_expr()?);
            if self.eat(TokenKind::Comma) {
                continue;
            }
            self.expect(close, unmatched)?;
            return Ok(items);
        }
    }

    fn parse_atom(&mut self) -> PResult<Expr> {
        let tok = self.peek().clone();
        let line = tok.line;
        let kind = match tok.kind {
            TokenKind::Number { is_float } => {
                self.bump();
                let lit = if is_float {
                    tok.lexeme.parse().map(Lit::Float).ok()
                } else {
                    tok.lexeme.parse().map(Lit::Int).ok()
                };
                let lit = lit.ok_or_else(|| Self::err_at(&tok, format!("invalid number literal '{}'", tok.lexeme)))?;
                ExprKind::Literal(lit)
            }
            TokenKind::Str => {
                self.bump();
                ExprKind::Literal(Lit::Str(tok.string_value().to_string()))
            }
            TokenKind::True | TokenKind::False => {
                self.bump();
                ExprKind::Literal(Lit::Bool(tok.is(TokenKind::True)))
            }
            TokenKind::Ident => {
                self.bump();
                ExprKind::Variable(tok.lexeme)
            }
            TokenKind::LParen => {
                self.bump();
                if self.check(TokenKind::RParen) {
                    return Err(Self::err_at(self.peek(), "expected expression in ()"));
                }
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen, "unmatched parentheses")?;
                ExprKind::Group(Box::new(inner))
            }
            TokenKind::LSquare => {
                self.bump();
                ExprKind::Array(self.parse_list(TokenKind::RSquare, "unmatched square brackets")?)
            }
            TokenKind::Newline | TokenKind::Eof => {
                return Err(Self::err_at(&tok, "expected expression"));
            }
            k => {
                if let Some(op) = binop(k) {
                    return Err(Self::err_at(&tok, format!("expected expression on left side of '{}'", op.symbol())));
                }
                return Err(Self::err_at(&tok, format!("expected literal in expression, got '{}'", tok.lexeme)));
            }
        };
        Ok(Expr::new(kind, line))
    }
}

/* --------------------------------- Tests --------------------------------- */
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Kind;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn expr(src: &str) -> Expr {
        let prog = parse_source(src).unwrap();
        match prog.stmts.into_iter().next().map(|s| s.kind) {
            Some(StmtKind::Expr(e)) => e,
            other => panic!("attendu une expression, got {other:?}"),
        }
    }

    fn shape(e: &Expr) -> String {
        match &e.kind {
            ExprKind::Literal(Lit::Int(n)) => n.to_string(),
            ExprKind::Literal(l) => format!("{l:?}"),
            ExprKind::Variable(v) => v.clone(),
            ExprKind::Unary { op, right } => format!("({}{})", op.symbol(), shape(right)),
            ExprKind::Binary { op, left, right } => format!("({} {} {})", shape(left), op.symbol(), shape(right)),
            ExprKind::Group(g) => shape(g),
            ExprKind::Array(xs) => format!("[{}]", xs.iter().map(shape).collect::<Vec<_>>().join(", ")),
            ExprKind::Call { callee, args } => {
                format!("{}({})", shape(callee), args.iter().map(shape).collect::<Vec<_>>().join(", "))
            }
            ExprKind::Index { array, index } => format!("{}[{}]", shape(array), shape(index)),
        }
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(shape(&expr("1 + 2 * 3")), "(1 + (2 * 3))");
        assert_eq!(shape(&expr("8 - 4 - 2")), "((8 - 4) - 2)");
        assert_eq!(shape(&expr("a * b / c")), "((a * b) / c)");
        assert_eq!(shape(&expr("a || b && c == d")), "(a || (b && (c == d)))");
        assert_eq!(shape(&expr("-a + !b")), "((-a) + (!b))");
        assert_eq!(shape(&expr("(1 + 2) * 3")), "((1 + 2) * 3)");
    }

    #[test]
    fn postfix_forms() {
        assert_eq!(shape(&expr("f(1, g(x))[0]")), "f(1, g(x))[0]");
        assert_eq!(shape(&expr("[1, 2, []]")), "[1, 2, []]");
        assert_eq!(shape(&expr("string_add(a, \"b\")")), "string_add(a, Str(\"b\"))");
    }

    #[test]
    fn statements() {
        let src = indoc! {r#"
            // programme complet
            greeting: string = "hi"
            n := 3

            func add(a: int, b: int): int {
                return a + b
            }

            func main() {
                n = add(n, 1)
                print n
                println(greeting)
                return
            }
        "#};
        let prog = parse_source(src).unwrap();
        assert_eq!(prog.stmts.len(), 4);

        match &prog.stmts[0].kind {
            StmtKind::Declare { name, ty: Some(ty), .. } => {
                assert_eq!(name, "greeting");
                assert_eq!(ty.kind(), Kind::String);
            }
            other => panic!("{other:?}"),
        }
        assert!(matches!(&prog.stmts[1].kind, StmtKind::Declare { ty: None, .. }));

        let Some(StmtKind::Func { params, ret, body, .. }) = prog.function("add").map(|s| &s.kind) else {
            panic!("add manquante");
        };
        assert_eq!(params.len(), 2);
        assert_eq!(ret.as_ref().map(ToString::to_string).as_deref(), Some("int"));
        assert!(matches!(body[0].kind, StmtKind::Return(Some(_))));
        assert_eq!(body[0].line, 6);

        let Some(StmtKind::Func { body, .. }) = prog.function("main").map(|s| &s.kind) else {
            panic!("main manquante");
        };
        assert!(matches!(body[0].kind, StmtKind::Assign { .. }));
        assert!(matches!(body[1].kind, StmtKind::Print(_)));
        assert!(matches!(body[3].kind, StmtKind::Return(None)));
    }

    #[test]
    fn one_line_function() {
        let prog = parse_source("func main() { println(\"hello\") }").unwrap();
        let Some(StmtKind::Func { body, .. }) = prog.function("main").map(|s| &s.kind) else {
            panic!("main manquante");
        };
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn complex_types() {
        let prog = parse_source("p: *[]int = x").unwrap();
        let StmtKind::Declare { ty: Some(ty), .. } = &prog.stmts[0].kind else { panic!() };
        assert_eq!(ty.mods, vec![TypeMod::Pointer, TypeMod::Array]);
        assert_eq!(ty.to_string(), "*[]int");
    }

    fn err(src: &str) -> String {
        parse_source(src).unwrap_err().msg
    }

    #[test]
    fn syntax_errors() {
        assert_eq!(err("x = 1 +"), "expected expression on right side of '+'");
        assert_eq!(err("* 3"), "expected expression on left side of '*'");
        assert_eq!(err("f(1, 2"), "unmatched parentheses");
        assert_eq!(err("a[1"), "unmatched square brackets");
        assert_eq!(err("a[]"), "missing expression as index");
        assert_eq!(err("()"), "expected expression in ()");
        assert_eq!(err("func 1() {}"), "expected identifier, got 'number'");
        assert_eq!(err("func f() x"), "expected block, found 'identifier'");
        assert_eq!(err("func f() {\n  return 1\n"), "expected right brace after block");
        assert_eq!(err("x: 5 = 1"), "invalid token in type: 'number'");
        assert_eq!(err("x: int"), "expected '=' in declaration of 'x'");
        assert_eq!(err("1 = 2"), "expected identifier on left side of '='");
        assert_eq!(err("print"), "expected expression after 'print'");
    }

    #[test]
    fn nesting_is_bounded() {
        let deep = format!("x := {}1{}", "(".repeat(50_000), ")".repeat(50_000));
        assert_eq!(err(&deep), "expression nested too deeply");
        assert_eq!(err(&format!("x := {}1", "-".repeat(10_000))), "expression nested too deeply");
        assert_eq!(err(&format!("{}\n{}", "{\n".repeat(1_000), "}\n".repeat(1_000))), "block nested too deeply");

        let ok = format!("x := {}1{}", "(".repeat(MAX_NESTING / 2), ")".repeat(MAX_NESTING / 2));
        assert!(parse_source(&ok).is_ok());
    }

    #[test]
    fn errors_carry_source_line() {
        let e = parse_source("a := 1\nb := (2 + \n").unwrap_err();
        assert_eq!(e.line, 2);
        assert_eq!(e.source_line, "b := (2 + ");
    }
}
