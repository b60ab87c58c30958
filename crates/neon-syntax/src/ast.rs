//! ast.rs — Arbre syntaxique neon
//!
//! Chaque nœud porte sa ligne source (pour les erreurs du compilateur et
//! de l'interpréteur).

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/* ───────────────────────── Types ───────────────────────── */

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TypeName {
    Int,
    Float,
    Bool,
    String,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    /// Type défini par l'utilisateur
    User(String),
}

impl TypeName {
    pub fn from_word(word: &str) -> Self {
        match word {
            "int" => Self::Int,
            "float" => Self::Float,
            "bool" => Self::Bool,
            "string" => Self::String,
            "char" => Self::Char,
            "i8" => Self::I8,
            "i16" => Self::I16,
            "i32" => Self::I32,
            "i64" => Self::I64,
            "u8" => Self::U8,
            "u16" => Self::U16,
            "u32" => Self::U32,
            "u64" => Self::U64,
            "f32" => Self::F32,
            "f64" => Self::F64,
            other => Self::User(other.to_string()),
        }
    }

    pub fn word(&self) -> &str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Char => "char",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::User(s) => s,
        }
    }
}

/// Modificateur de type, dans l'ordre d'écriture (`*[]int` → `[Pointer, Array]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TypeMod {
    Pointer,
    Array,
}

/// Famille de valeurs d'un type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Kind {
    None,
    Int,
    Float,
    Bool,
    String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Type {
    pub name: TypeName,
    pub mods: Vec<TypeMod>,
}

impl Type {
    pub fn simple(name: TypeName) -> Self {
        Self { name, mods: Vec::new() }
    }

    pub fn kind(&self) -> Kind {
        if !self.mods.is_empty() {
            return Kind::None;
        }
        match self.name {
            TypeName::Bool => Kind::Bool,
            TypeName::Int
            | TypeName::I8
            | TypeName::I16
            | TypeName::I32
            | TypeName::I64
            | TypeName::U8
            | TypeName::U16
            | TypeName::U32
            | TypeName::U64 => Kind::Int,
            TypeName::Float | TypeName::F32 | TypeName::F64 => Kind::Float,
            TypeName::Char | TypeName::String => Kind::String,
            TypeName::User(_) => Kind::None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in &self.mods {
            f.write_str(match m {
                TypeMod::Pointer => "*",
                TypeMod::Array => "[]",
            })?;
        }
        f.write_str(self.name.word())
    }
}

/* ───────────────────────── Expressions ───────────────────────── */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UnOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BinOp {
    Or,
    And,
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl UnOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Not => "!",
        }
    }
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Or => "||",
            Self::And => "&&",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
        }
    }

    /// Puissance de liaison (plus grand = lie plus fort).
    pub fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq | Self::Ne | Self::Gt | Self::Lt | Self::Ge | Self::Le => 3,
            Self::Add | Self::Sub => 4,
            Self::Mul | Self::Div | Self::Mod => 5,
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(self, Self::Eq | Self::Ne | Self::Gt | Self::Lt | Self::Ge | Self::Le)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Lit {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExprKind {
    Literal(Lit),
    Variable(String),
    Unary { op: UnOp, right: Box<Expr> },
    Binary { op: BinOp, left: Box<Expr>, right: Box<Expr> },
    Group(Box<Expr>),
    Array(Vec<Expr>),
    Call { callee: Box<Expr>, args: Vec<Expr> },
    Index { array: Box<Expr>, index: Box<Expr> },
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Expr {
    pub kind: ExprKind,
    pub line: u32,
}

impl Expr {
    pub fn new(kind: ExprKind, line: u32) -> Self {
        Self { kind, line }
    }

    /// Nom de l'appelé si c'est un identifiant simple.
    pub fn as_variable(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Variable(name) => Some(name),
            _ => None,
        }
    }
}

/* ───────────────────────── Instructions ───────────────────────── */

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Param {
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StmtKind {
    Expr(Expr),
    Print(Expr),
    Return(Option<Expr>),
    Func { name: String, params: Vec<Param>, ret: Option<Type>, body: Vec<Stmt> },
    /// `x: T = e` (ty = Some) ou `x := e` (ty = None)
    Declare { name: String, ty: Option<Type>, value: Expr },
    Assign { name: String, value: Expr },
    Block(Vec<Stmt>),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: u32,
}

impl Stmt {
    pub fn new(kind: StmtKind, line: u32) -> Self {
        Self { kind, line }
    }
}

/// Un fichier source analysé.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

impl Program {
    /// Recherche une fonction de premier niveau.
    pub fn function(&self, name: &str) -> Option<&Stmt> {
        self.stmts
            .iter()
            .find(|s| matches!(&s.kind, StmtKind::Func { name: n, .. } if n == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(Type::simple(TypeName::from_word("i32")).kind(), Kind::Int);
        assert_eq!(Type::simple(TypeName::from_word("char")).kind(), Kind::String);
        assert_eq!(Type::simple(TypeName::from_word("vec3")).kind(), Kind::None);
        let t = Type { name: TypeName::Int, mods: vec![TypeMod::Pointer, TypeMod::Array] };
        assert_eq!(t.kind(), Kind::None);
        assert_eq!(t.to_string(), "*[]int");
    }

    #[test]
    fn precedence_order() {
        assert!(BinOp::Or.precedence() < BinOp::And.precedence());
        assert!(BinOp::Lt.precedence() < BinOp::Add.precedence());
        assert!(BinOp::Sub.precedence() < BinOp::Mod.precedence());
    }
}
