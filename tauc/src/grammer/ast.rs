use super::token::Span;
use crate::error::Error;
use crate::eval::symbols::{ScopeId, SymbolId};
use crate::eval::types::SemanticType;
use arch::{Reg, ALU};
use std::fmt;

/// A slot filled in by a later pass. Starts unset and may be written once.
#[derive(Debug, Clone, PartialEq)]
pub struct Decor<T>(Option<T>);

impl<T> Default for Decor<T> {
    fn default() -> Self {
        Decor(None)
    }
}

impl<T: fmt::Debug> Decor<T> {
    pub fn set(&mut self, val: T, what: &str) -> Result<(), Error> {
        if let Some(old) = &self.0 {
            return Err(Error::internal(format!(
                "{} decorated twice ({:?}, then {:?})",
                what, old, val
            )));
        }
        self.0 = Some(val);
        Ok(())
    }

    /// The decoration, or an internal error naming the missing slot.
    pub fn need(&self, what: &str) -> Result<&T, Error> {
        self.0
            .as_ref()
            .ok_or_else(|| Error::internal(format!("{} is not decorated", what)))
    }

    pub fn need_mut(&mut self, what: &str) -> Result<&mut T, Error> {
        self.0
            .as_mut()
            .ok_or_else(|| Error::internal(format!("{} is not decorated", what)))
    }
}

impl<T> Decor<T> {
    pub fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Program {
    pub funcs: Vec<FuncDecl>, // { func-decl }
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Id {
    pub name: String,
    pub span: Span,
    pub sym: Decor<SymbolId>,
    pub ty: Decor<SemanticType>,
}

// ----------------------------------------------------------------------------
// Declarations
// ----------------------------------------------------------------------------

/// "func" id "(" [ param { "," param } ] ")" [ ":" type ] compound
#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub id: Id,
    pub params: Vec<ParamDecl>,
    pub ret: TypeAst,
    pub body: CompoundStmt,
    pub span: Span,
    pub scope: Decor<ScopeId>,
    pub ty: Decor<SemanticType>,
}

/// id ":" type
#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub id: Id,
    pub type_ast: TypeAst,
    pub span: Span,
    pub ty: Decor<SemanticType>,
}

/// "var" id ":" type
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub id: Id,
    pub type_ast: TypeAst,
    pub span: Span,
    pub ty: Decor<SemanticType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAst {
    pub kind: TypeAstKind,
    pub span: Span,
    pub ty: Decor<SemanticType>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeAstKind {
    Int,                        // "int"
    Bool,                       // "bool"
    Void,                       // "void"
    Array(usize, Box<TypeAst>), // "[" int "]" type
}

// ----------------------------------------------------------------------------
// Statements
// ----------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Print(Expr),                                     // "print" expr
    Compound(CompoundStmt),                          // "{" { var-decl } { stmt } "}"
    Assign(Expr, Expr),                              // expr "=" expr
    If(Expr, CompoundStmt, Option<CompoundStmt>),    // "if" expr compound [ "else" compound ]
    While(Expr, CompoundStmt),                       // "while" expr compound
    Call(Expr),                                      // [ "call" ] call-expr
    Return(Option<Expr>),                            // "return" [ expr ]
}

#[derive(Debug, Clone)]
pub struct CompoundStmt {
    pub decls: Vec<VarDecl>,
    pub stmts: Vec<Stmt>,
    pub span: Span,
    pub scope: Decor<ScopeId>,
}

// ----------------------------------------------------------------------------
// Expressions
// ----------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    pub ty: Decor<SemanticType>,
    pub reg: Decor<Reg>,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Binary(BinaryOp, Box<Expr>, Box<Expr>), // expr binop expr
    Unary(UnaryOp, Box<Expr>),              // ( "not" | "-" ) expr
    ArrayCell(Box<Expr>, Box<Expr>),        // expr "[" expr "]"
    Call(Box<Expr>, Vec<Argument>),         // expr "(" [ arg { "," arg } ] ")"
    Id(Id),                                 // id
    Int(i64),                               // int-lit
    Bool(bool),                             // "true" | "false"
}

#[derive(Debug, Clone)]
pub struct Argument {
    pub expr: Expr,
    pub span: Span,
    pub ty: Decor<SemanticType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add, // "+"
    Sub, // "-"
    Mul, // "*"
    Div, // "/"
    Mod, // "%"
    Eq,  // "=="
    Ne,  // "!="
    Lt,  // "<"
    Le,  // "<="
    Gt,  // ">"
    Ge,  // ">="
    And, // "and"
    Or,  // "or"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg, // "-"
    Not, // "not"
}

// ----------------------------------------------------------------------------
// Constructors
// ----------------------------------------------------------------------------

impl Id {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Id {
            name: name.into(),
            span,
            sym: Decor::default(),
            ty: Decor::default(),
        }
    }
}

impl TypeAst {
    pub fn new(kind: TypeAstKind, span: Span) -> Self {
        TypeAst {
            kind,
            span,
            ty: Decor::default(),
        }
    }
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr {
            kind,
            span,
            ty: Decor::default(),
            reg: Decor::default(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            ExprKind::Binary(..) => "BinaryOp",
            ExprKind::Unary(..) => "UnaryOp",
            ExprKind::ArrayCell(..) => "ArrayCell",
            ExprKind::Call(..) => "CallExpr",
            ExprKind::Id(_) => "IdExpr",
            ExprKind::Int(_) => "IntLiteral",
            ExprKind::Bool(_) => "BoolLiteral",
        }
    }
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            StmtKind::Print(_) => "PrintStmt",
            StmtKind::Compound(_) => "CompoundStmt",
            StmtKind::Assign(..) => "AssignStmt",
            StmtKind::If(..) => "IfStmt",
            StmtKind::While(..) => "WhileStmt",
            StmtKind::Call(_) => "CallStmt",
            StmtKind::Return(_) => "ReturnStmt",
        }
    }
}

impl CompoundStmt {
    pub fn new(decls: Vec<VarDecl>, stmts: Vec<Stmt>, span: Span) -> Self {
        CompoundStmt {
            decls,
            stmts,
            span,
            scope: Decor::default(),
        }
    }
}

// ----------------------------------------------------------------------------
// Operators
// ----------------------------------------------------------------------------

impl BinaryOp {
    pub fn is_arith(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod
        )
    }

    pub fn is_equality(self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::Ne)
    }

    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    /// Machine operation computing this operator on scalars.
    pub fn alu(self) -> Option<ALU> {
        match self {
            BinaryOp::Add => Some(ALU::ADD),
            BinaryOp::Sub => Some(ALU::SUB),
            BinaryOp::Mul => Some(ALU::MUL),
            BinaryOp::Div => Some(ALU::DIV),
            BinaryOp::Mod => Some(ALU::MOD),
            BinaryOp::Eq => Some(ALU::EQ),
            BinaryOp::Ne => Some(ALU::NEQ),
            BinaryOp::Lt => Some(ALU::LT),
            BinaryOp::Le => Some(ALU::LE),
            BinaryOp::Gt => Some(ALU::GT),
            BinaryOp::Ge => Some(ALU::GE),
            BinaryOp::And | BinaryOp::Or => None,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        };
        write!(f, "{}", text)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Not => write!(f, "not"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoration_is_written_once() {
        let mut slot: Decor<i64> = Decor::default();
        assert!(!slot.is_set());
        assert!(matches!(slot.need("offset"), Err(Error::Internal(_))));
        slot.set(3, "offset").unwrap();
        assert_eq!(slot.need("offset").unwrap(), &3);
        assert!(matches!(slot.set(4, "offset"), Err(Error::Internal(_))));
        assert_eq!(slot.get(), Some(&3));
    }

    #[test]
    fn operator_classes() {
        assert!(BinaryOp::Mod.is_arith());
        assert!(BinaryOp::Ne.is_equality());
        assert!(BinaryOp::Ge.is_ordering());
        assert!(BinaryOp::Or.is_logical());
        assert_eq!(BinaryOp::And.alu(), None);
        assert_eq!(BinaryOp::Le.alu(), Some(ALU::LE));
        assert_eq!(BinaryOp::Ne.to_string(), "!=");
    }
}
