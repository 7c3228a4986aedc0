//! Abstract syntax tree for the expression language.
//!
//! Expressions live in an arena ([`ExprArena`]) and refer to each other
//! through [`ExprId`] handles, which lets symbols point at the expression
//! last assigned to them without any sharing machinery.  Operand slots are
//! `Option<ExprId>`: `None` appears only where error recovery gave up on a
//! subexpression, and the traversals treat it as the value 0.

use std::ops::Index;

use crate::parser::symtab::{SymbolId, SymbolTable};

pub mod dump;
pub mod mathml;
pub mod value;

/// Handle into an [`ExprArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExprId(u32);

impl ExprId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Equ,
    Neq,
    Lss,
    Leq,
    Gtr,
    Geq,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Pow,
}

/// Unary operators (prefix `-`/`~`, postfix `!`/`²`/`³`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
    Fact,
    Sqr,
    Cub,
}

/// Expression nodes.
#[derive(Debug, Clone)]
pub enum Expr {
    Binary {
        op: BinOp,
        left: Option<ExprId>,
        right: Option<ExprId>,
    },
    Unary {
        op: UnOp,
        operand: Option<ExprId>,
    },
    Ident {
        sym: SymbolId,
    },
    Number {
        val: f64,
    },
    Bool {
        val: bool,
    },
    Call {
        name: String,
        arg: Option<ExprId>,
    },
    /// Explicit parenthesization; kept so rendering can fence the group.
    Paren {
        inner: Option<ExprId>,
    },
}

/// Statement nodes.
#[derive(Debug, Clone)]
pub enum Stat {
    /// An expression statement, with an optional `let` target.
    Assignment {
        target: Option<SymbolId>,
        value: Option<ExprId>,
    },
    /// A `;`-separated statement list.
    Block(Vec<Stat>),
}

/// Flat arena owning every expression of a program.
#[derive(Debug, Default)]
pub struct ExprArena {
    nodes: Vec<Expr>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, expr: Expr) -> ExprId {
        let id = ExprId(self.nodes.len() as u32);
        self.nodes.push(expr);
        id
    }

    pub fn get(&self, id: ExprId) -> &Expr {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Index<ExprId> for ExprArena {
    type Output = Expr;

    fn index(&self, id: ExprId) -> &Expr {
        self.get(id)
    }
}

/// A parsed program: the statement tree plus the arenas it refers into.
#[derive(Debug)]
pub struct Program {
    pub exprs: ExprArena,
    pub symbols: SymbolTable,
    pub block: Stat,
}

impl Program {
    /// The program's statements, in source order.
    pub fn statements(&self) -> &[Stat] {
        match &self.block {
            Stat::Block(stats) => stats,
            Stat::Assignment { .. } => std::slice::from_ref(&self.block),
        }
    }
}
