//! Symbol table and built-in function registry.
//!
//! Symbols live in an arena addressed by [`SymbolId`].  Built-in functions
//! are preloaded from a process-wide registry; variables are appended as
//! the parser meets them.  The table itself only finds and inserts; the
//! permissive declare-on-miss behavior and the "declared twice" report on
//! a duplicate insertion live with the parser, which owns the diagnostics.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::ast::ExprId;

/// Signature shared by every built-in function.
pub type RealFn = fn(f64) -> f64;

/// The built-in unary real functions, in registry order.
///
/// `log` is the base-10 logarithm and `ln` the natural one, following the
/// usual calculator convention.
pub static BUILTIN_TABLE: [(&str, RealFn); 19] = [
    ("sin", f64::sin),
    ("cos", f64::cos),
    ("tan", f64::tan),
    ("asin", f64::asin),
    ("acos", f64::acos),
    ("atan", f64::atan),
    ("sinh", f64::sinh),
    ("cosh", f64::cosh),
    ("tanh", f64::tanh),
    ("asinh", f64::asinh),
    ("acosh", f64::acosh),
    ("atanh", f64::atanh),
    ("exp", f64::exp),
    ("ln", f64::ln),
    ("log", f64::log10),
    ("log10", f64::log10),
    ("abs", f64::abs),
    ("sqrt", f64::sqrt),
    ("cbrt", f64::cbrt),
];

static BUILTINS: Lazy<FxHashMap<&'static str, RealFn>> =
    Lazy::new(|| BUILTIN_TABLE.iter().copied().collect());

/// Looks a name up in the built-in registry.
pub fn builtin(name: &str) -> Option<RealFn> {
    BUILTINS.get(name).copied()
}

/// Handle into a [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolId(u32);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Value category of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Undef,
    Int,
    Bool,
}

/// A table entry: a user variable or a preloaded built-in.
#[derive(Debug)]
pub enum Symbol {
    Var {
        name: String,
        ty: Type,
        /// Expression last assigned to this variable, if any.
        val: Option<ExprId>,
        /// Declaration rank among variables.
        slot: usize,
    },
    Builtin {
        name: &'static str,
        func: RealFn,
    },
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Var { name, .. } => name,
            Symbol::Builtin { name, .. } => name,
        }
    }
}

/// Arena of symbols with a by-name index for variables.
#[derive(Debug)]
pub struct SymbolTable {
    syms: Vec<Symbol>,
    vars: FxHashMap<String, SymbolId>,
    next_slot: usize,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Fresh table with the built-in functions preloaded.
    pub fn new() -> Self {
        let mut table = Self {
            syms: Vec::new(),
            vars: FxHashMap::default(),
            next_slot: 0,
        };
        for &(name, func) in BUILTIN_TABLE.iter() {
            table.syms.push(Symbol::Builtin { name, func });
        }
        table
    }

    /// Whether `name` is a built-in and so cannot be a `let` target.
    pub fn is_reserved(&self, name: &str) -> bool {
        BUILTINS.contains_key(name)
    }

    /// Declares a variable unconditionally.  Returns its id and whether a
    /// variable of that name already existed; the duplicate is appended
    /// anyway and shadows the old entry in the index.
    pub fn insert(&mut self, name: &str) -> (SymbolId, bool) {
        let duplicate = self.vars.contains_key(name);
        let id = SymbolId(self.syms.len() as u32);
        let slot = self.next_slot;
        self.next_slot += 1;
        self.syms.push(Symbol::Var {
            name: name.to_string(),
            ty: Type::Int,
            val: None,
            slot,
        });
        self.vars.insert(name.to_string(), id);
        (id, duplicate)
    }

    /// Finds a variable by name.  Built-ins are never returned here; they
    /// are reached through [`builtin`].
    pub fn find(&self, name: &str) -> Option<SymbolId> {
        self.vars.get(name).copied()
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.syms[id.index()]
    }

    pub fn name_of(&self, id: SymbolId) -> &str {
        self.get(id).name()
    }

    /// Records the expression assigned to a variable.
    pub fn bind(&mut self, id: SymbolId, expr: ExprId) {
        if let Symbol::Var { val, .. } = &mut self.syms[id.index()] {
            *val = Some(expr);
        }
    }

    /// Expression last assigned to a variable, if it is a bound variable.
    pub fn value_of(&self, id: SymbolId) -> Option<ExprId> {
        match self.get(id) {
            Symbol::Var { val, .. } => *val,
            Symbol::Builtin { .. } => None,
        }
    }

    pub fn len(&self) -> usize {
        self.syms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.syms.is_empty()
    }

    /// Iterates over the declared variables in declaration order.
    pub fn variables(&self) -> impl Iterator<Item = &Symbol> {
        self.syms
            .iter()
            .filter(|s| matches!(s, Symbol::Var { .. }))
    }
}
