use crate::ast::Decor;
use crate::error::Error;
use crate::eval::types::{FuncType, SemanticType};
use crate::grammer::token::Span;
use indexmap::IndexMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global, // function declarations
    Func,   // parameters
    Local,  // variables of one compound statement
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Func,
    Param,
    Var,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    pub symtab: IndexMap<String, SymbolId>,
    pub parent: Option<ScopeId>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub scope: ScopeId,
    pub span: Span,
    pub ty: Decor<SemanticType>,
    pub offset: Decor<i64>,
}

/// Arena of every scope and symbol of one program.
///
/// Scopes refer to their parent and symbols to their scope through indices
/// into this table, so the parent chain can never own itself.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    /// A table holding only the global scope.
    pub fn new(span: Span) -> Self {
        SymbolTable {
            scopes: vec![Scope {
                kind: ScopeKind::Global,
                symtab: IndexMap::new(),
                parent: None,
                span,
            }],
            symbols: Vec::new(),
        }
    }

    pub fn global(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn new_scope(&mut self, kind: ScopeKind, parent: ScopeId, span: Span) -> ScopeId {
        self.scopes.push(Scope {
            kind,
            symtab: IndexMap::new(),
            parent: Some(parent),
            span,
        });
        ScopeId(self.scopes.len() - 1)
    }

    /// Declare `name` in `scope`. A second declaration in the same scope is a NameError.
    pub fn declare(
        &mut self,
        scope: ScopeId,
        name: &str,
        kind: SymbolKind,
        span: Span,
    ) -> Result<SymbolId, Error> {
        if self.scopes[scope.0].symtab.contains_key(name) {
            return Err(Error::name(
                format!("'{}' is already declared in this scope", name),
                span,
            ));
        }
        let id = SymbolId(self.symbols.len());
        self.symbols.push(Symbol {
            name: name.to_string(),
            kind,
            scope,
            span,
            ty: Decor::default(),
            offset: Decor::default(),
        });
        self.scopes[scope.0].symtab.insert(name.to_string(), id);
        tracing::trace!("declare {} {:?} in {:?}", name, kind, scope);
        Ok(id)
    }

    /// Innermost declaration of `name` visible from `scope`.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.ancestors(scope)
            .find_map(|id| self.scopes[id.0].symtab.get(name).copied())
    }

    /// `scope` followed by its enclosing scopes up to the global one.
    pub fn ancestors(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(scope), |id| self.scopes[id.0].parent)
    }

    /// Number of parent links between `scope` and the global scope.
    pub fn depth(&self, scope: ScopeId) -> usize {
        self.ancestors(scope).count() - 1
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.0]
    }

    pub fn scopes(&self) -> impl Iterator<Item = (ScopeId, &Scope)> {
        self.scopes.iter().enumerate().map(|(i, s)| (ScopeId(i), s))
    }

    pub fn symbols(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols.iter().enumerate().map(|(i, s)| (SymbolId(i), s))
    }

    /// Signature of a function symbol.
    pub fn func_type(&self, id: SymbolId) -> Result<&FuncType, Error> {
        let sym = self.symbol(id);
        sym.ty
            .need(&sym.name)?
            .as_func()
            .ok_or_else(|| Error::internal(format!("'{}' is not a function", sym.name)))
    }

    pub fn func_type_mut(&mut self, id: SymbolId) -> Result<&mut FuncType, Error> {
        let sym = self.symbol_mut(id);
        match sym.ty.need_mut(&sym.name)? {
            SemanticType::Func(func) => Ok(func),
            _ => Err(Error::internal(format!("'{}' is not a function", sym.name))),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.symtab.keys().map(String::as_str).collect();
        names.sort_unstable();
        write!(f, "{:?}Scope({}) at {}", self.kind, names.join(", "), self.span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SymbolTable {
        SymbolTable::new(Span::default())
    }

    #[test]
    fn lookup_walks_parents() {
        let mut table = table();
        let global = table.global();
        let f = table
            .declare(global, "f", SymbolKind::Func, Span::default())
            .unwrap();
        let func = table.new_scope(ScopeKind::Func, global, Span::default());
        let x = table
            .declare(func, "x", SymbolKind::Param, Span::default())
            .unwrap();
        let block = table.new_scope(ScopeKind::Local, func, Span::default());

        assert_eq!(table.lookup(block, "x"), Some(x));
        assert_eq!(table.lookup(block, "f"), Some(f));
        assert_eq!(table.lookup(global, "x"), None);
        assert_eq!(table.depth(block), 2);
        assert_eq!(table.depth(global), 0);
        assert_eq!(table.ancestors(block).last(), Some(global));
    }

    #[test]
    fn shadowing() {
        let mut table = table();
        let global = table.global();
        let func = table.new_scope(ScopeKind::Func, global, Span::default());
        let outer = table
            .declare(func, "x", SymbolKind::Param, Span::default())
            .unwrap();
        let block = table.new_scope(ScopeKind::Local, func, Span::default());
        let inner = table
            .declare(block, "x", SymbolKind::Var, Span::default())
            .unwrap();

        assert_ne!(outer, inner);
        assert_eq!(table.lookup(block, "x"), Some(inner));
        assert_eq!(table.lookup(func, "x"), Some(outer));
    }

    #[test]
    fn duplicate_is_name_error() {
        let mut table = table();
        let global = table.global();
        table
            .declare(global, "f", SymbolKind::Func, Span::default())
            .unwrap();
        let err = table
            .declare(global, "f", SymbolKind::Func, Span::default())
            .unwrap_err();
        assert!(matches!(err, Error::Name { .. }));
    }
}
