//! Flat storage for one template's nodes.

use crate::{Name, NameTable};

use super::{
    EntryRange, Expr, ExprId, ExprRange, NameRange, ObjectEntry, Stmt, StmtId, StmtRange,
    WhenClause, WhenRange,
};

/// Arena holding every node, list and interned string of a template.
///
/// Nodes are appended during parsing and never removed; ids stay valid for
/// the arena's lifetime.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct TemplateArena {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
    expr_lists: Vec<ExprId>,
    stmt_lists: Vec<StmtId>,
    name_lists: Vec<Name>,
    entries: Vec<ObjectEntry>,
    whens: Vec<WhenClause>,
    names: NameTable,
}

fn to_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

impl TemplateArena {
    pub fn new() -> Self {
        Self::default()
    }

    // Allocation

    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::new(to_u32(self.exprs.len()));
        self.exprs.push(expr);
        id
    }

    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId::new(to_u32(self.stmts.len()));
        self.stmts.push(stmt);
        id
    }

    pub fn alloc_expr_list(&mut self, items: impl IntoIterator<Item = ExprId>) -> ExprRange {
        let start = to_u32(self.expr_lists.len());
        self.expr_lists.extend(items);
        ExprRange::new(start, to_u32(self.expr_lists.len()) - start)
    }

    pub fn alloc_stmt_list(&mut self, items: impl IntoIterator<Item = StmtId>) -> StmtRange {
        let start = to_u32(self.stmt_lists.len());
        self.stmt_lists.extend(items);
        StmtRange::new(start, to_u32(self.stmt_lists.len()) - start)
    }

    pub fn alloc_name_list(&mut self, items: impl IntoIterator<Item = Name>) -> NameRange {
        let start = to_u32(self.name_lists.len());
        self.name_lists.extend(items);
        NameRange::new(start, to_u32(self.name_lists.len()) - start)
    }

    pub fn alloc_entries(&mut self, items: impl IntoIterator<Item = ObjectEntry>) -> EntryRange {
        let start = to_u32(self.entries.len());
        self.entries.extend(items);
        EntryRange::new(start, to_u32(self.entries.len()) - start)
    }

    pub fn alloc_whens(&mut self, items: impl IntoIterator<Item = WhenClause>) -> WhenRange {
        let start = to_u32(self.whens.len());
        self.whens.extend(items);
        WhenRange::new(start, to_u32(self.whens.len()) - start)
    }

    pub fn intern(&mut self, text: &str) -> Name {
        self.names.intern(text)
    }

    // Access

    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    #[inline]
    pub fn expr_list(&self, range: ExprRange) -> &[ExprId] {
        &self.expr_lists[range.to_range()]
    }

    #[inline]
    pub fn stmt_list(&self, range: StmtRange) -> &[StmtId] {
        &self.stmt_lists[range.to_range()]
    }

    #[inline]
    pub fn name_list(&self, range: NameRange) -> &[Name] {
        &self.name_lists[range.to_range()]
    }

    #[inline]
    pub fn entries(&self, range: EntryRange) -> &[ObjectEntry] {
        &self.entries[range.to_range()]
    }

    #[inline]
    pub fn whens(&self, range: WhenRange) -> &[WhenClause] {
        &self.whens[range.to_range()]
    }

    #[inline]
    pub fn name(&self, name: Name) -> &str {
        self.names.lookup(name)
    }

    pub fn names(&self) -> &NameTable {
        &self.names
    }

    /// Every expression in allocation order.
    pub fn all_exprs(&self) -> &[Expr] {
        &self.exprs
    }

    /// Every statement in allocation order.
    pub fn all_stmts(&self) -> &[Stmt] {
        &self.stmts
    }
}
