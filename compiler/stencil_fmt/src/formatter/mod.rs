//! Formatter Core
//!
//! Walks a [`Template`] and writes it back as source in a target dialect.
//!
//! Two layouts exist. In the *template* layout every statement sits in its
//! own code span (`{{ … }}` for native code and all outputs, `{% … %}` for
//! Liquid tags) and literal text is written in place. In the *script*
//! layout (script-only templates and front matter) statements are written
//! one per line with native keywords, indented by block depth.
//!
//! # Modules
//!
//! - [`stmt`]: Statement and block rendering
//! - [`expr`]: Expression rendering with precedence-driven parentheses

mod expr;
mod stmt;

use stencil_ir::{Dialect, ScriptMode, StmtId, StmtKind, Template, TemplateArena};

use crate::emitter::Emitter;
use crate::text::{escape_text, raw_block};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Layout {
    Template,
    Script,
}

/// Writes template ASTs as source into an [`Emitter`].
pub struct TemplateFormatter<'a, E: Emitter> {
    arena: &'a TemplateArena,
    emitter: E,
    dialect: Dialect,
    layout: Layout,
    depth: usize,
}

impl<'a, E: Emitter> TemplateFormatter<'a, E> {
    pub fn new(arena: &'a TemplateArena, dialect: Dialect, emitter: E) -> Self {
        TemplateFormatter {
            arena,
            emitter,
            dialect,
            layout: Layout::Template,
            depth: 0,
        }
    }

    /// Consume the formatter, returning the emitter.
    pub fn finish(self) -> E {
        self.emitter
    }

    /// Write a whole template for re-parsing under `mode`.
    ///
    /// Front matter is only expressible in [`ScriptMode::FrontMatter`]; in
    /// other modes its statements are written ahead of the body, where they
    /// run in the same order.
    pub fn format_template(&mut self, template: &Template, mode: ScriptMode) {
        match (mode, template.front_matter) {
            (ScriptMode::ScriptOnly, front) => {
                self.layout = Layout::Script;
                if let Some(front) = front {
                    self.block(front);
                }
                self.block(template.body);
            }
            (ScriptMode::FrontMatter, Some(front)) => {
                self.emitter.emit("+++");
                self.emitter.emit_newline();
                self.layout = Layout::Script;
                self.block(front);
                self.layout = Layout::Template;
                self.emitter.emit("+++");
                self.emitter.emit_newline();
                self.block(template.body);
            }
            (ScriptMode::FrontMatter, None) => {
                let body = self.arena.stmt_list(template.body);
                let rest = match body.split_first() {
                    Some((&first, rest)) if self.guard_marker_line(first) => rest,
                    _ => body,
                };
                for &id in rest {
                    self.stmt(id);
                }
            }
            (ScriptMode::Default, front) => {
                if let Some(front) = front {
                    self.block(front);
                }
                self.block(template.body);
            }
        }
    }

    /// Write a leading `+++` line of body text with its first character in
    /// a raw block so it does not read as a front matter marker. Returns
    /// whether `first` was written.
    fn guard_marker_line(&mut self, first: StmtId) -> bool {
        let StmtKind::Text(name) = self.arena.stmt(first).kind else {
            return false;
        };
        let text = self.arena.name(name);
        let line = text.split('\n').next().unwrap_or_default();
        if line.trim() != "+++" {
            return false;
        }
        let plus = text.find('+').unwrap_or_default();
        let (head, tail) = text.split_at(plus + 1);
        self.emitter.emit(&escape_text(&head[..plus], self.dialect));
        self.emitter.emit(&raw_block("+", self.dialect).unwrap_or_default());
        self.emitter.emit(&escape_text(tail, self.dialect));
        true
    }

    /// Native keywords and pipe syntax apply.
    fn native(&self) -> bool {
        self.dialect == Dialect::Native || self.layout == Layout::Script
    }

    /// Start a statement: `{{ `, `{% ` or indentation.
    fn open_stmt(&mut self) {
        match (self.layout, self.dialect) {
            (Layout::Script, _) => self.emitter.emit_indent(self.depth),
            (Layout::Template, Dialect::Native) => self.emitter.emit("{{ "),
            (Layout::Template, Dialect::Liquid) => self.emitter.emit("{% "),
        }
    }

    fn close_stmt(&mut self) {
        match (self.layout, self.dialect) {
            (Layout::Script, _) => self.emitter.emit_newline(),
            (Layout::Template, Dialect::Native) => self.emitter.emit(" }}"),
            (Layout::Template, Dialect::Liquid) => self.emitter.emit(" %}"),
        }
    }

    /// Start an output statement; Liquid outputs use `{{ }}` rather than a tag.
    fn open_output(&mut self) {
        match self.layout {
            Layout::Script => self.emitter.emit_indent(self.depth),
            Layout::Template => self.emitter.emit("{{ "),
        }
    }

    fn close_output(&mut self) {
        match self.layout {
            Layout::Script => self.emitter.emit_newline(),
            Layout::Template => self.emitter.emit(" }}"),
        }
    }

    /// A statement made of a single keyword.
    fn keyword_stmt(&mut self, native: &str, liquid: &str) {
        self.open_stmt();
        let word = if self.native() { native } else { liquid };
        self.emitter.emit(word);
        self.close_stmt();
    }
}
