//! Statement and block rendering.

use stencil_ir::{ElseBranch, ExprId, ForLoop, StmtId, StmtKind, StmtRange, WhenRange};
use stencil_stack::ensure_sufficient_stack;

use super::expr::prec;
use super::{Layout, TemplateFormatter};
use crate::emitter::Emitter;
use crate::text::{escape_text, quote_string, raw_block};

impl<E: Emitter> TemplateFormatter<'_, E> {
    pub(super) fn block(&mut self, range: StmtRange) {
        let arena = self.arena;
        for &id in arena.stmt_list(range) {
            self.stmt(id);
        }
    }

    /// A block body, indented one level in the script layout.
    fn nested(&mut self, range: StmtRange) {
        self.depth += 1;
        self.block(range);
        self.depth -= 1;
    }

    pub(super) fn stmt(&mut self, id: StmtId) {
        ensure_sufficient_stack(|| self.stmt_inner(id));
    }

    fn stmt_inner(&mut self, id: StmtId) {
        let arena = self.arena;
        match &arena.stmt(id).kind {
            StmtKind::Text(text) => self.text(arena.name(*text)),
            StmtKind::Raw(text) => self.raw(arena.name(*text)),
            StmtKind::Output(value) => {
                self.open_output();
                self.expr(*value);
                self.close_output();
            }
            StmtKind::Assign { target, value } => {
                self.open_stmt();
                if !self.native() {
                    self.emitter.emit("assign ");
                }
                self.expr_at(*target, prec::POSTFIX);
                self.emitter.emit(" = ");
                self.expr(*value);
                self.close_stmt();
            }
            StmtKind::If { .. } => self.if_chain(id),
            StmtKind::For(header) => self.for_loop(header),
            StmtKind::While { cond, body } => {
                self.header("while", *cond, prec::LAMBDA);
                self.nested(*body);
                self.end("endwhile");
            }
            StmtKind::With { target, body } => {
                self.header("with", *target, prec::LAMBDA);
                self.nested(*body);
                self.end("endwith");
            }
            StmtKind::Case {
                subject,
                whens,
                else_block,
            } => self.case(*subject, *whens, *else_block),
            StmtKind::Capture { target, body } => {
                self.header("capture", *target, prec::POSTFIX);
                self.nested(*body);
                self.end("endcapture");
            }
            StmtKind::FuncDef { name, params, body } => {
                self.open_stmt();
                self.emitter.emit("func ");
                self.emitter.emit(arena.name(*name));
                self.params(arena.name_list(*params));
                self.close_stmt();
                self.nested(*body);
                self.end("endfunc");
            }
            StmtKind::Break => self.keyword_stmt("break", "break"),
            StmtKind::Continue => self.keyword_stmt("continue", "continue"),
            StmtKind::Return(None) => self.keyword_stmt("ret", "ret"),
            StmtKind::Return(Some(value)) => self.header("ret", *value, prec::LAMBDA),
            StmtKind::Import(value) => self.header("import", *value, prec::LAMBDA),
            StmtKind::Include(value) => self.header("include", *value, prec::LAMBDA),
            StmtKind::Error => {}
        }
    }

    fn text(&mut self, text: &str) {
        match self.layout {
            Layout::Template => self.emitter.emit(&escape_text(text, self.dialect)),
            Layout::Script => self.literal_output(text),
        }
    }

    fn raw(&mut self, text: &str) {
        if self.layout == Layout::Script {
            self.literal_output(text);
            return;
        }
        match raw_block(text, self.dialect) {
            Some(block) => self.emitter.emit(&block),
            None => self.emitter.emit(&escape_text(text, self.dialect)),
        }
    }

    /// Literal text inside code: an output of a string literal.
    fn literal_output(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.open_output();
        self.emitter.emit(&quote_string(text));
        self.close_output();
    }

    /// `keyword expr` as a statement of its own.
    fn header(&mut self, keyword: &str, value: ExprId, min: u8) {
        self.open_stmt();
        self.emitter.emit(keyword);
        self.emitter.emit_space();
        self.expr_at(value, min);
        self.close_stmt();
    }

    fn end(&mut self, liquid: &str) {
        self.keyword_stmt("end", liquid);
    }

    /// `if`/`else if`/`else` chains are written flat.
    fn if_chain(&mut self, id: StmtId) {
        let arena = self.arena;
        let mut current = id;
        let mut keyword = "if";
        loop {
            let StmtKind::If {
                cond,
                then_block,
                else_branch,
            } = arena.stmt(current).kind
            else {
                self.nested_stmt(current);
                break;
            };
            self.header(keyword, cond, prec::LAMBDA);
            self.nested(then_block);
            match else_branch {
                ElseBranch::None => break,
                ElseBranch::ElseIf(next) if matches!(arena.stmt(next).kind, StmtKind::If { .. }) => {
                    current = next;
                    keyword = if self.native() { "else if" } else { "elsif" };
                }
                ElseBranch::ElseIf(next) => {
                    self.keyword_stmt("else", "else");
                    self.nested_stmt(next);
                    break;
                }
                ElseBranch::Block(block) => {
                    self.keyword_stmt("else", "else");
                    self.nested(block);
                    break;
                }
            }
        }
        self.end("endif");
    }

    fn nested_stmt(&mut self, id: StmtId) {
        self.depth += 1;
        self.stmt(id);
        self.depth -= 1;
    }

    fn for_loop(&mut self, header: &ForLoop) {
        let arena = self.arena;
        let has_params = header.limit.is_some() || header.offset.is_some() || header.reversed;
        // A native pipe would take `reversed` as one more argument.
        let iterable_min = if has_params && self.native() {
            prec::OR
        } else {
            prec::LAMBDA
        };

        self.open_stmt();
        self.emitter.emit("for ");
        self.emitter.emit(arena.name(header.var));
        self.emitter.emit(" in ");
        self.expr_at(header.iterable, iterable_min);
        if let Some(limit) = header.limit {
            self.emitter.emit(" limit: ");
            self.expr_at(limit, prec::OR);
        }
        if let Some(offset) = header.offset {
            self.emitter.emit(" offset: ");
            self.expr_at(offset, prec::OR);
        }
        if header.reversed {
            self.emitter.emit(" reversed");
        }
        self.close_stmt();

        self.nested(header.body);
        if let Some(else_block) = header.else_block {
            self.keyword_stmt("else", "else");
            self.nested(else_block);
        }
        self.end("endfor");
    }

    fn case(&mut self, subject: ExprId, whens: WhenRange, else_block: Option<StmtRange>) {
        let arena = self.arena;
        self.header("case", subject, prec::LAMBDA);
        for when in arena.whens(whens) {
            self.open_stmt();
            self.emitter.emit("when ");
            for (i, &value) in arena.expr_list(when.values).iter().enumerate() {
                if i > 0 {
                    self.emitter.emit(", ");
                }
                self.expr_at(value, prec::AND);
            }
            self.close_stmt();
            self.nested(when.body);
        }
        if let Some(else_block) = else_block {
            self.keyword_stmt("else", "else");
            self.nested(else_block);
        }
        self.end("endcase");
    }
}
