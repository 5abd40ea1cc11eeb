//! The compiled template.

use std::sync::Arc;

use crate::{Dialect, StmtRange};

use super::TemplateArena;

/// A parsed template: immutable once built and shareable across threads.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Template {
    /// Node storage, shared so values created while rendering (functions,
    /// lambdas) can keep the code they point into alive.
    pub arena: Arc<TemplateArena>,
    /// Statements of the `+++` block, when present.
    pub front_matter: Option<StmtRange>,
    pub body: StmtRange,
    pub dialect: Dialect,
    source: Arc<str>,
}

impl Template {
    pub fn new(
        arena: TemplateArena,
        front_matter: Option<StmtRange>,
        body: StmtRange,
        dialect: Dialect,
        source: Arc<str>,
    ) -> Self {
        Template {
            arena: Arc::new(arena),
            front_matter,
            body,
            dialect,
            source,
        }
    }

    /// An empty template, used when lexing aborts.
    pub fn empty(dialect: Dialect, source: Arc<str>) -> Self {
        Template::new(TemplateArena::new(), None, StmtRange::EMPTY, dialect, source)
    }

    /// Source text the spans index into.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn shared_source(&self) -> Arc<str> {
        Arc::clone(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn template_is_send_sync() {
        assert_send_sync::<Template>();
    }
}
