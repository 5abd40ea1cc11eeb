//! Render configuration and the include loader hook.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::registry::AccessorRegistry;

/// Default maximum iterations of a single loop.
pub const DEFAULT_LOOP_LIMIT: usize = 1000;

/// Default maximum nesting of function calls and includes.
pub const DEFAULT_CALL_DEPTH_LIMIT: usize = 100;

/// Why a template could not be loaded.
#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
pub enum LoadError {
    #[error("template not found")]
    NotFound,
    #[error("{0}")]
    Other(String),
}

/// Supplies the source text of included templates.
pub trait TemplateLoader: Send + Sync {
    fn load(&self, name: &str) -> Result<String, LoadError>;
}

impl<F> TemplateLoader for F
where
    F: Fn(&str) -> Result<String, LoadError> + Send + Sync,
{
    fn load(&self, name: &str) -> Result<String, LoadError> {
        self(name)
    }
}

/// A loader over an in-memory name → source table.
#[derive(Clone, Default, Debug)]
pub struct MemoryLoader {
    templates: FxHashMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(name, source);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.templates.insert(name.into(), source.into());
    }
}

impl TemplateLoader for MemoryLoader {
    fn load(&self, name: &str) -> Result<String, LoadError> {
        self.templates.get(name).cloned().ok_or(LoadError::NotFound)
    }
}

/// Limits and hooks for one render.
///
/// A limit of `0` disables that limit.
#[derive(Clone)]
pub struct RenderOptions {
    pub loop_limit: usize,
    pub call_depth_limit: usize,
    /// Reading an unbound name is an error instead of `null`.
    pub strict_variables: bool,
    /// Failed member and index lookups yield `null` instead of an error.
    pub relaxed_member_access: bool,
    pub loader: Option<Arc<dyn TemplateLoader>>,
    /// Falls back to [`AccessorRegistry::global`].
    pub registry: Option<Arc<AccessorRegistry>>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            loop_limit: DEFAULT_LOOP_LIMIT,
            call_depth_limit: DEFAULT_CALL_DEPTH_LIMIT,
            strict_variables: false,
            relaxed_member_access: false,
            loader: None,
            registry: None,
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_loop_limit(mut self, limit: usize) -> Self {
        self.loop_limit = limit;
        self
    }

    #[must_use]
    pub fn with_call_depth_limit(mut self, limit: usize) -> Self {
        self.call_depth_limit = limit;
        self
    }

    #[must_use]
    pub fn with_strict_variables(mut self, strict: bool) -> Self {
        self.strict_variables = strict;
        self
    }

    #[must_use]
    pub fn with_relaxed_member_access(mut self, relaxed: bool) -> Self {
        self.relaxed_member_access = relaxed;
        self
    }

    #[must_use]
    pub fn with_loader(mut self, loader: impl TemplateLoader + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    #[must_use]
    pub fn with_registry(mut self, registry: Arc<AccessorRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn registry(&self) -> &AccessorRegistry {
        match &self.registry {
            Some(registry) => registry,
            None => AccessorRegistry::global(),
        }
    }
}

impl fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderOptions")
            .field("loop_limit", &self.loop_limit)
            .field("call_depth_limit", &self.call_depth_limit)
            .field("strict_variables", &self.strict_variables)
            .field("relaxed_member_access", &self.relaxed_member_access)
            .field("loader", &self.loader.is_some())
            .field("registry", &self.registry.is_some())
            .finish()
    }
}
