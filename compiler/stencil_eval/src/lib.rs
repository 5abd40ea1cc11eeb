//! Stencil evaluator.
//!
//! Walks a parsed [`Template`](stencil_ir::Template) against a data model and
//! produces text. The pieces, bottom up:
//!
//! - [`Value`] and the shared containers [`ScriptObject`] / [`ScriptArray`]
//! - [`AccessorRegistry`]: member and index access over script values and
//!   host Rust values alike
//! - [`Environment`]: the scope stack
//! - builtins: the static function table templates can call
//! - [`Interpreter`] / [`render`]: statement and expression evaluation
//!
//! ```
//! use stencil_eval::{render, RenderOptions, Value};
//! use stencil_parse::{parse, ParseOptions};
//!
//! let parsed = parse("Hello {{ name | upcase }}!", ParseOptions::default());
//! let model = Value::object([("name", Value::from("world"))]);
//! let text = render(&parsed.template, &model, &RenderOptions::default()).unwrap();
//! assert_eq!(text, "Hello WORLD!");
//! ```

mod builtins;
mod environment;
mod errors;
mod interpreter;
mod operators;
mod options;
mod registry;
mod unary_operators;
mod value;

pub use builtins::{lookup as lookup_builtin, names as builtin_names, Builtin, BuiltinContext};
pub use environment::{Environment, HiddenScopes, Scope, ScopeKind};
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use interpreter::{render, Flow, FrameGuard, Interpreter, ScopedInterpreter};
pub use operators::{evaluate_binary, sort_order};
pub use options::{
    LoadError, MemoryLoader, RenderOptions, TemplateLoader, DEFAULT_CALL_DEPTH_LIMIT,
    DEFAULT_LOOP_LIMIT,
};
pub use registry::{
    camel_case, identity, snake_case, AccessError, Accessor, AccessorRegistry, Capabilities,
    FixedSeq, HostMap, HostSeq, HostType, MemberDef, MemberKey, MemberTable, NamingPolicy,
    OpaqueAccessor, Reflect, ReflectAccessor, MAX_INDEX_GROWTH,
};
pub use unary_operators::evaluate_unary;
pub use value::{
    values_equal, AccessorBuilder, FromValue, FunctionValue, HostValue, Lambda, RangeValue,
    ScriptArray, ScriptFunction, ScriptObject, ToValue, Value,
};
