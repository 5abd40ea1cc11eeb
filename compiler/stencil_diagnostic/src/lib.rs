//! Diagnostics for the Stencil template engine.
//!
//! Every diagnostic carries:
//! - an [`ErrorCode`] for searchability
//! - a [`Severity`]
//! - a message saying what went wrong
//! - labeled spans saying where

mod diagnostic;
mod error_code;
pub mod report;
pub mod span_utils;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use report::{render, ReportOptions};
pub use span_utils::{span_line_col, LineOffsetTable};
