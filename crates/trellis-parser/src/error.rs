//! Error and diagnostic system for the Trellis pipeline.
//!
//! The system is built around the [`Diagnostic`] type: a single error or
//! warning with an optional phase-grouped [`ErrorCode`], one or more
//! labeled source spans, and optional help text. Phases accumulate
//! diagnostics through a [`DiagnosticCollector`] instead of failing on
//! the first problem, and return them wrapped in a [`ParseError`].
//!
//! Error codes are grouped by phase:
//! - `E0xx` lexer
//! - `E1xx` parser
//! - `E2xx` structural validation
//! - `E3xx` template expansion
//! - `E4xx` profile conversion
//! - `E5xx` layout
//!
//! # Example
//!
//! ```
//! # use trellis_parser::error::{Diagnostic, ErrorCode};
//! # use trellis_parser::Span;
//!
//! let dup = Span::new(100..120);
//! let first = Span::new(50..70);
//!
//! let diag = Diagnostic::error("node `pump` is declared twice")
//!     .with_code(ErrorCode::E200)
//!     .with_label(dup, "duplicate declaration")
//!     .with_secondary_label(first, "first declared here")
//!     .with_help("rename one of the declarations");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub use collector::DiagnosticCollector;
pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
