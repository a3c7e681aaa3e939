//! The Trellis error taxonomy.
//!
//! Every pipeline failure is a [`TrellisError`] wrapping the
//! accumulated diagnostics of the phase that produced it:
//!
//! - [`TrellisError::Syntax`]: malformed source, recoverable by fixing
//!   the source and re-parsing
//! - [`TrellisError::Structural`]: duplicate ids, unresolved
//!   references, containment cycles, nesting depth; blocks conversion
//!   and layout
//! - [`TrellisError::Expansion`]: template id collisions or
//!   unresolvable data fields; blocks progression past expansion
//! - [`TrellisError::Domain`]: a converter found a required
//!   per-domain field missing; blocks that profile only
//! - [`TrellisError::Layout`]: an unresolvable rank cycle inside one
//!   layout unit; blocks that unit only
//!
//! Nothing in the pipeline is fatal to the host process: every failure
//! is a returned value.

use thiserror::Error;

use trellis_core::data::ResolveError;
use trellis_parser::{ErrorCode, ParseError};

/// Top-level error for the Trellis pipeline.
#[derive(Debug, Error)]
pub enum TrellisError {
    /// Malformed source text (lexer or parser diagnostics).
    #[error("syntax error: {0}")]
    Syntax(ParseError),

    /// A structural invariant does not hold.
    #[error("structural error: {0}")]
    Structural(ParseError),

    /// Template expansion failed.
    #[error("expansion error: {0}")]
    Expansion(ParseError),

    /// A profile converter rejected its input.
    #[error("domain error: {0}")]
    Domain(ParseError),

    /// Layout could not rank one of the profile's units.
    #[error("layout error: {0}")]
    Layout(ParseError),

    /// The embedder's data resolver could not materialize a source.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl TrellisError {
    /// Classify a front-end [`ParseError`] by the phase that emitted
    /// it. Front-end phases run strictly in sequence, so the codes in
    /// one error all belong to a single phase.
    pub(crate) fn from_front_end(err: ParseError) -> Self {
        let structural = err
            .diagnostics()
            .iter()
            .filter_map(|d| d.code())
            .any(|code| {
                matches!(
                    code,
                    ErrorCode::E200
                        | ErrorCode::E201
                        | ErrorCode::E202
                        | ErrorCode::E203
                        | ErrorCode::E204
                )
            });
        if structural {
            TrellisError::Structural(err)
        } else {
            TrellisError::Syntax(err)
        }
    }

    /// The diagnostics behind this error, when it carries any.
    pub fn diagnostics(&self) -> &[trellis_parser::Diagnostic] {
        match self {
            TrellisError::Syntax(err)
            | TrellisError::Structural(err)
            | TrellisError::Expansion(err)
            | TrellisError::Domain(err)
            | TrellisError::Layout(err) => err.diagnostics(),
            TrellisError::Resolve(_) => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_parser::Diagnostic;

    #[test]
    fn test_front_end_classification() {
        let syntax: ParseError =
            Diagnostic::error("bad token").with_code(ErrorCode::E100).into();
        assert!(matches!(
            TrellisError::from_front_end(syntax),
            TrellisError::Syntax(_)
        ));

        let structural: ParseError = Diagnostic::error("duplicate")
            .with_code(ErrorCode::E200)
            .into();
        assert!(matches!(
            TrellisError::from_front_end(structural),
            TrellisError::Structural(_)
        ));
    }

    #[test]
    fn test_diagnostics_accessor() {
        let err = TrellisError::Domain(
            Diagnostic::error("part has no kind")
                .with_code(ErrorCode::E400)
                .into(),
        );
        assert_eq!(err.diagnostics().len(), 1);
    }
}
