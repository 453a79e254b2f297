//! Round-trip validation
//!
//! A source unit passes when
//! 1. splicing adds exactly one node per trivia token,
//! 2. `parse(unparse_plain(tree))` has the structure of the plain tree,
//! 3. re-parsing the augmented rendering with trivia gives back the
//!    augmented tree,
//! 4. every trivia node sits in a field that accepts trivia,
//! 5. stripping the trivia again leaves exactly the plain tree.
//!
//! Structure is compared through [`dump`], so spans and whitespace do not
//! count.
//!
//! # Example
//!
//! ```rust
//! use marginalia_core::round_trip::RoundTripValidator;
//!
//! let result = RoundTripValidator::new()
//!     .validate("x = [1,  # one\n     2]\n")
//!     .unwrap();
//! assert!(result.is_valid());
//! ```

use crate::config::MarginaliaConfig;
use crate::diagnostics::TracingSink;
use crate::pipeline::Pipeline;
use crate::result::Result;
use crate::syntax::{SpanRetention, parse_module, trivia_tokens};
use crate::tree::{DumpOptions, Node, check_trivia_placement, dump, flatten, strip_trivia};
use crate::unparse::{AugmentedUnparser, PlainUnparser, PrinterOptions};
use serde::Serialize;
use tracing::debug;

/// Outcome of validating one source unit
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub original: String,
    /// Rendering of the augmented tree
    pub rendered: String,
    /// Number of trivia tokens in the original
    pub trivia_count: usize,
    pub differences: Vec<Difference>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.differences.is_empty()
    }

    /// One line per difference.
    pub fn issues(&self) -> Vec<String> {
        self.differences
            .iter()
            .map(|difference| format!("{}: {}", difference.kind.label(), difference.description))
            .collect()
    }
}

/// A failed check
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Difference {
    pub kind: DifferenceKind,
    pub description: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DifferenceKind {
    /// The augmented tree does not hold one extra node per token
    TriviaCount,
    /// A rendering failed to parse again
    ReparseFailed,
    /// The plain rendering re-parses to a different structure
    PlainStructure,
    /// The augmented rendering re-parses to a different tree
    AugmentedStructure,
    /// A trivia node was spliced where no trivia may go
    TriviaPlacement,
    /// Removing the trivia does not give back the plain tree
    StrippedStructure,
}

impl DifferenceKind {
    pub fn label(&self) -> &'static str {
        match self {
            DifferenceKind::TriviaCount => "trivia count",
            DifferenceKind::ReparseFailed => "re-parse failed",
            DifferenceKind::PlainStructure => "plain structure",
            DifferenceKind::AugmentedStructure => "augmented structure",
            DifferenceKind::TriviaPlacement => "trivia placement",
            DifferenceKind::StrippedStructure => "stripped structure",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RoundTripValidator {
    pipeline: Pipeline,
    options: PrinterOptions,
}

impl RoundTripValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(pipeline: Pipeline, options: PrinterOptions) -> Self {
        Self { pipeline, options }
    }

    pub fn from_config(config: &MarginaliaConfig) -> Self {
        Self {
            pipeline: Pipeline::from_config(config),
            options: PrinterOptions::from(&config.printer_config()),
        }
    }

    /// Run every check on `source`.
    ///
    /// Errors on the original source are returned as errors; failures on
    /// the renderings are reported as differences.
    pub fn validate(&self, source: &str) -> Result<ValidationResult> {
        let plain = parse_module(source, SpanRetention::Native)?;
        let tokens = trivia_tokens(source)?;
        let augmented = self
            .pipeline
            .insert_trivia(source, plain.clone(), &tokens, &mut TracingSink)?;

        let mut differences = Vec::new();

        let expected_count = flatten(&plain, false).len() + tokens.len();
        let actual_count = flatten(&augmented, false).len();
        if expected_count != actual_count {
            differences.push(Difference {
                kind: DifferenceKind::TriviaCount,
                description: format!(
                    "{} tokens spliced into {} nodes",
                    tokens.len(),
                    actual_count
                ),
                expected: Some(expected_count.to_string()),
                actual: Some(actual_count.to_string()),
            });
        }

        if let Err(err) = check_trivia_placement(&augmented) {
            differences.push(Difference {
                kind: DifferenceKind::TriviaPlacement,
                description: err.to_string(),
                expected: None,
                actual: None,
            });
        }

        let mut stripped = augmented.clone();
        strip_trivia(&mut stripped);
        compare(
            &plain,
            &stripped,
            DumpOptions::default(),
            DifferenceKind::StrippedStructure,
            &mut differences,
        );

        let plain_text = PlainUnparser::new(self.options).unparse(&plain);
        match parse_module(&plain_text, SpanRetention::Native) {
            Ok(reparsed) => compare(
                &plain,
                &reparsed,
                DumpOptions::without_trivia(),
                DifferenceKind::PlainStructure,
                &mut differences,
            ),
            Err(err) => differences.push(reparse_failure("plain", &err.to_string())),
        }

        let rendered = AugmentedUnparser::new(self.options).unparse(&augmented);
        match self.pipeline.parse(&rendered) {
            Ok(reparsed) => compare(
                &augmented,
                &reparsed,
                DumpOptions::default(),
                DifferenceKind::AugmentedStructure,
                &mut differences,
            ),
            Err(err) => differences.push(reparse_failure("augmented", &err.to_string())),
        }

        debug!(
            tokens = tokens.len(),
            differences = differences.len(),
            "Validated round trip"
        );
        Ok(ValidationResult {
            original: source.to_string(),
            rendered,
            trivia_count: tokens.len(),
            differences,
        })
    }
}

fn compare(
    expected: &Node,
    actual: &Node,
    options: DumpOptions,
    kind: DifferenceKind,
    differences: &mut Vec<Difference>,
) {
    let expected = dump(expected, options);
    let actual = dump(actual, options);
    if expected == actual {
        return;
    }
    let offset = expected
        .char_indices()
        .zip(actual.chars())
        .find(|((_, a), b)| a != b)
        .map_or_else(|| expected.len().min(actual.len()), |((offset, _), _)| offset);
    differences.push(Difference {
        kind,
        description: format!("dumps diverge at offset {offset}"),
        expected: Some(expected),
        actual: Some(actual),
    });
}

fn reparse_failure(rendering: &str, error: &str) -> Difference {
    Difference {
        kind: DifferenceKind::ReparseFailed,
        description: format!("{rendering} rendering does not parse: {error}"),
        expected: None,
        actual: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MarginaliaError;

    #[test]
    fn test_commented_source_round_trips() {
        let source = "# setup\ndef f(a, b=2):  # signature\n    #pragma omp parallel for\n    for i in a:\n        b += i\n    return b\n";
        let result = RoundTripValidator::new().validate(source).unwrap();
        assert!(result.is_valid(), "{:?}", result.issues());
        assert_eq!(result.trivia_count, 3);
        assert!(result.rendered.contains("#pragma omp parallel for"));
    }

    #[test]
    fn test_else_header_comment_round_trips() {
        let source = "while a:\n    a -= 1  # step\nelse:  # done\n    b = a\n";
        let result = RoundTripValidator::new().validate(source).unwrap();
        assert!(result.is_valid(), "{:?}", result.issues());
        assert_eq!(result.rendered, source);
    }

    #[test]
    fn test_source_without_trivia() {
        let result = RoundTripValidator::new()
            .validate("x = 1, 2\nprint(x)\n")
            .unwrap();
        assert!(result.is_valid());
        assert_eq!(result.trivia_count, 0);
        assert_eq!(result.rendered, "x = (1, 2)\nprint(x)\n");
    }

    #[test]
    fn test_original_errors_are_errors() {
        let err = RoundTripValidator::new().validate("x = (\n").unwrap_err();
        assert!(matches!(err, MarginaliaError::Syntax { .. }));
    }

    #[test]
    fn test_validation_result_methods() {
        let result = ValidationResult {
            original: "x\n".into(),
            rendered: "x\n".into(),
            trivia_count: 0,
            differences: vec![Difference {
                kind: DifferenceKind::TriviaCount,
                description: "1 tokens spliced into 2 nodes".into(),
                expected: Some("3".into()),
                actual: Some("2".into()),
            }],
        };
        assert!(!result.is_valid());
        assert_eq!(
            result.issues(),
            vec!["trivia count: 1 tokens spliced into 2 nodes".to_string()]
        );
        assert_eq!(DifferenceKind::TriviaPlacement.label(), "trivia placement");
    }

    #[test]
    fn test_compare_reports_offset() {
        let a = parse_module("x = 1\n", SpanRetention::Native).unwrap();
        let b = parse_module("x = 2\n", SpanRetention::Native).unwrap();
        let mut differences = Vec::new();
        compare(
            &a,
            &b,
            DumpOptions::default(),
            DifferenceKind::PlainStructure,
            &mut differences,
        );
        assert_eq!(differences.len(), 1);
        assert!(differences[0].description.starts_with("dumps diverge at offset"));
    }
}
