//! Trivia classification
//!
//! Decides whether a comment's text is a plain comment or a directive by
//! longest-prefix matching against [`DIRECTIVE_TABLE`], then parses the
//! directive payload according to its family.

use crate::config::ClassifierConfiguration;
use crate::error::MarginaliaError;
use crate::result::Result;
use crate::syntax::parse_expression;
use crate::tree::{
    Clause, Comment, Directive, DirectiveFamily, DirectivePayload, HeaderForm, MarkerStyle,
    Trivia,
};
use tracing::debug;

/// One allowed keyword sequence for a directive family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectivePrefix {
    pub family: DirectiveFamily,
    pub keywords: &'static [&'static str],
}

const fn prefix(family: DirectiveFamily, keywords: &'static [&'static str]) -> DirectivePrefix {
    DirectivePrefix { family, keywords }
}

/// Every recognised directive prefix, longest first.
///
/// A new family needs an entry here and a [`DirectiveFamily`] variant.
pub static DIRECTIVE_TABLE: &[DirectivePrefix] = &[
    prefix(DirectiveFamily::OpenMpPragma, &["pragma", "omp", "parallel", "for"]),
    prefix(DirectiveFamily::OpenMpPragma, &["pragma", "omp", "parallel", "sections"]),
    prefix(DirectiveFamily::OpenMpPragma, &["pragma", "omp", "target", "teams"]),
    prefix(DirectiveFamily::OpenAccPragma, &["pragma", "acc", "parallel", "loop"]),
    prefix(DirectiveFamily::OpenAccPragma, &["pragma", "acc", "kernels", "loop"]),
    prefix(DirectiveFamily::OpenMpPragma, &["pragma", "omp", "parallel"]),
    prefix(DirectiveFamily::OpenMpPragma, &["pragma", "omp", "for"]),
    prefix(DirectiveFamily::OpenMpPragma, &["pragma", "omp", "simd"]),
    prefix(DirectiveFamily::OpenMpPragma, &["pragma", "omp", "sections"]),
    prefix(DirectiveFamily::OpenMpPragma, &["pragma", "omp", "section"]),
    prefix(DirectiveFamily::OpenMpPragma, &["pragma", "omp", "single"]),
    prefix(DirectiveFamily::OpenMpPragma, &["pragma", "omp", "master"]),
    prefix(DirectiveFamily::OpenMpPragma, &["pragma", "omp", "critical"]),
    prefix(DirectiveFamily::OpenMpPragma, &["pragma", "omp", "barrier"]),
    prefix(DirectiveFamily::OpenMpPragma, &["pragma", "omp", "atomic"]),
    prefix(DirectiveFamily::OpenMpPragma, &["pragma", "omp", "task"]),
    prefix(DirectiveFamily::OpenMpPragma, &["pragma", "omp", "target"]),
    prefix(DirectiveFamily::OpenAccPragma, &["pragma", "acc", "parallel"]),
    prefix(DirectiveFamily::OpenAccPragma, &["pragma", "acc", "kernels"]),
    prefix(DirectiveFamily::OpenAccPragma, &["pragma", "acc", "loop"]),
    prefix(DirectiveFamily::OpenAccPragma, &["pragma", "acc", "data"]),
    prefix(DirectiveFamily::OpenMpPragma, &["pragma", "omp"]),
    prefix(DirectiveFamily::OpenAccPragma, &["pragma", "acc"]),
    prefix(DirectiveFamily::Pragma, &["pragma"]),
    prefix(DirectiveFamily::Include, &["include"]),
    prefix(DirectiveFamily::Ifndef, &["ifndef"]),
    prefix(DirectiveFamily::Ifdef, &["ifdef"]),
    prefix(DirectiveFamily::If, &["if"]),
    prefix(DirectiveFamily::Elif, &["elif"]),
    prefix(DirectiveFamily::Else, &["else"]),
    prefix(DirectiveFamily::Endif, &["endif"]),
    prefix(DirectiveFamily::Define, &["define"]),
    prefix(DirectiveFamily::Define, &["def"]),
    prefix(DirectiveFamily::Undef, &["undef"]),
];

/// Where a prefix match ended in the stripped text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PrefixMatch {
    end: usize,
    colon: bool,
}

#[derive(Debug, Clone)]
pub struct TriviaClassifier {
    enabled: bool,
    families: Vec<DirectiveFamily>,
}

impl Default for TriviaClassifier {
    fn default() -> Self {
        Self {
            enabled: true,
            families: DirectiveFamily::ALL.to_vec(),
        }
    }
}

impl TriviaClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ClassifierConfiguration) -> Self {
        Self {
            enabled: config.enabled.unwrap_or(true),
            families: config
                .families
                .clone()
                .unwrap_or_else(|| DirectiveFamily::ALL.to_vec()),
        }
    }

    /// Classify the text of one comment (everything after `#`).
    ///
    /// Text that matches no enabled prefix, or whose marker is neither
    /// attached (`#pragma`) nor labelled (`# pragma:`), is a plain comment.
    pub fn classify(&self, raw: &str) -> Result<Trivia> {
        let Some((entry, matched, padded)) = self.match_directive(raw) else {
            return Ok(Trivia::Comment(Comment::new(raw, false)));
        };

        let stripped = raw.trim_start();
        let rest = stripped[matched.end..].trim();
        let payload = parse_payload(entry.family, raw, rest)?;
        debug!(
            family = entry.family.name(),
            prefix = ?entry.keywords,
            "Classified directive"
        );
        Ok(Trivia::Directive(Directive {
            family: entry.family,
            prefix: entry.keywords.iter().map(|k| (*k).to_string()).collect(),
            payload,
            marker: MarkerStyle {
                padded,
                colon: matched.colon,
            },
        }))
    }

    fn match_directive(&self, raw: &str) -> Option<(&'static DirectivePrefix, PrefixMatch, bool)> {
        if !self.enabled {
            return None;
        }
        let stripped = raw.trim_start();
        let padded = stripped.len() != raw.len();
        DIRECTIVE_TABLE
            .iter()
            .filter(|entry| self.families.contains(&entry.family))
            .find_map(|entry| {
                match_prefix(stripped, entry.keywords)
                    .filter(|matched| !padded || matched.colon)
                    .map(|matched| (entry, matched, padded))
            })
    }
}

/// Match `keywords` at the start of `text`.
///
/// Keywords are separated by whitespace; after each keyword the text must
/// end or continue with whitespace or `(`. The first keyword may also be
/// followed by `:`, which then stands in for the separator.
fn match_prefix(text: &str, keywords: &[&str]) -> Option<PrefixMatch> {
    let mut pos = 0;
    let mut colon = false;
    for (i, keyword) in keywords.iter().enumerate() {
        if i > 0 {
            let rest = &text[pos..];
            let skipped = rest.len() - rest.trim_start().len();
            if skipped == 0 && !(i == 1 && colon) {
                return None;
            }
            pos += skipped;
        }
        if !text[pos..].starts_with(keyword) {
            return None;
        }
        pos += keyword.len();
        match text[pos..].chars().next() {
            None => {}
            Some(c) if c.is_whitespace() || c == '(' => {}
            Some(':') if i == 0 => {
                colon = true;
                pos += 1;
            }
            Some(_) => return None,
        }
    }
    Some(PrefixMatch { end: pos, colon })
}

fn parse_payload(family: DirectiveFamily, raw: &str, rest: &str) -> Result<DirectivePayload> {
    let fail = |reason: String| MarginaliaError::directive_syntax(raw, reason);
    match family {
        DirectiveFamily::If | DirectiveFamily::Elif => {
            if rest.is_empty() {
                return Err(fail("missing condition".into()));
            }
            let expression = parse_expression(rest).map_err(|err| fail(err.to_string()))?;
            Ok(DirectivePayload::Expression(Box::new(expression)))
        }
        DirectiveFamily::Ifdef | DirectiveFamily::Ifndef | DirectiveFamily::Undef => {
            if !is_identifier(rest) {
                return Err(fail(format!("expected a single identifier, found '{rest}'")));
            }
            Ok(DirectivePayload::Symbol(rest.to_string()))
        }
        DirectiveFamily::Define => {
            let (name, value) = match rest.split_once(char::is_whitespace) {
                Some((name, value)) => (name, value.trim()),
                None => (rest, ""),
            };
            if !is_identifier(name) {
                return Err(fail(format!("expected a macro name, found '{name}'")));
            }
            let value = if value.is_empty() {
                None
            } else {
                let value = parse_expression(value).map_err(|err| fail(err.to_string()))?;
                Some(Box::new(value))
            };
            Ok(DirectivePayload::Definition {
                name: name.to_string(),
                value,
            })
        }
        DirectiveFamily::Else | DirectiveFamily::Endif => {
            if rest.is_empty() {
                Ok(DirectivePayload::Empty)
            } else {
                Err(fail(format!("unexpected text '{rest}'")))
            }
        }
        DirectiveFamily::Include => parse_header(rest).map_err(fail),
        DirectiveFamily::OpenMpPragma | DirectiveFamily::OpenAccPragma => {
            if rest.is_empty() {
                Ok(DirectivePayload::Empty)
            } else {
                parse_clauses(rest).map(DirectivePayload::Clauses).map_err(fail)
            }
        }
        DirectiveFamily::Pragma => {
            if rest.is_empty() {
                Ok(DirectivePayload::Empty)
            } else {
                Ok(DirectivePayload::Raw(rest.to_string()))
            }
        }
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn parse_header(rest: &str) -> std::result::Result<DirectivePayload, String> {
    let header = |path: &str, form| DirectivePayload::Header {
        path: path.to_string(),
        form,
    };
    if let Some(inner) = rest.strip_prefix('<') {
        return inner
            .strip_suffix('>')
            .filter(|path| !path.is_empty())
            .map(|path| header(path, HeaderForm::Angle))
            .ok_or_else(|| format!("malformed header '{rest}'"));
    }
    if let Some(inner) = rest.strip_prefix('"') {
        return inner
            .strip_suffix('"')
            .filter(|path| !path.is_empty())
            .map(|path| header(path, HeaderForm::Quoted))
            .ok_or_else(|| format!("malformed header '{rest}'"));
    }
    if rest.is_empty() || rest.contains(char::is_whitespace) {
        return Err(format!("expected a header path, found '{rest}'"));
    }
    Ok(header(rest, HeaderForm::Bare))
}

/// Clauses such as `private(i, j) nowait`, optionally comma separated.
fn parse_clauses(text: &str) -> std::result::Result<Vec<Clause>, String> {
    let mut clauses = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() || c == ',' {
            chars.next();
            continue;
        }
        if !(c.is_alphabetic() || c == '_') {
            return Err(format!("unexpected '{c}' in clause list"));
        }
        let mut end = start;
        while let Some(&(offset, c)) = chars.peek() {
            if !(c.is_alphanumeric() || c == '_') {
                break;
            }
            end = offset + c.len_utf8();
            chars.next();
        }
        let name = text[start..end].to_string();

        let mut arguments = None;
        if let Some(&(open, '(')) = chars.peek() {
            let mut depth = 0usize;
            let mut close = None;
            for (offset, c) in chars.by_ref() {
                match c {
                    '(' => depth += 1,
                    ')' => {
                        depth -= 1;
                        if depth == 0 {
                            close = Some(offset);
                            break;
                        }
                    }
                    _ => {}
                }
            }
            let close = close.ok_or_else(|| format!("unbalanced parentheses after '{name}'"))?;
            arguments = Some(text[open + 1..close].trim().to_string());
        }
        clauses.push(Clause { name, arguments });
    }
    Ok(clauses)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directive(raw: &str) -> Directive {
        match TriviaClassifier::new().classify(raw).unwrap() {
            Trivia::Directive(directive) => directive,
            Trivia::Comment(comment) => panic!("'{raw}' classified as comment {comment:?}"),
        }
    }

    fn is_comment(raw: &str) -> bool {
        matches!(
            TriviaClassifier::new().classify(raw).unwrap(),
            Trivia::Comment(_)
        )
    }

    #[test]
    fn test_table_is_longest_first() {
        assert!(
            DIRECTIVE_TABLE
                .windows(2)
                .all(|pair| pair[0].keywords.len() >= pair[1].keywords.len())
        );
    }

    #[test]
    fn test_labelled_openmp_prefix_is_consumed_in_full() {
        let directive = directive("pragma: omp parallel for");
        assert_eq!(directive.family, DirectiveFamily::OpenMpPragma);
        assert_eq!(directive.prefix, vec!["pragma", "omp", "parallel", "for"]);
        assert_eq!(directive.payload, DirectivePayload::Empty);
        assert_eq!(
            directive.marker,
            MarkerStyle {
                padded: false,
                colon: true
            }
        );
    }

    #[test]
    fn test_prefix_boundary() {
        assert!(is_comment("pragmatic"));
        assert!(is_comment("zzz unknown"));
        assert!(is_comment(" if you want to change this"));
        assert!(is_comment("includes"));

        let directive = directive("pragma acc data copy(a)");
        assert_eq!(directive.family, DirectiveFamily::OpenAccPragma);
        assert_eq!(directive.prefix, vec!["pragma", "acc", "data"]);
        assert_eq!(
            self::directive("pragma accelerate").family,
            DirectiveFamily::Pragma
        );
    }

    #[test]
    fn test_openmp_clauses() {
        let directive = directive("pragma omp parallel for private(i, j) schedule(static, 4) nowait");
        assert_eq!(
            directive.payload,
            DirectivePayload::Clauses(vec![
                Clause {
                    name: "private".into(),
                    arguments: Some("i, j".into())
                },
                Clause {
                    name: "schedule".into(),
                    arguments: Some("static, 4".into())
                },
                Clause {
                    name: "nowait".into(),
                    arguments: None
                },
            ])
        );
        let err = TriviaClassifier::new()
            .classify("pragma omp for reduction(+:x")
            .unwrap_err();
        assert!(matches!(err, MarginaliaError::DirectiveSyntax { .. }));
    }

    #[test]
    fn test_conditional_payloads() {
        let directive = directive("if defined(DEBUG) and LEVEL > 2");
        assert!(matches!(directive.payload, DirectivePayload::Expression(_)));
        assert_eq!(
            self::directive("ifdef FEATURE").payload,
            DirectivePayload::Symbol("FEATURE".into())
        );
        assert_eq!(self::directive("endif").payload, DirectivePayload::Empty);
        assert_eq!(
            self::directive(" else:").marker,
            MarkerStyle {
                padded: true,
                colon: true
            }
        );

        let err = TriviaClassifier::new().classify("if )").unwrap_err();
        assert!(err.to_string().contains("'#if )'"));
        assert!(TriviaClassifier::new().classify("ifdef two words").is_err());
        assert!(TriviaClassifier::new().classify("endif trailing").is_err());
    }

    #[test]
    fn test_define_and_include() {
        assert!(matches!(
            directive("define LIMIT 10").payload,
            DirectivePayload::Definition { ref name, value: Some(_) } if name == "LIMIT"
        ));
        assert_eq!(directive("def X").prefix, vec!["def"]);
        assert_eq!(
            directive("include <cstdio>").payload,
            DirectivePayload::Header {
                path: "cstdio".into(),
                form: HeaderForm::Angle
            }
        );
        assert_eq!(
            directive(" include: my_header.h").payload,
            DirectivePayload::Header {
                path: "my_header.h".into(),
                form: HeaderForm::Bare
            }
        );
        assert!(TriviaClassifier::new().classify("include <open").is_err());
    }

    #[test]
    fn test_configuration_restricts_families() {
        let classifier = TriviaClassifier::from_config(&ClassifierConfiguration {
            enabled: Some(true),
            families: Some(vec![DirectiveFamily::Pragma]),
        });
        let Trivia::Directive(directive) = classifier.classify("pragma omp parallel").unwrap()
        else {
            panic!("expected a directive");
        };
        assert_eq!(directive.family, DirectiveFamily::Pragma);
        assert_eq!(
            directive.payload,
            DirectivePayload::Raw("omp parallel".into())
        );
        assert!(matches!(
            classifier.classify("endif").unwrap(),
            Trivia::Comment(_)
        ));

        let disabled = TriviaClassifier::from_config(&ClassifierConfiguration {
            enabled: Some(false),
            families: None,
        });
        assert!(matches!(
            disabled.classify("pragma once").unwrap(),
            Trivia::Comment(_)
        ));
    }
}
