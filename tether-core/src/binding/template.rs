//! Text templates.
//!
//! A template is the original text of a text node, split into literal runs
//! and `{{path}}` tokens in document order. Rendering walks the segments in
//! that order, so repeated keys and multiple keys always land where the
//! author put them.

use std::sync::OnceLock;

use indexmap::IndexSet;
use regex::Regex;

use crate::error::BindError;
use crate::reactive::KeyPath;

const TOKEN: &str = r"\{\{([A-Za-z_$][A-Za-z0-9_]*(?:\.[A-Za-z_$][A-Za-z0-9_]*)*)\}\}";

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(TOKEN).expect("token pattern is valid"))
}

/// One piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Token(KeyPath),
}

/// A parsed text template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Split `source` into literals and tokens.
    ///
    /// Text without any token parses as a single literal and is never
    /// rejected. Once a token is present, every `{{` and `}}` must belong to
    /// a token; a stray delimiter fails with
    /// [`BindError::MalformedTemplate`].
    pub fn parse(source: &str) -> Result<Self, BindError> {
        let mut segments = Vec::new();
        let mut cursor = 0;

        for caps in token_pattern().captures_iter(source) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            push_literal(&mut segments, source, cursor, whole.start())?;
            segments.push(Segment::Token(KeyPath::parse(name.as_str())?));
            cursor = whole.end();
        }

        if segments.is_empty() {
            // No tokens: keep the text verbatim, stray braces and all.
            if !source.is_empty() {
                segments.push(Segment::Literal(source.to_owned()));
            }
        } else {
            push_literal(&mut segments, source, cursor, source.len())?;
        }

        Ok(Self {
            source: source.to_owned(),
            segments,
        })
    }

    /// The original text, placeholders included.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn has_tokens(&self) -> bool {
        self.segments
            .iter()
            .any(|segment| matches!(segment, Segment::Token(_)))
    }

    /// Distinct key paths in order of first appearance.
    pub fn keys(&self) -> Vec<KeyPath> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Token(path) => Some(path.clone()),
                Segment::Literal(_) => None,
            })
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect()
    }

    /// Concatenate the segments, resolving each token through `resolve`.
    pub fn render<F>(&self, mut resolve: F) -> String
    where
        F: FnMut(&KeyPath) -> String,
    {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Token(path) => out.push_str(&resolve(path)),
            }
        }
        out
    }
}

fn push_literal(
    segments: &mut Vec<Segment>,
    source: &str,
    start: usize,
    end: usize,
) -> Result<(), BindError> {
    let literal = &source[start..end];

    let open = literal.find("{{");
    let close = literal.find("}}");
    let stray = match (open, close) {
        (Some(o), Some(c)) if c < o => Some((c, "`}}` without an opening `{{`")),
        (Some(o), _) => Some((o, "`{{` does not start a valid key path token")),
        (None, Some(c)) => Some((c, "`}}` without an opening `{{`")),
        (None, None) => None,
    };
    if let Some((offset, reason)) = stray {
        return Err(BindError::MalformedTemplate {
            template: source.to_owned(),
            offset: start + offset,
            reason,
        });
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal.to_owned()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(raw: &str) -> KeyPath {
        KeyPath::parse(raw).unwrap()
    }

    #[test]
    fn splits_literals_and_tokens_in_order() {
        let template = Template::parse("A {{x}} B {{y}} C").unwrap();
        assert_eq!(
            template.segments(),
            &[
                Segment::Literal("A ".into()),
                Segment::Token(path("x")),
                Segment::Literal(" B ".into()),
                Segment::Token(path("y")),
                Segment::Literal(" C".into()),
            ]
        );
        assert_eq!(template.source(), "A {{x}} B {{y}} C");
    }

    #[test]
    fn keys_are_distinct_in_first_appearance_order() {
        let template = Template::parse("{{b}}{{a}}{{b}} {{user.name}}").unwrap();
        assert_eq!(template.keys(), vec![path("b"), path("a"), path("user.name")]);
    }

    #[test]
    fn render_visits_tokens_in_template_order() {
        let template = Template::parse("{{x}}-{{y}}-{{x}}").unwrap();
        let out = template.render(|p| match p.to_string().as_str() {
            "x" => "1".into(),
            _ => "2".into(),
        });
        assert_eq!(out, "1-2-1");
    }

    #[test]
    fn text_without_tokens_is_kept_verbatim() {
        for source in ["plain text", "", "a {{ not a token }} b", "{{1abc}}", "}} {{"] {
            let template = Template::parse(source).unwrap();
            assert!(!template.has_tokens(), "{source:?}");
            assert_eq!(template.render(|_| unreachable!()), source);
        }
    }

    #[test]
    fn stray_delimiters_next_to_tokens_are_rejected() {
        let err = Template::parse("{{name}} and {{ broken").unwrap_err();
        assert_eq!(
            err,
            BindError::MalformedTemplate {
                template: "{{name}} and {{ broken".into(),
                offset: 13,
                reason: "`{{` does not start a valid key path token",
            }
        );

        let err = Template::parse("oops}} {{name}}").unwrap_err();
        assert!(matches!(err, BindError::MalformedTemplate { offset: 4, .. }));
    }

    #[test]
    fn single_braces_are_literal() {
        let template = Template::parse("{{{name}}}").unwrap();
        assert_eq!(template.render(|_| "v".into()), "{v}");
    }

    #[test]
    fn dollar_prefixed_identifiers_are_tokens() {
        let template = Template::parse("{{$price}}").unwrap();
        assert_eq!(template.keys(), vec![path("$price")]);
    }
}
