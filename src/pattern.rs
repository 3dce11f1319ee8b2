//! Path templates compiled to anchored regular expressions.
//!
//! A template is split on `/`. Each segment is either a literal, compared by
//! exact case-sensitive equality, or a `{name}` placeholder that captures one
//! non-empty token without a `/`:
//!
//! ```text
//! /str/{str}         →  ^/str/([^/]+)$
//! /shop/{id}/items   →  ^/shop/([^/]+)/items$
//! ```
//!
//! The expression is anchored at both ends, so a path with extra or missing
//! segments never matches. Captured tokens are raw: nothing is
//! percent-decoded.

use regex::Regex;

use crate::error::MalformedPattern;

/// One `/`-delimited piece of a template.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A compiled path template.
#[derive(Clone, Debug)]
pub struct PathPattern {
    template: String,
    segments: Vec<Segment>,
    param_names: Vec<String>,
    regex: Regex,
}

impl PathPattern {
    /// Compiles `template`.
    ///
    /// Fails on a brace that does not form a whole `{name}` segment, on an
    /// empty `{}`, and on a name declared twice.
    pub fn compile(template: &str) -> Result<Self, MalformedPattern> {
        let mut segments = Vec::new();
        let mut param_names: Vec<String> = Vec::new();
        let mut source = String::from("^");

        for (i, raw) in template.split('/').enumerate() {
            if i > 0 {
                source.push('/');
            }
            let segment = parse_segment(template, raw)?;
            match &segment {
                Segment::Literal(lit) => source.push_str(&regex::escape(lit)),
                Segment::Placeholder(name) => {
                    if param_names.contains(name) {
                        return Err(MalformedPattern::DuplicatePlaceholder {
                            template: template.to_owned(),
                            name: name.clone(),
                        });
                    }
                    param_names.push(name.clone());
                    source.push_str("([^/]+)");
                }
            }
            segments.push(segment);
        }
        source.push('$');

        let regex = Regex::new(&source).map_err(|e| MalformedPattern::Regex {
            template: template.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self { template: template.to_owned(), segments, param_names, regex })
    }

    pub fn template(&self) -> &str { &self.template }
    pub fn segments(&self) -> &[Segment] { &self.segments }

    /// Placeholder names in template order.
    pub fn param_names(&self) -> &[String] { &self.param_names }

    /// The anchored expression this template compiled to.
    pub fn as_regex(&self) -> &str { self.regex.as_str() }

    /// `true` when the template has no placeholders.
    pub fn is_literal(&self) -> bool { self.param_names.is_empty() }

    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Binds every declared name to its captured token.
    ///
    /// Empty when `path` does not match or the template has no placeholders.
    pub fn extract(&self, path: &str) -> Params {
        if self.is_literal() {
            return Params::default();
        }
        let Some(caps) = self.regex.captures(path) else {
            return Params::default();
        };
        self.param_names
            .iter()
            .zip(caps.iter().skip(1))
            .filter_map(|(name, value)| Some((name.clone(), value?.as_str().to_owned())))
            .collect()
    }
}

fn parse_segment(template: &str, raw: &str) -> Result<Segment, MalformedPattern> {
    let unmatched = || MalformedPattern::UnmatchedBrace {
        template: template.to_owned(),
        segment: raw.to_owned(),
    };

    if let Some(inner) = raw.strip_prefix('{').and_then(|r| r.strip_suffix('}')) {
        if inner.is_empty() {
            return Err(MalformedPattern::EmptyPlaceholder { template: template.to_owned() });
        }
        if inner.contains(['{', '}']) {
            return Err(unmatched());
        }
        return Ok(Segment::Placeholder(inner.to_owned()));
    }

    if raw.contains(['{', '}']) {
        return Err(unmatched());
    }
    Ok(Segment::Literal(raw.to_owned()))
}

// ── Params ────────────────────────────────────────────────────────────────────

/// Path parameters captured for one request, in template order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
