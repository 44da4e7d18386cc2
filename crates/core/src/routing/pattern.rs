//! Path pattern compilation and matching.
//!
//! Supported segment forms:
//!
//! - `posts` - literal, compared ASCII case-insensitively
//! - `:slug` - required named parameter
//! - `:page?` - optional named parameter, matches with or without the segment
//! - `*` - trailing splat, binds the rest of the path to the `*` parameter

use std::collections::BTreeMap;

use super::error::{Result, RouteTableError};

/// Path parameters extracted by a match, keyed by name.
pub type Params = BTreeMap<String, String>;

/// Name under which a trailing `*` segment stores the remaining path.
pub const SPLAT_PARAM: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param { name: String, optional: bool },
    Splat,
}

/// A compiled route path pattern such as `/posts/:slug/:page?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Compiles a pattern.
    ///
    /// Patterns must start with `/`, parameter names must be non-empty and
    /// unique, and `*` may only appear as the last segment.
    pub fn parse(pattern: &str) -> Result<Self> {
        let invalid = |reason: &str| RouteTableError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        let Some(rest) = pattern.strip_prefix('/') else {
            return Err(invalid("pattern must start with '/'"));
        };

        let parts = split_path(rest);
        let mut segments = Vec::with_capacity(parts.len());
        let mut seen = Vec::new();

        for (idx, part) in parts.iter().enumerate() {
            if part.is_empty() {
                return Err(invalid("empty path segment"));
            }

            if *part == SPLAT_PARAM {
                if idx != parts.len() - 1 {
                    return Err(invalid("'*' must be the last segment"));
                }
                segments.push(Segment::Splat);
                continue;
            }

            let Some(param) = part.strip_prefix(':') else {
                segments.push(Segment::Literal((*part).to_string()));
                continue;
            };

            let (name, optional) = match param.strip_suffix('?') {
                Some(name) => (name, true),
                None => (param, false),
            };

            if name.is_empty() {
                return Err(invalid("parameter name must not be empty"));
            }
            if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(invalid("parameter names may only contain [A-Za-z0-9_]"));
            }
            if seen.contains(&name) {
                return Err(invalid(&format!("duplicate parameter ':{name}'")));
            }
            seen.push(name);

            segments.push(Segment::Param {
                name: name.to_string(),
                optional,
            });
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    /// Returns the pattern as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the names of every parameter the pattern can bind.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param { name, .. } => Some(name.as_str()),
            Segment::Splat => Some(SPLAT_PARAM),
            Segment::Literal(_) => None,
        })
    }

    /// Matches a request path, returning the extracted parameters.
    ///
    /// Parameter values are percent-decoded. A single trailing slash on the
    /// path is ignored. Optional parameters that did not match are absent
    /// from the result.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let path = path.strip_prefix('/').unwrap_or(path);
        let path = path.strip_suffix('/').unwrap_or(path);
        let parts = split_path(path);

        let mut params = Params::new();
        match_segments(&self.segments, &parts, &mut params).then_some(params)
    }
}

impl std::fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Splits a path (without its leading slash) into segments; `""` has none.
fn split_path(path: &str) -> Vec<&str> {
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('/').collect()
    }
}

fn decode(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

/// Backtracking matcher. Optional parameters first try to consume a segment,
/// then retry without it.
fn match_segments(segments: &[Segment], parts: &[&str], params: &mut Params) -> bool {
    let Some((segment, rest)) = segments.split_first() else {
        return parts.is_empty();
    };

    match segment {
        Segment::Literal(literal) => match parts.split_first() {
            Some((part, remaining)) if part.eq_ignore_ascii_case(literal) => {
                match_segments(rest, remaining, params)
            }
            _ => false,
        },
        Segment::Param { name, optional } => {
            if let Some((part, remaining)) = parts.split_first() {
                if !part.is_empty() {
                    params.insert(name.clone(), decode(part));
                    if match_segments(rest, remaining, params) {
                        return true;
                    }
                    params.remove(name);
                }
            }
            *optional && match_segments(rest, parts, params)
        }
        Segment::Splat => {
            let joined = parts.iter().map(|part| decode(part)).collect::<Vec<_>>();
            params.insert(SPLAT_PARAM.to_string(), joined.join("/"));
            true
        }
    }
}
