//! Endpoint templates: derive an upstream API path fragment from route params.

use std::sync::Arc;

use super::error::{Result, RouteTableError};
use super::pattern::Params;

type EndpointFn = dyn Fn(&Params) -> String + Send + Sync;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Text(String),
    Param(String),
}

#[derive(Clone)]
enum Kind {
    Template { raw: String, pieces: Vec<Piece> },
    Function(Arc<EndpointFn>),
}

/// Builds the API path fragment a route fetches its data from.
///
/// Either a closure over the matched params, or a textual template such as
/// `posts?slug={slug}` where each `{name}` is replaced by the percent-encoded
/// param value (missing optional params become empty).
#[derive(Clone)]
pub struct EndpointTemplate {
    kind: Kind,
}

impl EndpointTemplate {
    /// Wraps an arbitrary function of the matched params.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Params) -> String + Send + Sync + 'static,
    {
        Self {
            kind: Kind::Function(Arc::new(f)),
        }
    }

    /// Parses a textual template. `{{` and `}}` produce literal braces.
    pub fn parse(template: &str) -> Result<Self> {
        let invalid = |reason: &str| RouteTableError::InvalidEndpoint {
            template: template.to_string(),
            reason: reason.to_string(),
        };

        let mut pieces = Vec::new();
        let mut text = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    text.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    text.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) => name.push(c),
                            None => return Err(invalid("unclosed '{'")),
                        }
                    }
                    if name.is_empty() {
                        return Err(invalid("empty placeholder"));
                    }
                    if !text.is_empty() {
                        pieces.push(Piece::Text(std::mem::take(&mut text)));
                    }
                    pieces.push(Piece::Param(name));
                }
                '}' => return Err(invalid("unmatched '}'")),
                c => text.push(c),
            }
        }

        if !text.is_empty() {
            pieces.push(Piece::Text(text));
        }

        Ok(Self {
            kind: Kind::Template {
                raw: template.to_string(),
                pieces,
            },
        })
    }

    /// Returns the placeholder names of a textual template (empty for closures).
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        let pieces: &[Piece] = match &self.kind {
            Kind::Template { pieces, .. } => pieces,
            Kind::Function(_) => &[],
        };
        pieces.iter().filter_map(|piece| match piece {
            Piece::Param(name) => Some(name.as_str()),
            Piece::Text(_) => None,
        })
    }

    /// Applies the template to matched params.
    pub fn apply(&self, params: &Params) -> String {
        match &self.kind {
            Kind::Function(f) => f(params),
            Kind::Template { pieces, .. } => pieces
                .iter()
                .map(|piece| match piece {
                    Piece::Text(text) => text.clone(),
                    Piece::Param(name) => params
                        .get(name)
                        .map(|value| urlencoding::encode(value).into_owned())
                        .unwrap_or_default(),
                })
                .collect(),
        }
    }
}

impl std::fmt::Debug for EndpointTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            Kind::Template { raw, .. } => f.debug_tuple("EndpointTemplate").field(raw).finish(),
            Kind::Function(_) => f.debug_tuple("EndpointTemplate").field(&"<fn>").finish(),
        }
    }
}
