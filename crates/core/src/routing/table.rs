//! Ordered route table and the resolver over it.

use serde::{Deserialize, Serialize};

use super::endpoint::EndpointTemplate;
use super::error::{Result, RouteTableError, RoutingError};
use super::pattern::{Params, RoutePattern};

/// Per-route rendering and caching options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RouteOptions {
    /// Id of a registered document template replacing the default one.
    pub custom_document: Option<String>,
    /// Omit the `<!doctype html>` prefix.
    pub disable_doctype: bool,
    /// Accept an empty upstream result instead of failing with 404.
    pub allow_empty_result: bool,
    /// Cache-Control max-age override, in seconds.
    pub cache_max_age: Option<u64>,
}

/// One entry of the route table. Immutable once the table is built.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pattern: RoutePattern,
    view: String,
    endpoint: Option<EndpointTemplate>,
    options: RouteOptions,
}

impl RouteEntry {
    pub fn new(pattern: &str, view: impl Into<String>) -> Result<Self> {
        Ok(Self {
            pattern: RoutePattern::parse(pattern)?,
            view: view.into(),
            endpoint: None,
            options: RouteOptions::default(),
        })
    }

    /// Attaches an endpoint template. Placeholders must name parameters the
    /// pattern can bind.
    pub fn with_endpoint(mut self, endpoint: EndpointTemplate) -> Result<Self> {
        for placeholder in endpoint.placeholders() {
            if !self.pattern.param_names().any(|name| name == placeholder) {
                return Err(RouteTableError::UnknownEndpointParam {
                    pattern: self.pattern.to_string(),
                    param: placeholder.to_string(),
                });
            }
        }
        self.endpoint = Some(endpoint);
        Ok(self)
    }

    pub fn with_options(mut self, options: RouteOptions) -> Self {
        self.options = options;
        self
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn view(&self) -> &str {
        &self.view
    }

    pub fn endpoint(&self) -> Option<&EndpointTemplate> {
        self.endpoint.as_ref()
    }

    pub fn options(&self) -> &RouteOptions {
        &self.options
    }
}

/// A successful resolution: the matching entry plus extracted params.
#[derive(Debug, Clone)]
pub struct MatchResult<'a> {
    pub entry: &'a RouteEntry,
    pub params: Params,
}

impl MatchResult<'_> {
    pub fn view(&self) -> &str {
        self.entry.view()
    }

    pub fn options(&self) -> &RouteOptions {
        self.entry.options()
    }

    /// The upstream endpoint fragment for this match, if the route fetches data.
    pub fn endpoint(&self) -> Option<String> {
        self.entry
            .endpoint()
            .map(|template| template.apply(&self.params))
    }
}

/// Ordered, read-only collection of routes. The first matching entry wins.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn new(entries: Vec<RouteEntry>) -> Self {
        Self { entries }
    }

    /// Resolves a request path. The query string, if any, is ignored.
    pub fn resolve(&self, path: &str) -> std::result::Result<MatchResult<'_>, RoutingError> {
        let path = path.split_once('?').map_or(path, |(path, _)| path);

        self.entries
            .iter()
            .find_map(|entry| {
                entry
                    .pattern
                    .matches(path)
                    .map(|params| MatchResult { entry, params })
            })
            .ok_or_else(|| RoutingError::NoMatch {
                path: path.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.iter()
    }
}
