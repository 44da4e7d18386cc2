//! Declarative route configuration, as loaded from a JSON routes file.

use serde::{Deserialize, Serialize};

use super::endpoint::EndpointTemplate;
use super::error::Result;
use super::table::{RouteEntry, RouteOptions, RouteTable};

/// One route as written in configuration.
///
/// ```json
/// { "path": "/posts/:slug", "view": "post", "endpoint": "posts?slug={slug}" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSpec {
    pub path: String,
    pub view: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub options: RouteOptions,
}

impl RouteSpec {
    pub fn compile(&self) -> Result<RouteEntry> {
        let mut entry = RouteEntry::new(&self.path, self.view.clone())?;
        if let Some(endpoint) = &self.endpoint {
            entry = entry.with_endpoint(EndpointTemplate::parse(endpoint)?)?;
        }
        Ok(entry.with_options(self.options.clone()))
    }
}

impl RouteTable {
    /// Compiles route specs in order. Fails on the first invalid entry.
    pub fn from_specs(specs: &[RouteSpec]) -> Result<Self> {
        specs
            .iter()
            .map(RouteSpec::compile)
            .collect::<Result<Vec<_>>>()
            .map(RouteTable::new)
    }
}
