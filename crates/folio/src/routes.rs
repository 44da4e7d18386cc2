//! Route table loading.

use std::path::Path;

use anyhow::{Context, Result};
use folio_core::routing::{RouteSpec, RouteTable};

/// Routes used when no routes file is configured.
const DEFAULT_ROUTES: &str = include_str!("../routes.json");

/// Loads the route table from `path`, or the built-in routes when `None`.
pub fn load_route_table(path: Option<&Path>) -> Result<RouteTable> {
    let specs = match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read routes file {}", path.display()))?;
            parse_route_specs(&contents)
                .with_context(|| format!("Invalid routes file {}", path.display()))?
        }
        None => parse_route_specs(DEFAULT_ROUTES).context("Invalid built-in routes")?,
    };

    let table = RouteTable::from_specs(&specs)?;
    tracing::info!(
        routes = table.len(),
        source = %path.map_or_else(|| "built-in".to_string(), |p| p.display().to_string()),
        "Route table loaded"
    );
    Ok(table)
}

fn parse_route_specs(json: &str) -> Result<Vec<RouteSpec>> {
    Ok(serde_json::from_str(json)?)
}
