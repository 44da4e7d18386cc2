//! Route table compilation and path resolution.

mod config;
mod endpoint;
mod error;
mod pattern;
mod table;

pub use config::RouteSpec;
pub use endpoint::EndpointTemplate;
pub use error::{Result, RouteTableError, RoutingError};
pub use pattern::{Params, RoutePattern, SPLAT_PARAM};
pub use table::{MatchResult, RouteEntry, RouteOptions, RouteTable};
