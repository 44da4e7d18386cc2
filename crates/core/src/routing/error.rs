use thiserror::Error;

/// Returned when no route in the table matches a request path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoutingError {
    #[error("No route matched path: {path}")]
    NoMatch { path: String },
}

/// Errors raised while compiling a route table from configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteTableError {
    #[error("Invalid route pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid endpoint template {template:?}: {reason}")]
    InvalidEndpoint { template: String, reason: String },

    #[error("Endpoint template for {pattern:?} references unknown parameter {param:?}")]
    UnknownEndpointParam { pattern: String, param: String },
}

/// Result type for route table construction.
pub type Result<T> = std::result::Result<T, RouteTableError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_match_display() {
        let error = RoutingError::NoMatch {
            path: "/does-not-exist".to_string(),
        };
        assert_eq!(error.to_string(), "No route matched path: /does-not-exist");
    }

    #[test]
    fn test_unknown_endpoint_param_display() {
        let error = RouteTableError::UnknownEndpointParam {
            pattern: "/posts/:slug".to_string(),
            param: "id".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Endpoint template for \"/posts/:slug\" references unknown parameter \"id\""
        );
    }
}
