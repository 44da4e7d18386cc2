mod error;
mod http_mapping;
mod policy;
mod traits;

pub use error::{
    FetchError, FetchErrorKind, Result, EMPTY_RESULT_STATUS, TRANSPORT_FAILURE_STATUS,
};
pub use http_mapping::fetch_error_to_status_code;
pub use policy::{ensure_non_empty, is_empty_result, parse_body};
pub use traits::DataFetcher;
