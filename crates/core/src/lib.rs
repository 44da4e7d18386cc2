//! Functional core of folio: pure routing, cache contracts and fetch policy.
//!
//! Nothing in this crate performs I/O. Backends and HTTP clients live in the
//! `folio` binary crate and plug in through the traits defined here.

pub mod cache;
pub mod fetch;
pub mod routing;
