//! Client code for campus.
//!
//! This crate provides the URL resolver, HTTP transport, fetch executor and
//! the query client that composes them with the resource cache.

pub mod fetch;
pub mod query;

#[cfg(test)]
mod testing;

pub use fetch::{
    Candidate, CandidateForm, FetchConfig, FetchExecutor, HttpRequest, HttpResponse, ReqwestTransport, Transport,
    TransportConfig, TransportError, UrlResolver,
};
pub use query::{PageStatus, QueryClient};
