//! HTTP gateway to the hosted backend

pub mod dto;
pub mod endpoints;
pub mod http;

pub use http::ApiClient;
