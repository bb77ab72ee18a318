//! Outbound request pipeline.

pub mod http;

pub use http::AuthHttpClient;
