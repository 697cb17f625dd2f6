//! # bsql-link: HTTP session client
//!
//! Connects to an HTTP SQL endpoint (`POST /v1/api/sql`) and executes
//! command batches. A batch may return several result sets plus engine
//! notices; everything comes back in one [`QueryResponse`].
//!
//! Requests can be abandoned mid-flight through a
//! [`tokio_util::sync::CancellationToken`].

pub mod client;
pub mod error;
pub mod models;
pub mod query;

pub use client::{LinkClient, LinkClientBuilder};
pub use error::{LinkError, Result};
pub use models::{
    ErrorDetail, HealthCheckResponse, QueryRequest, QueryResponse, QueryResult, ResponseStatus,
    SchemaField, ServerNotice, SqlDataType,
};
pub use query::QueryExecutor;
