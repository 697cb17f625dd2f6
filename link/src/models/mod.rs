//! Data models for bsql-link.
//!
//! Request and response structures exchanged with the SQL endpoint.

pub mod error_detail;
pub mod health_check_response;
pub mod query_request;
pub mod query_response;
pub mod query_result;
pub mod response_status;
pub mod schema_field;
pub mod server_notice;
pub mod sql_data_type;


pub use error_detail::ErrorDetail;
pub use health_check_response::HealthCheckResponse;
pub use query_request::QueryRequest;
pub use query_response::QueryResponse;
pub use query_result::QueryResult;
pub use response_status::ResponseStatus;
pub use schema_field::SchemaField;
pub use server_notice::ServerNotice;
pub use sql_data_type::SqlDataType;
