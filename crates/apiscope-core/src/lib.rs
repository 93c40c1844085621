//! apiscope-core: Schema model and request logic for interactive API exploration
//!
//! This crate holds everything that does not touch the network: the parsed
//! API description, path-template resolution, request building, per-panel
//! state with stale-reply protection, and the decorative token classifier
//! used to display code snippets.

pub mod catalog;
pub mod config;
pub mod error;
pub mod highlight;
pub mod http_file;
pub mod panel;
pub mod request;
pub mod result;
pub mod schema;
pub mod template;

pub use catalog::{Catalog, Validation, ValidationStatus};
pub use config::{Config, ConfigError};
pub use error::{BodyParseError, ExploreError};
pub use highlight::{StyleTag, Token, classify};
pub use http_file::to_http;
pub use panel::{
    EndpointPanel, GenerationGuard, Language, PendingSend, ResultView, SNIPPET_ERROR,
    SNIPPET_LOADING, SnippetPanel, SnippetView, Ticket,
};
pub use request::{RequestDescriptor, RequestInput, build_request};
pub use result::ResponseResult;
pub use schema::{ApiSchema, Endpoint, Parameter, SchemaError};
pub use template::{ParamSplit, extract_placeholders, substitute};
