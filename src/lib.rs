//! Extraction library for the Fantasy Premier League web API.
//!
//! The library maps each API endpoint to an immutable stream definition and
//! drives a single generic pipeline over it: enumerate identifier tuples,
//! resolve the endpoint path, dispatch one request per tuple, decode the
//! response into records, annotate each record with its originating
//! identifiers, validate it against the stream's schema, and hand it to the
//! emission boundary. Public APIs document invariants and error semantics
//! to facilitate embedding in loader pipelines.

mod catalog;
mod config;
mod decode;
mod driver;
mod emit;
mod error;
mod request;
mod schema;
mod tap;
mod template;
mod transport;

pub use catalog::{
    build_catalog, find_stream, selected_streams, stream_definitions, CatalogDocument,
    CatalogEntry, Extraction, Iteration, StreamDefinition,
};
pub use config::{load_config, parse_config, AuthConfig, TapConfig, DEFAULT_API_URL};
pub use decode::extract_records;
pub use driver::{sync_stream, IterationPlan, Tuples};
pub use emit::{MessageWriter, RecordSink};
pub use error::{io_error, Error};
pub use request::{build_request, PreparedRequest, REQUEST_METHOD};
pub use schema::{ConformanceGate, SchemaRegistry};
pub use tap::{run_discover, run_sync, StreamCount, SyncSummary};
pub use template::{resolve_path, TemplateContext};
pub use transport::{HttpTransport, Transport};
