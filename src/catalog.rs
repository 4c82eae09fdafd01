//! Stream definitions and discovery.
//!
//! Every endpoint the tap reads is described by one immutable
//! [`StreamDefinition`] in a static table built at process start. The table
//! replaces per-endpoint types with data: the iteration driver is generic
//! over the definition's iteration shape and extraction rule.

use serde::Serialize;
use serde_json::Value;

use crate::{
    config::TapConfig,
    error::Error,
    schema::SchemaRegistry,
};

/// Record-extraction rule applied to a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// The body is an object containing the named array field; the field's
    /// elements are the records. A missing field is a hard decode error.
    DirectKey(&'static str),
    /// The body itself is the array of records.
    WholeBody,
    /// A path query evaluated against the body selects the records; `$`
    /// treats the whole document as one record.
    PathQuery(&'static str),
}

/// Iteration shape of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Iteration {
    /// One fixed path, one request.
    FixedPath,
    /// One request per value of a single configured identifier sequence.
    SingleIdentifier {
        /// Placeholder name substituted into the path template and merged
        /// into every record.
        placeholder: &'static str,
        /// Configuration key naming the identifier sequence.
        config_key: &'static str,
    },
    /// One request per (outer, inner) pair of two configured sequences,
    /// outer-major.
    DualIdentifier {
        /// Outer placeholder name.
        outer_placeholder: &'static str,
        /// Configuration key for the outer sequence.
        outer_config_key: &'static str,
        /// Inner placeholder name.
        inner_placeholder: &'static str,
        /// Configuration key for the inner sequence.
        inner_config_key: &'static str,
    },
}

/// Immutable descriptor of one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamDefinition {
    /// Stream name exposed in the catalog and emitted messages.
    pub name: &'static str,
    /// Ordered field names forming a record's unique identifier.
    pub primary_keys: &'static [&'static str],
    /// Path template with `{placeholder}` tokens.
    pub path_template: &'static str,
    /// Record-extraction rule for response bodies.
    pub extraction: Extraction,
    /// Iteration shape driving request enumeration.
    pub iteration: Iteration,
    /// Field passed through for downstream incremental tracking.
    pub replication_key: Option<&'static str>,
    /// Configuration keys that must be set before any request is attempted.
    pub required_config: &'static [&'static str],
    /// Configuration keys whose values are merged into every record.
    pub static_annotations: &'static [&'static str],
}

const STREAMS: &[StreamDefinition] = &[
    StreamDefinition {
        name: "events",
        primary_keys: &["id"],
        path_template: "/bootstrap-static",
        extraction: Extraction::DirectKey("events"),
        iteration: Iteration::FixedPath,
        replication_key: None,
        required_config: &[],
        static_annotations: &[],
    },
    StreamDefinition {
        name: "teams",
        primary_keys: &["id"],
        path_template: "/bootstrap-static",
        extraction: Extraction::DirectKey("teams"),
        iteration: Iteration::FixedPath,
        replication_key: None,
        required_config: &[],
        static_annotations: &[],
    },
    StreamDefinition {
        name: "elements",
        primary_keys: &["id"],
        path_template: "/bootstrap-static",
        extraction: Extraction::DirectKey("elements"),
        iteration: Iteration::FixedPath,
        replication_key: None,
        required_config: &[],
        static_annotations: &[],
    },
    StreamDefinition {
        name: "element-types",
        primary_keys: &["id"],
        path_template: "/bootstrap-static",
        extraction: Extraction::DirectKey("element_types"),
        iteration: Iteration::FixedPath,
        replication_key: None,
        required_config: &[],
        static_annotations: &[],
    },
    StreamDefinition {
        name: "fixtures",
        primary_keys: &["id"],
        path_template: "/fixtures",
        extraction: Extraction::WholeBody,
        iteration: Iteration::FixedPath,
        replication_key: None,
        required_config: &[],
        static_annotations: &[],
    },
    StreamDefinition {
        name: "selections",
        primary_keys: &["manager_id", "gameweek"],
        path_template: "/entry/{manager_id}/event/{gameweek}/picks",
        extraction: Extraction::PathQuery("$"),
        iteration: Iteration::DualIdentifier {
            outer_placeholder: "gameweek",
            outer_config_key: "gameweeks",
            inner_placeholder: "manager_id",
            inner_config_key: "managers",
        },
        replication_key: None,
        required_config: &[],
        static_annotations: &[],
    },
    StreamDefinition {
        name: "standings",
        primary_keys: &["league_id"],
        path_template: "/leagues-classic/{league_id}/standings",
        extraction: Extraction::PathQuery("$"),
        iteration: Iteration::FixedPath,
        replication_key: Some("last_updated_data"),
        required_config: &["league_id"],
        static_annotations: &["league_id"],
    },
    StreamDefinition {
        name: "player-details",
        primary_keys: &["player_id"],
        path_template: "/element-summary/{player_id}",
        extraction: Extraction::PathQuery("$"),
        iteration: Iteration::SingleIdentifier {
            placeholder: "player_id",
            config_key: "players",
        },
        replication_key: None,
        required_config: &[],
        static_annotations: &[],
    },
];

/// Returns every stream definition, in catalog order.
pub fn stream_definitions() -> &'static [StreamDefinition] {
    STREAMS
}

/// Looks up a stream definition by name.
pub fn find_stream(name: &str) -> Option<&'static StreamDefinition> {
    STREAMS.iter().find(|definition| definition.name == name)
}

/// Returns the streams selected by the configuration.
///
/// All streams when no selector is set; exactly the named stream otherwise.
///
/// # Errors
///
/// Returns [`Error::Config`] when the selector names an unknown stream.
pub fn selected_streams(config: &TapConfig) -> Result<Vec<&'static StreamDefinition>, Error> {
    match config.stream.as_deref() {
        Some(name) => {
            let definition = find_stream(name)
                .ok_or_else(|| Error::config(format!("unknown stream '{name}'")))?;
            Ok(vec![definition])
        }
        None => Ok(STREAMS.iter().collect()),
    }
}

/// One stream as exposed by discovery.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CatalogEntry {
    /// Stream name.
    pub name: String,
    /// Ordered primary key field names.
    pub primary_keys: Vec<String>,
    /// Replication key passed through to downstream systems, when declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,
    /// JSON Schema every emitted record conforms to.
    pub schema: Value,
}

/// Document produced at discovery time.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CatalogDocument {
    /// Streams available for selection, in catalog order.
    pub streams: Vec<CatalogEntry>,
}

/// Builds the discovery catalog for the selected streams.
///
/// # Errors
///
/// Returns [`Error::Config`] when the stream selector is unknown or a
/// selected stream has no registered schema.
pub fn build_catalog(
    config: &TapConfig,
    registry: &SchemaRegistry,
) -> Result<CatalogDocument, Error> {
    let mut streams = Vec::new();
    for definition in selected_streams(config)? {
        let schema = registry.schema(definition.name)?;
        streams.push(CatalogEntry {
            name: definition.name.to_owned(),
            primary_keys: definition
                .primary_keys
                .iter()
                .map(|key| (*key).to_owned())
                .collect(),
            replication_key: definition.replication_key.map(str::to_owned),
            schema: schema.clone(),
        });
    }

    Ok(CatalogDocument { streams })
}
