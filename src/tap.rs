// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Tap orchestration.
//!
//! Ties configuration, catalog, schema registry, transport, driver, and the
//! emission boundary together for the two operator-facing operations:
//! discovery and sync.

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    catalog::{build_catalog, selected_streams, CatalogDocument},
    config::TapConfig,
    driver::sync_stream,
    emit::RecordSink,
    error::Error,
    schema::{ConformanceGate, SchemaRegistry},
    transport::Transport,
};

/// Per-stream record count reported after a sync run.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct StreamCount {
    /// Stream name.
    pub stream: String,
    /// Number of records emitted for the stream.
    pub records: u64,
}

/// Summary of one sync run, in stream order.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    /// Record counts for every synced stream.
    pub streams: Vec<StreamCount>,
}

impl SyncSummary {
    /// Total records emitted across all streams.
    pub fn total_records(&self) -> u64 {
        self.streams.iter().map(|count| count.records).sum()
    }
}

/// Builds the discovery catalog for the configured stream selection.
///
/// # Errors
///
/// Returns an [`Error`] when the stream selector is unknown or a schema
/// document cannot be loaded.
pub fn run_discover(config: &TapConfig) -> Result<CatalogDocument, Error> {
    let registry = SchemaRegistry::bootstrap()?;
    build_catalog(config, &registry)
}

/// Syncs every selected stream, emitting schema and record messages to the
/// sink.
///
/// Streams are processed in catalog order. For each stream the required
/// configuration is verified before any request is attempted, the schema
/// message is written, and the driver then emits validated records one at a
/// time. The first error aborts the run; records already emitted stay
/// emitted.
///
/// # Errors
///
/// Propagates configuration, transport, decode, conformance, and emission
/// errors from the first failing stream.
pub async fn run_sync(
    config: &TapConfig,
    transport: &dyn Transport,
    sink: &mut dyn RecordSink,
) -> Result<SyncSummary, Error> {
    let registry = SchemaRegistry::bootstrap()?;
    let gate = ConformanceGate::compile(&registry)?;
    let streams = selected_streams(config)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.yellow} [{elapsed_precise}] {msg}")
            .expect("valid template"),
    );

    let mut counts = Vec::with_capacity(streams.len());
    for definition in streams {
        pb.set_message(format!("Syncing stream '{}'...", definition.name));
        debug!("Syncing stream '{}'", definition.name);

        config.require(definition.required_config)?;

        let schema = registry.schema(definition.name)?;
        sink.write_schema(definition, schema)?;

        let records = sync_stream(definition, config, transport, &gate, sink).await?;
        info!("Stream '{}' emitted {} record(s)", definition.name, records);
        counts.push(StreamCount {
            stream: definition.name.to_owned(),
            records,
        });
    }

    let summary = SyncSummary { streams: counts };
    pb.finish_with_message(format!(
        "Sync complete: {} record(s) across {} stream(s)",
        summary.total_records(),
        summary.streams.len()
    ));

    Ok(summary)
}
