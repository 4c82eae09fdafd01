// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Parameterized iteration driver.
//!
//! Enumerates the identifier tuples configured for a stream and drives one
//! locate, build, dispatch, decode cycle per tuple, merging the identifier
//! values into every decoded record before it is validated and emitted.
//! Iteration is strictly sequential: a request completes before the next
//! tuple is processed, and any error terminates the iteration without
//! retracting records already emitted for earlier tuples.

use serde_json::Value;
use tracing::debug;

use crate::{
    catalog::{Iteration, StreamDefinition},
    config::TapConfig,
    decode::extract_records,
    emit::RecordSink,
    error::Error,
    request::build_request,
    schema::ConformanceGate,
    template::{resolve_path, TemplateContext},
    transport::Transport,
};

/// One stream's identifier tuples, resolved against the configuration.
///
/// The tuple order is deterministic: single sequences iterate in
/// configuration order, dual sequences iterate outer-major (the full inner
/// sequence for the first outer value before the second outer value). An
/// empty sequence yields zero tuples, which is a normal completion rather
/// than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationPlan {
    shape: PlanShape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PlanShape {
    Fixed,
    Single {
        key: &'static str,
        values: Vec<u64>,
    },
    Dual {
        outer_key: &'static str,
        outer: Vec<u64>,
        inner_key: &'static str,
        inner: Vec<u64>,
    },
}

impl IterationPlan {
    /// Resolves the plan for a stream definition against the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a definition names an unknown
    /// identifier sequence.
    pub fn for_stream(
        definition: &StreamDefinition,
        config: &TapConfig,
    ) -> Result<Self, Error> {
        let shape = match definition.iteration {
            Iteration::FixedPath => PlanShape::Fixed,
            Iteration::SingleIdentifier {
                placeholder,
                config_key,
            } => PlanShape::Single {
                key: placeholder,
                values: config.identifier_values(config_key)?.to_vec(),
            },
            Iteration::DualIdentifier {
                outer_placeholder,
                outer_config_key,
                inner_placeholder,
                inner_config_key,
            } => PlanShape::Dual {
                outer_key: outer_placeholder,
                outer: config.identifier_values(outer_config_key)?.to_vec(),
                inner_key: inner_placeholder,
                inner: config.identifier_values(inner_config_key)?.to_vec(),
            },
        };

        Ok(Self { shape })
    }

    /// Number of requests this plan will issue.
    pub fn request_count(&self) -> usize {
        match &self.shape {
            PlanShape::Fixed => 1,
            PlanShape::Single { values, .. } => values.len(),
            PlanShape::Dual { outer, inner, .. } => outer.len() * inner.len(),
        }
    }

    /// Lazily enumerates the identifier tuples in iteration order.
    ///
    /// A fresh call restarts at the first tuple; the sequence is not
    /// restartable mid-iteration.
    pub fn tuples(&self) -> Tuples<'_> {
        Tuples {
            plan: self,
            outer: 0,
            inner: 0,
            fixed_done: false,
        }
    }
}

/// Iterator over a plan's identifier tuples.
///
/// Each item is the ordered list of (placeholder, value) bindings for one
/// request; a fixed-path plan yields a single empty tuple.
#[derive(Debug)]
pub struct Tuples<'plan> {
    plan: &'plan IterationPlan,
    outer: usize,
    inner: usize,
    fixed_done: bool,
}

impl Iterator for Tuples<'_> {
    type Item = Vec<(&'static str, u64)>;

    fn next(&mut self) -> Option<Self::Item> {
        match &self.plan.shape {
            PlanShape::Fixed => {
                if self.fixed_done {
                    None
                } else {
                    self.fixed_done = true;
                    Some(Vec::new())
                }
            }
            PlanShape::Single { key, values } => {
                let value = *values.get(self.outer)?;
                self.outer += 1;
                Some(vec![(*key, value)])
            }
            PlanShape::Dual {
                outer_key,
                outer,
                inner_key,
                inner,
            } => {
                if inner.is_empty() {
                    return None;
                }
                let outer_value = *outer.get(self.outer)?;
                let inner_value = *inner.get(self.inner)?;
                self.inner += 1;
                if self.inner == inner.len() {
                    self.inner = 0;
                    self.outer += 1;
                }
                Some(vec![(*outer_key, outer_value), (*inner_key, inner_value)])
            }
        }
    }
}

fn merge_bindings(
    stream: &str,
    record: &mut Value,
    bindings: &[(&'static str, u64)],
) -> Result<(), Error> {
    if bindings.is_empty() {
        return Ok(());
    }
    let map = record.as_object_mut().ok_or_else(|| {
        Error::decode(stream, "cannot annotate a non-object record")
    })?;
    for (key, value) in bindings {
        map.insert((*key).to_owned(), Value::from(*value));
    }
    Ok(())
}

fn static_bindings(
    definition: &StreamDefinition,
    config: &TapConfig,
) -> Result<Vec<(&'static str, u64)>, Error> {
    let mut bindings = Vec::with_capacity(definition.static_annotations.len());
    for key in definition.static_annotations {
        let value = config.static_value(key).ok_or_else(|| {
            Error::config(format!("required configuration key '{key}' is not set"))
        })?;
        bindings.push((*key, value));
    }
    Ok(bindings)
}

/// Syncs one stream: enumerate tuples, fetch, decode, annotate, validate,
/// emit.
///
/// Records are handed to the sink one at a time, in iteration order. The
/// identifier values known to the driver are authoritative: they overwrite
/// any colliding key in the raw response.
///
/// # Errors
///
/// Propagates configuration, transport, decode, and conformance errors
/// unchanged; the first error aborts the remaining tuples.
pub async fn sync_stream(
    definition: &StreamDefinition,
    config: &TapConfig,
    transport: &dyn Transport,
    gate: &ConformanceGate,
    sink: &mut dyn RecordSink,
) -> Result<u64, Error> {
    let plan = IterationPlan::for_stream(definition, config)?;
    let annotations = static_bindings(definition, config)?;
    let base_context = TemplateContext::from_config(config);

    debug!(
        "Stream '{}' will issue {} request(s)",
        definition.name,
        plan.request_count()
    );

    let mut emitted = 0u64;
    for tuple in plan.tuples() {
        let mut context = base_context.clone();
        for (name, value) in &tuple {
            context.bind(name, value.to_string());
        }

        let url = resolve_path(&config.api_url, definition.path_template, &context)?;
        let request = build_request(url, config.auth.as_ref());
        let body = transport.fetch(&request).await?;

        let records = extract_records(definition.name, &body, &definition.extraction)?;
        debug!(
            "Stream '{}' decoded {} record(s) from {}",
            definition.name,
            records.len(),
            request.url
        );

        for mut record in records {
            merge_bindings(definition.name, &mut record, &annotations)?;
            merge_bindings(definition.name, &mut record, &tuple)?;
            gate.check(definition.name, &record)?;
            sink.write_record(definition.name, &record)?;
            emitted += 1;
        }
    }

    debug!("Stream '{}' emitted {} record(s)", definition.name, emitted);
    Ok(emitted)
}
