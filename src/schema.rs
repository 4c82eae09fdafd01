// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Schema registry and conformance gate.
//!
//! Schema documents are embedded at build time and parsed once at startup
//! into an explicit registry keyed by stream name; nothing resolves schema
//! locations at runtime. The gate compiles one validator per stream and sits
//! between the response decoder and the emission boundary: every record
//! passes it or the stream aborts.

use std::collections::BTreeMap;

use jsonschema::Validator;
use serde_json::Value;

use crate::error::Error;

const EVENTS_SCHEMA: &str = include_str!("../schemas/events.json");
const TEAMS_SCHEMA: &str = include_str!("../schemas/teams.json");
const ELEMENTS_SCHEMA: &str = include_str!("../schemas/elements.json");
const ELEMENT_TYPES_SCHEMA: &str = include_str!("../schemas/element_types.json");
const FIXTURES_SCHEMA: &str = include_str!("../schemas/fixtures.json");
const SELECTIONS_SCHEMA: &str = include_str!("../schemas/selections.json");
const STANDINGS_SCHEMA: &str = include_str!("../schemas/standings.json");
const PLAYER_DETAILS_SCHEMA: &str = include_str!("../schemas/player_details.json");

const SCHEMA_DOCUMENTS: &[(&str, &str)] = &[
    ("events", EVENTS_SCHEMA),
    ("teams", TEAMS_SCHEMA),
    ("elements", ELEMENTS_SCHEMA),
    ("element-types", ELEMENT_TYPES_SCHEMA),
    ("fixtures", FIXTURES_SCHEMA),
    ("selections", SELECTIONS_SCHEMA),
    ("standings", STANDINGS_SCHEMA),
    ("player-details", PLAYER_DETAILS_SCHEMA),
];

/// Explicit mapping from stream name to its JSON Schema document.
///
/// Built once at startup and passed by reference wherever schemas are
/// needed.
#[derive(Debug)]
pub struct SchemaRegistry {
    schemas: BTreeMap<&'static str, Value>,
}

impl SchemaRegistry {
    /// Parses the embedded schema documents into a registry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when an embedded document is not valid
    /// JSON; this only fires on a packaging mistake.
    pub fn bootstrap() -> Result<Self, Error> {
        let mut schemas = BTreeMap::new();
        for (name, raw) in SCHEMA_DOCUMENTS {
            let document: Value = serde_json::from_str(raw).map_err(|e| {
                Error::config(format!("schema document for stream '{name}' is invalid: {e}"))
            })?;
            schemas.insert(*name, document);
        }

        Ok(Self { schemas })
    }

    /// Returns the schema document registered for the named stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when no schema is registered under the
    /// name.
    pub fn schema(&self, stream: &str) -> Result<&Value, Error> {
        self.schemas
            .get(stream)
            .ok_or_else(|| Error::config(format!("no schema registered for stream '{stream}'")))
    }
}

/// Compiled validators guarding the emission boundary.
pub struct ConformanceGate {
    validators: BTreeMap<&'static str, Validator>,
}

impl ConformanceGate {
    /// Compiles one validator per registered schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a schema document cannot be compiled.
    pub fn compile(registry: &SchemaRegistry) -> Result<Self, Error> {
        let mut validators = BTreeMap::new();
        for (name, document) in &registry.schemas {
            let validator = jsonschema::validator_for(document).map_err(|e| {
                Error::config(format!("schema for stream '{name}' failed to compile: {e}"))
            })?;
            validators.insert(*name, validator);
        }

        Ok(Self { validators })
    }

    /// Validates one record against the named stream's schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conformance`] with every violation when the record
    /// does not satisfy the schema, and [`Error::Config`] when the stream
    /// has no compiled validator.
    pub fn check(&self, stream: &str, record: &Value) -> Result<(), Error> {
        let validator = self.validators.get(stream).ok_or_else(|| {
            Error::config(format!("no compiled schema for stream '{stream}'"))
        })?;

        let violations: Vec<String> = validator
            .iter_errors(record)
            .map(|violation| format!("{}: {violation}", violation.instance_path))
            .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Error::conformance(stream, violations.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ConformanceGate, SchemaRegistry};
    use crate::{catalog::stream_definitions, error::Error};

    #[test]
    fn registry_covers_every_stream_definition() {
        let registry = SchemaRegistry::bootstrap().expect("registry bootstrap failed");
        for definition in stream_definitions() {
            registry
                .schema(definition.name)
                .expect("stream has no registered schema");
        }
    }

    #[test]
    fn registry_rejects_unknown_stream() {
        let registry = SchemaRegistry::bootstrap().expect("registry bootstrap failed");
        let error = registry.schema("transfers").unwrap_err();
        assert!(matches!(error, Error::Config { .. }));
    }

    #[test]
    fn gate_accepts_conforming_team_record() {
        let registry = SchemaRegistry::bootstrap().expect("registry bootstrap failed");
        let gate = ConformanceGate::compile(&registry).expect("gate compile failed");

        let record = json!({
            "id": 3,
            "code": 3,
            "name": "Arsenal",
            "short_name": "ARS",
            "strength": 4,
        });
        gate.check("teams", &record).expect("record should conform");
    }

    #[test]
    fn gate_rejects_wrong_typed_primary_key() {
        let registry = SchemaRegistry::bootstrap().expect("registry bootstrap failed");
        let gate = ConformanceGate::compile(&registry).expect("gate compile failed");

        let record = json!({
            "id": "3",
            "name": "Arsenal",
            "short_name": "ARS",
        });
        let error = gate.check("teams", &record).unwrap_err();

        match error {
            Error::Conformance { stream, details } => {
                assert_eq!(stream, "teams");
                assert!(details.contains("/id"), "details were: {details}");
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn gate_rejects_record_missing_required_field() {
        let registry = SchemaRegistry::bootstrap().expect("registry bootstrap failed");
        let gate = ConformanceGate::compile(&registry).expect("gate compile failed");

        let record = json!({"name": "Arsenal"});
        let error = gate.check("teams", &record).unwrap_err();
        assert!(matches!(error, Error::Conformance { .. }));
    }

    #[test]
    fn gate_reports_unknown_stream() {
        let registry = SchemaRegistry::bootstrap().expect("registry bootstrap failed");
        let gate = ConformanceGate::compile(&registry).expect("gate compile failed");

        let error = gate.check("transfers", &json!({})).unwrap_err();
        assert!(matches!(error, Error::Config { .. }));
    }

    #[test]
    fn selections_schema_requires_driver_annotations() {
        let registry = SchemaRegistry::bootstrap().expect("registry bootstrap failed");
        let gate = ConformanceGate::compile(&registry).expect("gate compile failed");

        let record = json!({"active_chip": null, "picks": []});
        let error = gate.check("selections", &record).unwrap_err();
        assert!(matches!(error, Error::Conformance { .. }));
    }
}
