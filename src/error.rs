#![allow(non_shorthand_field_patterns)]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Error handling primitives shared across the tap.
//!
//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.

use std::path::{Path, PathBuf};

/// Unified error type returned by configuration loading, stream iteration,
/// and the emission boundary.
///
/// Each variant captures the context needed for diagnostics. Instances are
/// typically constructed through the helper functions below or by converting
/// from library error types via the provided `From` implementations. None of
/// the variants are retried internally; an error terminates the enclosing
/// stream iteration.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Wraps I/O errors that occur while reading configuration files.
    #[error("failed to read configuration from {path:?}: {source}")]
    Io {
        /// Location of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Wraps YAML decoding errors.
    #[error("failed to parse configuration: {source}")]
    Parse {
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error,
    },
    /// Returned when required configuration is missing or invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Human readable message describing the configuration problem.
        message: String,
    },
    /// Request construction or network failures, propagated unchanged.
    #[error("transport error: {message}")]
    Transport {
        /// Human readable message from the HTTP layer.
        message: String,
    },
    /// Returned when a response body does not match the stream's
    /// extraction rule.
    #[error("failed to decode response for stream '{stream}': {message}")]
    Decode {
        /// Stream whose response could not be decoded.
        stream: String,
        /// Description of the decode failure.
        message: String,
    },
    /// Returned when a decoded record fails schema validation.
    #[error("record for stream '{stream}' failed schema validation: {details}")]
    Conformance {
        /// Stream whose record was rejected.
        stream: String,
        /// Collected validation failures.
        details: String,
    },
    /// Wraps serialization errors at the emission boundary.
    #[error("failed to serialize output: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: serde_json::Error,
    },
    /// Wraps I/O errors that occur while writing output messages.
    #[error("failed to write output message: {source}")]
    Emit {
        /// Underlying I/O error reported by the output sink.
        source: std::io::Error,
    },
}

impl Error {
    /// Constructs a configuration error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the configuration failure.
    pub fn config<M>(message: M) -> Self
    where
        M: Into<String>,
    {
        Self::Config {
            message: message.into(),
        }
    }

    /// Constructs a transport error from the provided displayable value.
    pub fn transport<M>(message: M) -> Self
    where
        M: Into<String>,
    {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Constructs a decode error for the named stream.
    pub fn decode<M>(stream: &str, message: M) -> Self
    where
        M: Into<String>,
    {
        Self::Decode {
            stream: stream.to_owned(),
            message: message.into(),
        }
    }

    /// Constructs a schema conformance error for the named stream.
    pub fn conformance<M>(stream: &str, details: M) -> Self
    where
        M: Into<String>,
    {
        Self::Conformance {
            stream: stream.to_owned(),
            details: details.into(),
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// Primarily intended for CLI contexts where the variant name does not
    /// add value to end users. The returned string matches the
    /// [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Parse { source }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize { source }
    }
}

impl From<reqwest::Error> for Error {
    fn from(source: reqwest::Error) -> Self {
        Self::Transport {
            message: source.to_string(),
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the configuration file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn config_constructor_populates_message() {
        let error = Error::config("league_id is required");
        match error {
            Error::Config { ref message } => {
                assert_eq!(message, "league_id is required");
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn decode_constructor_captures_stream() {
        let error = Error::decode("teams", "expected top-level field 'teams'");
        match error {
            Error::Decode {
                ref stream,
                ref message,
            } => {
                assert_eq!(stream, "teams");
                assert!(message.contains("top-level field"));
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn conformance_constructor_captures_details() {
        let error = Error::conformance("teams", "/id: not an integer");
        match error {
            Error::Conformance {
                ref stream,
                ref details,
            } => {
                assert_eq!(stream, "teams");
                assert!(details.contains("/id"));
            }
            other => panic!("expected conformance error, got {other:?}"),
        }
    }

    #[test]
    fn to_display_string_matches_display() {
        let error = Error::config("display me");
        assert_eq!(error.to_string(), error.to_display_string());
    }

    #[test]
    fn io_error_helper_wraps_path_and_source() {
        let path = std::path::Path::new("/tmp/config.yaml");
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error = super::io_error(path, io_error);

        match error {
            Error::Io {
                path: ref stored_path,
                ref source,
            } => {
                assert_eq!(stored_path, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn serde_yaml_conversion_maps_to_parse_variant() {
        let error = serde_yaml::from_str::<usize>("not-a-number").unwrap_err();
        let mapped: Error = error.into();
        assert!(matches!(mapped, Error::Parse { .. }));
    }

    #[test]
    fn serde_json_conversion_maps_to_serialize_variant() {
        let invalid = serde_json::from_str::<serde_json::Value>("not-json").unwrap_err();
        let mapped: Error = invalid.into();
        assert!(matches!(mapped, Error::Serialize { .. }));
    }
}
