// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Path template resolution for stream endpoints.
//!
//! A path template contains `{name}` placeholders that are substituted with
//! URL-encoded values from a [`TemplateContext`]. The placeholder set of
//! every stream is fixed by the stream table, so a placeholder without a
//! bound value is a configuration error, never a silent passthrough.

use std::{collections::BTreeMap, sync::OnceLock};

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Regex;

use crate::error::Error;

/// Characters escaped when a context value is substituted into a path
/// segment, on top of the control set.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

fn placeholder_pattern() -> &'static Regex {
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("placeholder pattern is valid")
    })
}

/// Named values available for placeholder substitution.
///
/// Combines static configuration values with call-specific overrides; a
/// value bound later replaces an earlier binding for the same name. Owned
/// and discarded per iteration step.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    values: BTreeMap<String, String>,
}

impl TemplateContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context seeded with the static configuration values.
    pub fn from_config(config: &crate::config::TapConfig) -> Self {
        let mut context = Self::new();
        if let Some(league_id) = config.league_id {
            context.bind("league_id", league_id.to_string());
        }
        context
    }

    /// Binds a value to a placeholder name, replacing any earlier binding.
    pub fn bind<V>(&mut self, name: &str, value: V)
    where
        V: Into<String>,
    {
        self.values.insert(name.to_owned(), value.into());
    }

    /// Returns the value bound to the given placeholder name.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Resolves a path template against a base URL and a context.
///
/// Every `{name}` placeholder is substituted with the URL-encoded string
/// form of the context value bound to `name`. Pure function of its inputs.
///
/// # Errors
///
/// Returns [`Error::Config`] naming the placeholder when a template token
/// has no bound value.
///
/// # Examples
///
/// ```
/// use tap_fpl::{resolve_path, TemplateContext};
///
/// let mut context = TemplateContext::new();
/// context.bind("manager_id", "1");
/// context.bind("gameweek", "1");
///
/// let url = resolve_path(
///     "https://x/api",
///     "/entry/{manager_id}/event/{gameweek}/picks",
///     &context,
/// )
/// .expect("all placeholders bound");
/// assert_eq!(url, "https://x/api/entry/1/event/1/picks");
/// ```
pub fn resolve_path(
    base_url: &str,
    template: &str,
    context: &TemplateContext,
) -> Result<String, Error> {
    let pattern = placeholder_pattern();
    let mut resolved = String::with_capacity(base_url.len() + template.len());
    resolved.push_str(base_url.trim_end_matches('/'));

    let mut last = 0;
    for captures in pattern.captures_iter(template) {
        let (token, name) = match (captures.get(0), captures.get(1)) {
            (Some(token), Some(name)) => (token, name.as_str()),
            _ => continue,
        };
        let value = context.value(name).ok_or_else(|| {
            Error::config(format!(
                "path template placeholder '{{{name}}}' has no bound value"
            ))
        })?;

        resolved.push_str(&template[last..token.start()]);
        resolved.push_str(&utf8_percent_encode(value, PATH_SEGMENT).to_string());
        last = token.end();
    }
    resolved.push_str(&template[last..]);

    // A brace surviving substitution means the template carries a token the
    // placeholder grammar does not admit.
    if resolved[base_url.trim_end_matches('/').len()..].contains(['{', '}']) {
        return Err(Error::config(format!(
            "path template '{template}' contains an unresolved token"
        )));
    }

    Ok(resolved)
}
