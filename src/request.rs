//! Outbound request construction.
//!
//! Builds the complete request value for a resolved URL, merging optional
//! authentication material into the base headers and query parameters. No
//! retry and no pagination-token handling: no stream here paginates.

use std::collections::BTreeMap;

use crate::config::AuthConfig;

/// HTTP method used for every stream endpoint.
pub const REQUEST_METHOD: &str = "GET";

/// A fully-prepared outbound request.
///
/// Carries everything the transport needs to dispatch one call; the
/// transport surfaces any malformed-URL or encoding error unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    /// HTTP method; always `GET` for this API.
    pub method: &'static str,
    /// Fully-resolved request URL.
    pub url: String,
    /// Request headers, base values merged with authentication overrides.
    pub headers: BTreeMap<String, String>,
    /// Query parameters supplied by the authenticator.
    pub params: Vec<(String, String)>,
}

/// Builds a prepared request for the given URL.
///
/// Authentication-supplied headers replace base headers on key collision;
/// authentication parameters are appended as query parameters.
pub fn build_request(url: String, auth: Option<&AuthConfig>) -> PreparedRequest {
    let mut headers = BTreeMap::new();
    headers.insert("Accept".to_owned(), "application/json".to_owned());

    let mut params = Vec::new();
    if let Some(auth) = auth {
        for (name, value) in &auth.headers {
            headers.insert(name.clone(), value.clone());
        }
        for (name, value) in &auth.params {
            params.push((name.clone(), value.clone()));
        }
    }

    PreparedRequest {
        method: REQUEST_METHOD,
        url,
        headers,
        params,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{build_request, REQUEST_METHOD};
    use crate::config::AuthConfig;

    #[test]
    fn builds_get_request_with_accept_header() {
        let request = build_request("https://x/api/fixtures".to_owned(), None);

        assert_eq!(request.method, REQUEST_METHOD);
        assert_eq!(request.url, "https://x/api/fixtures");
        assert_eq!(
            request.headers.get("Accept").map(String::as_str),
            Some("application/json")
        );
        assert!(request.params.is_empty());
    }

    #[test]
    fn merges_auth_headers_over_base_headers() {
        let mut headers = BTreeMap::new();
        headers.insert("Accept".to_owned(), "application/vnd.api+json".to_owned());
        headers.insert("Authorization".to_owned(), "Bearer token".to_owned());
        let auth = AuthConfig {
            headers,
            params: BTreeMap::new(),
        };

        let request = build_request("https://x/api/fixtures".to_owned(), Some(&auth));

        assert_eq!(
            request.headers.get("Accept").map(String::as_str),
            Some("application/vnd.api+json")
        );
        assert_eq!(
            request.headers.get("Authorization").map(String::as_str),
            Some("Bearer token")
        );
    }

    #[test]
    fn copies_auth_params_into_query() {
        let mut params = BTreeMap::new();
        params.insert("api_key".to_owned(), "secret".to_owned());
        let auth = AuthConfig {
            headers: BTreeMap::new(),
            params,
        };

        let request = build_request("https://x/api/fixtures".to_owned(), Some(&auth));

        assert_eq!(
            request.params,
            vec![("api_key".to_owned(), "secret".to_owned())]
        );
    }
}
