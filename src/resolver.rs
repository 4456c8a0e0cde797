//! VIAF authority identifier resolution.
//!
//! This module provides [`ViafClient`] for looking up a record's control
//! number against the VIAF `sourceID` linked-data endpoint and extracting
//! up to three cross-reference identifiers: ISNI, the VIAF numeric
//! identifier, and the Wikidata entity code.
//!
//! The [`IdentifierResolver`] trait is the seam between the lookup and the
//! processing pipeline, so the pipeline can be driven by a stub in tests.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::{MarclinkError, Result};

/// Fixed source-prefix token for the VIAF `sourceID` lookup.
const SOURCE_PREFIX: &str = "ERRR";

/// Production VIAF base URL.
const VIAF_BASE_URL: &str = "https://www.viaf.org";

/// HTTP request timeout.
///
/// The upstream service imposes none; a bounded timeout keeps a single
/// stalled lookup from hanging the whole batch.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Authority identifiers resolved for one record.
///
/// Each code is an explicit optional: absence means the service did not
/// return that key, which is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierCodes {
    /// ISNI code (first element of the `ISNI` array).
    pub isni: Option<String>,
    /// VIAF numeric identifier (the `viafID` value).
    pub viaf: Option<String>,
    /// Wikidata entity code (first element of the `WKP` array).
    pub wikidata: Option<String>,
}

impl IdentifierCodes {
    /// True when none of the three codes is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.isni.is_none() && self.viaf.is_none() && self.wikidata.is_none()
    }
}

/// Resolves a record identifier to authority codes.
///
/// One lookup per invocation; implementations must not cache or retry,
/// since the pipeline's call count is observable behavior.
pub trait IdentifierResolver {
    /// Look up `identifier` and return whatever codes the service knows.
    ///
    /// # Errors
    ///
    /// Returns a resolution failure (`ServiceUnavailable`,
    /// `MalformedResponse`, or `NetworkFailure`) when the lookup cannot
    /// produce codes. Callers are expected to degrade the affected record
    /// to "no codes available" rather than abort.
    fn resolve(&self, identifier: &str) -> Result<IdentifierCodes>;
}

/// Blocking HTTP client for the VIAF `justlinks` endpoint.
#[derive(Debug)]
pub struct ViafClient {
    client: Client,
    base_url: String,
}

impl ViafClient {
    /// Create a client against the production VIAF service.
    ///
    /// # Errors
    ///
    /// Returns `NetworkFailure` if the underlying HTTP client cannot be
    /// constructed.
    pub fn new() -> Result<Self> {
        Self::with_base_url(VIAF_BASE_URL)
    }

    /// Create a client against an alternate base URL.
    ///
    /// # Errors
    ///
    /// Returns `NetworkFailure` if the underlying HTTP client cannot be
    /// constructed.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MarclinkError::NetworkFailure(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The justlinks lookup URL for an identifier.
    fn lookup_url(&self, identifier: &str) -> String {
        format!(
            "{}/viaf/sourceID/{SOURCE_PREFIX}|{identifier}/justlinks.json",
            self.base_url
        )
    }
}

impl IdentifierResolver for ViafClient {
    fn resolve(&self, identifier: &str) -> Result<IdentifierCodes> {
        let url = self.lookup_url(identifier);
        debug!(identifier, %url, "issuing VIAF lookup");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| MarclinkError::NetworkFailure(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| MarclinkError::NetworkFailure(e.to_string()))?;

        codes_from_response(status, &body)
    }
}

/// Decode an authority service response into identifier codes.
///
/// Non-200 statuses and unparseable bodies map to the typed resolution
/// failures; a parseable body missing any of the three keys is simply a
/// response with those codes absent.
pub fn codes_from_response(status: u16, body: &str) -> Result<IdentifierCodes> {
    if status != 200 {
        return Err(MarclinkError::ServiceUnavailable { status });
    }

    let value: Value = serde_json::from_str(body)
        .map_err(|e| MarclinkError::MalformedResponse(e.to_string()))?;

    Ok(codes_from_json(&value))
}

/// Extract the three identifier codes from a parsed justlinks document.
fn codes_from_json(value: &Value) -> IdentifierCodes {
    IdentifierCodes {
        isni: first_array_entry(value, "ISNI"),
        viaf: value
            .get("viafID")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string),
        wikidata: first_array_entry(value, "WKP"),
    }
}

/// First string element of the array at `key`, if present and non-empty.
fn first_array_entry(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .and_then(|entries| entries.first())
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_url() {
        let client = ViafClient::new().unwrap();
        assert_eq!(
            client.lookup_url("12345"),
            "https://www.viaf.org/viaf/sourceID/ERRR|12345/justlinks.json"
        );
    }

    #[test]
    fn test_lookup_url_alternate_base() {
        let client = ViafClient::with_base_url("http://localhost:9999/").unwrap();
        assert_eq!(
            client.lookup_url("abc"),
            "http://localhost:9999/viaf/sourceID/ERRR|abc/justlinks.json"
        );
    }

    #[test]
    fn test_all_three_codes_extracted() {
        let body = r#"{
            "viafID": "12345",
            "ISNI": ["0000000123456789"],
            "WKP": ["Q42"]
        }"#;
        let codes = codes_from_response(200, body).unwrap();
        assert_eq!(codes.isni.as_deref(), Some("0000000123456789"));
        assert_eq!(codes.viaf.as_deref(), Some("12345"));
        assert_eq!(codes.wikidata.as_deref(), Some("Q42"));
        assert!(!codes.is_empty());
    }

    #[test]
    fn test_viaf_only_body() {
        let codes = codes_from_response(200, r#"{"viafID": "999"}"#).unwrap();
        assert_eq!(codes.isni, None);
        assert_eq!(codes.viaf.as_deref(), Some("999"));
        assert_eq!(codes.wikidata, None);
    }

    #[test]
    fn test_missing_keys_are_not_an_error() {
        let codes = codes_from_response(200, "{}").unwrap();
        assert!(codes.is_empty());
    }

    #[test]
    fn test_empty_strings_treated_as_absent() {
        let body = r#"{"viafID": "", "ISNI": [""], "WKP": []}"#;
        let codes = codes_from_response(200, body).unwrap();
        assert!(codes.is_empty());
    }

    #[test]
    fn test_http_404_is_service_unavailable() {
        let result = codes_from_response(404, "not found");
        assert!(matches!(
            result,
            Err(MarclinkError::ServiceUnavailable { status: 404 })
        ));
    }

    #[test]
    fn test_malformed_json_is_typed_failure() {
        let result = codes_from_response(200, "{not json");
        assert!(matches!(result, Err(MarclinkError::MalformedResponse(_))));
    }
}
