// API client module: contains a small blocking HTTP client that talks to
// the MetaMedia catalog service. The service has no token or header
// auth; every request carries the credential pair inside its JSON body.

use anyhow::{Context, Result};
use log::debug;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// Record type tag the put-media endpoint expects on every submission.
const MEDIA_TYPE: u8 = 1;

/// Credential pair merged verbatim into every outgoing request body.
#[derive(Serialize, Debug, Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

/// Where the service lives. The base URL and the three endpoint paths
/// are injected at construction; `Default` carries the routes of the
/// stock MetaMedia install.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub base_url: String,
    pub axes_path: String,
    pub licenses_path: String,
    pub put_media_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            base_url: "http://localhost".into(),
            axes_path: "index.php/api/get-axes".into(),
            licenses_path: "index.php/api/get-licenses".into(),
            put_media_path: "index.php/api/put-media".into(),
        }
    }
}

impl ServerConfig {
    pub fn axes_url(&self) -> String {
        format!("{}/{}", self.base_url, self.axes_path)
    }

    pub fn licenses_url(&self) -> String {
        format!("{}/{}", self.base_url, self.licenses_path)
    }

    pub fn put_media_url(&self) -> String {
        format!("{}/{}", self.base_url, self.put_media_path)
    }
}

/// A classification axis: a named dimension with a left/right term pair.
/// The field set is the fixed server contract; objects with extra or
/// missing keys are rejected rather than reinterpreted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Axis {
    pub name: String,
    pub left_term: String,
    pub right_term: String,
}

/// A usage license as defined on the server.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct License {
    pub id: i64,
    pub name: String,
    pub url: String,
}

/// Reference to a license: either a full record fetched from the
/// service, or a bare identifier the caller already knows.
#[derive(Debug, Clone)]
pub enum LicenseRef {
    License(License),
    Id(i64),
}

impl LicenseRef {
    /// The numeric id sent as `license-id` in the submission payload.
    pub fn id(&self) -> i64 {
        match self {
            LicenseRef::License(license) => license.id,
            LicenseRef::Id(id) => *id,
        }
    }
}

impl From<License> for LicenseRef {
    fn from(license: License) -> Self {
        LicenseRef::License(license)
    }
}

impl From<i64> for LicenseRef {
    fn from(id: i64) -> Self {
        LicenseRef::Id(id)
    }
}

/// One media record to submit. `creator` and `url` refer to the
/// original author and source of the content; `language` is the
/// two-letter upper-case code ('EN', 'DE', 'ES') of the media's
/// language, which the client passes through unvalidated.
#[derive(Debug, Clone)]
pub struct MediaSubmission {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub creator: String,
    pub url: String,
    pub license: LicenseRef,
    pub language: String,
}

/// Wire shape of a put-media request. Field names follow the server
/// contract, which hyphenates the renamed ones.
#[derive(Serialize, Debug)]
struct PutMediaRequest<'a> {
    #[serde(rename = "type")]
    media_type: u8,
    title: &'a str,
    excerpt: &'a str,
    content: &'a str,
    #[serde(rename = "original-creator")]
    original_creator: &'a str,
    #[serde(rename = "original-url")]
    original_url: &'a str,
    #[serde(rename = "license-id")]
    license_id: i64,
    language: &'a str,
    user: &'a str,
    password: &'a str,
}

impl<'a> PutMediaRequest<'a> {
    fn new(media: &'a MediaSubmission, auth: &'a Credentials) -> Self {
        PutMediaRequest {
            media_type: MEDIA_TYPE,
            title: &media.title,
            excerpt: &media.excerpt,
            content: &media.content,
            original_creator: &media.creator,
            original_url: &media.url,
            license_id: media.license.id(),
            language: &media.language,
            user: &auth.user,
            password: &auth.password,
        }
    }
}

/// Every request body is the literal form `json=<encoded payload>`.
fn encode_request_body<T: Serialize>(payload: &T) -> Result<String> {
    let json = serde_json::to_string(payload).context("Encoding request payload")?;
    Ok(format!("json={}", json))
}

/// Client for the MetaMedia catalog service. Holds a reqwest blocking
/// client, the endpoint configuration and the credential pair; each
/// operation is a single stateless round trip.
#[derive(Clone)]
pub struct MetaMediaClient {
    client: Client,
    config: ServerConfig,
    credentials: Credentials,
}

impl MetaMediaClient {
    /// Create a client for the given endpoints and credentials. No
    /// network call happens here.
    pub fn new(config: ServerConfig, credentials: Credentials) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(MetaMediaClient {
            client,
            config,
            credentials,
        })
    }

    /// Create a client configured from the environment variables
    /// `METAMEDIA_URL`, `METAMEDIA_USER` and `METAMEDIA_PASSWORD`,
    /// falling back to the stock install and its anonymous account.
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("METAMEDIA_URL").unwrap_or_else(|_| "http://localhost".into());
        let user = std::env::var("METAMEDIA_USER").unwrap_or_else(|_| "anonymous".into());
        let password = std::env::var("METAMEDIA_PASSWORD").unwrap_or_else(|_| "qwerty".into());
        let config = ServerConfig {
            base_url,
            ..ServerConfig::default()
        };
        MetaMediaClient::new(config, Credentials { user, password })
    }

    /// Fetch the classification axes. Every call re-issues the network
    /// round trip; nothing is cached client-side.
    pub fn list_axes(&self) -> Result<Vec<Axis>> {
        self.fetch_records(&self.config.axes_url(), "axes")
    }

    /// Fetch the license definitions. Same contract as `list_axes`.
    pub fn list_licenses(&self) -> Result<Vec<License>> {
        self.fetch_records(&self.config.licenses_url(), "licenses")
    }

    /// Submit a media record. The server's reply body is not part of
    /// the contract and is never read; only the HTTP status is checked.
    pub fn submit_media(&self, media: &MediaSubmission) -> Result<()> {
        let payload = PutMediaRequest::new(media, &self.credentials);
        let body = encode_request_body(&payload)?;
        let url = self.config.put_media_url();
        debug!("PUT {} ({} byte body)", url, body.len());
        let res = self
            .client
            .put(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .context("Failed to send put-media request")?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().unwrap_or_else(|_| "".into());
            anyhow::bail!("Submitting media failed: {} - {}", status, txt);
        }
        Ok(())
    }

    /// GET a `json=`-framed request with the bare credential payload and
    /// decode the response as a non-empty array of records.
    fn fetch_records<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<Vec<T>> {
        let body = encode_request_body(&self.credentials)?;
        debug!("GET {}", url);
        let res = self
            .client
            .get(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .with_context(|| format!("Failed to send {} request", what))?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().unwrap_or_else(|_| "".into());
            anyhow::bail!("Fetching {} failed: {} - {}", what, status, txt);
        }
        let text = res
            .text()
            .with_context(|| format!("Reading {} response body", what))?;
        let json: serde_json::Value = serde_json::from_str(&text)
            .with_context(|| format!("{} response is not valid JSON", what))?;
        let records: Vec<T> = serde_json::from_value(json)
            .with_context(|| format!("{} response is not an array of records", what))?;
        if records.is_empty() {
            anyhow::bail!("{} response contained no records", what);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config_matches_the_stock_install() {
        let config = ServerConfig::default();
        assert_eq!(config.axes_url(), "http://localhost/index.php/api/get-axes");
        assert_eq!(
            config.licenses_url(),
            "http://localhost/index.php/api/get-licenses"
        );
        assert_eq!(
            config.put_media_url(),
            "http://localhost/index.php/api/put-media"
        );
    }

    #[test]
    fn test_axis_parses_from_a_server_object() {
        let value = json!({
            "name": "Scope",
            "left_term": "Narrow",
            "right_term": "Broad"
        });

        let axis: Axis = serde_json::from_value(value).unwrap();
        assert_eq!(
            axis,
            Axis {
                name: "Scope".into(),
                left_term: "Narrow".into(),
                right_term: "Broad".into(),
            }
        );
    }

    #[test]
    fn test_axis_rejects_an_unknown_field() {
        let value = json!({
            "name": "Scope",
            "left_term": "Narrow",
            "right_term": "Broad",
            "weight": 3
        });

        assert!(serde_json::from_value::<Axis>(value).is_err());
    }

    #[test]
    fn test_axis_rejects_a_missing_field() {
        let value = json!({ "name": "Scope" });

        assert!(serde_json::from_value::<Axis>(value).is_err());
    }

    #[test]
    fn test_license_parses_from_a_server_object() {
        let value = json!({
            "id": 3,
            "name": "CC BY-SA",
            "url": "http://creativecommons.org/licenses/by-sa/3.0/"
        });

        let license: License = serde_json::from_value(value).unwrap();
        assert_eq!(license.id, 3);
        assert_eq!(license.name, "CC BY-SA");
    }

    #[test]
    fn test_license_rejects_a_non_numeric_id() {
        let value = json!({
            "id": "three",
            "name": "CC BY-SA",
            "url": "http://creativecommons.org/licenses/by-sa/3.0/"
        });

        assert!(serde_json::from_value::<License>(value).is_err());
    }

    #[test]
    fn test_license_ref_extracts_the_numeric_id() {
        // A bare id and a full record must feed license-id the same way.
        assert_eq!(LicenseRef::Id(42).id(), 42);

        let license = License {
            id: 7,
            name: "CC0".into(),
            url: "http://creativecommons.org/publicdomain/zero/1.0/".into(),
        };
        assert_eq!(LicenseRef::from(license).id(), 7);
        assert_eq!(LicenseRef::from(42i64).id(), 42);
    }

    fn sample_submission(license: LicenseRef) -> MediaSubmission {
        MediaSubmission {
            title: "A title".into(),
            excerpt: "An excerpt".into(),
            content: "The content".into(),
            creator: "V. Terron".into(),
            url: "http://example.com/article".into(),
            license,
            language: "EN".into(),
        }
    }

    fn anonymous() -> Credentials {
        Credentials {
            user: "anonymous".into(),
            password: "qwerty".into(),
        }
    }

    #[test]
    fn test_put_media_request_carries_exactly_the_wire_keys() {
        let media = sample_submission(LicenseRef::Id(42));
        let auth = anonymous();
        let value = serde_json::to_value(PutMediaRequest::new(&media, &auth)).unwrap();

        let object = value.as_object().unwrap();
        let mut keys: Vec<&str> = object.keys().map(|k| k.as_str()).collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "content",
                "excerpt",
                "language",
                "license-id",
                "original-creator",
                "original-url",
                "password",
                "title",
                "type",
                "user",
            ]
        );

        assert_eq!(value["type"], json!(1));
        assert_eq!(value["license-id"], json!(42));
        assert_eq!(value["original-creator"], json!("V. Terron"));
        assert_eq!(value["original-url"], json!("http://example.com/article"));
        assert_eq!(value["user"], json!("anonymous"));
        assert_eq!(value["password"], json!("qwerty"));
    }

    #[test]
    fn test_put_media_request_takes_the_id_from_a_license_record() {
        let license = License {
            id: 7,
            name: "CC BY".into(),
            url: "http://creativecommons.org/licenses/by/3.0/".into(),
        };
        let media = sample_submission(LicenseRef::License(license));
        let auth = anonymous();

        let value = serde_json::to_value(PutMediaRequest::new(&media, &auth)).unwrap();
        assert_eq!(value["license-id"], json!(7));
    }

    #[test]
    fn test_request_body_is_the_json_form() {
        let body = encode_request_body(&anonymous()).unwrap();

        let json = body.strip_prefix("json=").expect("body must start with json=");
        let value: serde_json::Value = serde_json::from_str(json).unwrap();
        assert_eq!(value["user"], json!("anonymous"));
        assert_eq!(value["password"], json!("qwerty"));
    }
}
