use anyhow::{Context, Result, anyhow};
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderValue, USER_AGENT};
use serde::Deserialize;
use serde_json::{Map, Value};

/// One entity's snapshot as returned by `/api/states`.
///
/// Fields the tool does not read are dropped during deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct StateRecord {
    pub entity_id: String,
    pub state: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct HaClient {
    base_url: String,
    http: Client,
    key: Option<String>,
}

impl HaClient {
    pub fn new(base_url: &str, key: Option<&str>) -> Result<Self> {
        Url::parse(base_url).context("parsing Home Assistant URL")?;
        let http = Client::builder()
            .user_agent(HeaderValue::from_static("scenegen/0.1"))
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            // Concatenated rather than joined so a path prefix on the base
            // URL (e.g. behind a reverse proxy) survives.
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            key: key.map(str::to_string),
        })
    }

    /// Fetch every entity state in one GET. Any non-200 response is fatal.
    pub fn get_states(&self) -> Result<Vec<StateRecord>> {
        let endpoint = format!("{}/api/states", self.base_url);

        let mut request = self
            .http
            .get(&endpoint)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(USER_AGENT, HeaderValue::from_static("scenegen/0.1"));

        if let Some(key) = &self.key {
            request = request.header("x-ha-access", key);
        }

        let response = request.send().context("calling Home Assistant")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!(
                "Error calling Home Assistant: {}, {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            ));
        }

        response.json().context("decoding state list")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn sends_access_key_and_parses_states() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/states")
                .header("x-ha-access", "sekrit");
            then.status(200).json_body(json!([
                {"entity_id": "light.lamp1", "state": "on",
                 "attributes": {"brightness": 254}},
                {"entity_id": "switch.fan1", "state": "off", "attributes": {}}
            ]));
        });

        let client = HaClient::new(&server.base_url(), Some("sekrit")).unwrap();
        let states = client.get_states().unwrap();

        mock.assert();
        assert_eq!(states.len(), 2);
        assert_eq!(states[0].entity_id, "light.lamp1");
        assert_eq!(states[0].attributes["brightness"], 254);
        assert_eq!(states[1].state, "off");
    }

    #[test]
    fn works_without_an_access_key() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/api/states");
            then.status(200).json_body(json!([]));
        });

        let client = HaClient::new(&server.base_url(), None).unwrap();
        let states = client.get_states().unwrap();

        mock.assert();
        assert!(states.is_empty());
    }

    #[test]
    fn non_200_is_fatal_with_status_and_reason() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/states");
            then.status(401);
        });

        let client = HaClient::new(&server.base_url(), Some("bad")).unwrap();
        let err = client.get_states().unwrap_err();

        assert_eq!(
            err.to_string(),
            "Error calling Home Assistant: 401, Unauthorized"
        );
    }

    #[test]
    fn missing_attributes_default_to_empty() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/states");
            then.status(200)
                .json_body(json!([{"entity_id": "switch.fan1", "state": "on"}]));
        });

        let client = HaClient::new(&server.base_url(), None).unwrap();
        let states = client.get_states().unwrap();
        assert!(states[0].attributes.is_empty());
    }

    #[test]
    fn base_url_keeps_path_prefix() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/homeassistant/api/states");
            then.status(200).json_body(json!([]));
        });

        let url = format!("{}/homeassistant/", server.base_url());
        let client = HaClient::new(&url, None).unwrap();
        client.get_states().unwrap();
        mock.assert();
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(HaClient::new("not a url", None).is_err());
    }
}
