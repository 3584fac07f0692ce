//! HTTP transport for the distribution service.
//!
//! - Every request path is appended to `Settings::base_url`
//! - `Authorization: Token <token>` is attached only when a token is configured
//! - Non-2xx responses fail with `OneDistError::Http`, carrying the body
//! - Bodies that are not JSON fail with `OneDistError::Decode`

use crate::models::{OneDistError, Result, Settings};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, warn};

/// Request/response seam between the query logic and the network.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `path` and return the parsed JSON body.
    async fn get(&self, path: &str) -> Result<Value>;

    /// POST `body` as JSON to `path` and return the parsed JSON body.
    async fn post(&self, path: &str, body: &Value) -> Result<Value>;
}

/// `reqwest`-backed transport. No retries; timeouts are reqwest's defaults.
pub struct HttpTransport {
    client: reqwest::Client,
    settings: Settings,
}

impl HttpTransport {
    /// Create a transport for the given settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(OneDistError::Network)?;

        Ok(Self { client, settings })
    }

    /// Settings this transport sends requests with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url, path)
    }

    /// Build headers for a request.
    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        if let Some(ref token) = self.settings.token {
            let value = HeaderValue::from_str(&format!("Token {token}")).map_err(|_| {
                OneDistError::InvalidArgument(
                    "token contains characters not allowed in an HTTP header".to_string(),
                )
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    async fn read_json(response: reqwest::Response) -> Result<Value> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                body = %body,
                "Distribution service returned an error"
            );
            return Err(OneDistError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            OneDistError::Decode(format!("{e} (body: {})", truncate(&text, 200)))
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<Value> {
        let url = self.url(path);
        debug!(
            method = "GET",
            url = %url,
            authenticated = self.settings.is_authenticated(),
            "Sending request"
        );

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await?;

        Self::read_json(response).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let url = self.url(path);
        debug!(
            method = "POST",
            url = %url,
            authenticated = self.settings.is_authenticated(),
            "Sending request"
        );

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(body)
            .send()
            .await?;

        Self::read_json(response).await
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve exactly one canned response and hand back the raw request text.
    async fn one_shot_server(status: u16, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];

            loop {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                if request_complete(&raw) {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {status} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();

            String::from_utf8_lossy(&raw).into_owned()
        });

        (format!("http://{addr}/s/api/v0"), handle)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        raw.len() >= header_end + 4 + content_length
    }

    fn transport(base_url: String, token: Option<&str>) -> HttpTransport {
        HttpTransport::new(Settings {
            base_url,
            token: token.map(str::to_string),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_sends_token_header() {
        let (base_url, server) = one_shot_server(200, r#"[{"density": 0.4}]"#).await;
        let transport = transport(base_url, Some("secret"));

        let body = transport.get("/1d/dists/D1/pdf/?x=0").await.unwrap();
        assert_eq!(body, json!([{"density": 0.4}]));

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /s/api/v0/1d/dists/D1/pdf/?x=0 HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("authorization: token secret"));
    }

    #[tokio::test]
    async fn test_get_without_token_omits_header() {
        let (base_url, server) = one_shot_server(200, r#"{"id": "D1"}"#).await;
        let transport = transport(base_url, None);

        transport.get("/1d/dists/D1/").await.unwrap();

        let request = server.await.unwrap();
        assert!(!request.to_ascii_lowercase().contains("authorization"));
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let (base_url, server) = one_shot_server(201, r#"{"id": "D1"}"#).await;
        let transport = transport(base_url, Some("secret"));

        let payload = json!({"family": {"requested": "cinterp5_01"}, "arguments": {}});
        let body = transport.post("/1d/dists/", &payload).await.unwrap();
        assert_eq!(body["id"], "D1");

        let request = server.await.unwrap();
        let lower = request.to_ascii_lowercase();
        assert!(request.starts_with("POST /s/api/v0/1d/dists/ HTTP/1.1"));
        assert!(lower.contains("content-type: application/json"));
        assert!(lower.contains("authorization: token secret"));

        let (_, sent) = request.split_once("\r\n\r\n").unwrap();
        let sent: Value = serde_json::from_str(sent).unwrap();
        assert_eq!(sent, payload);
    }

    #[tokio::test]
    async fn test_non_2xx_is_http_error_with_body() {
        let (base_url, server) =
            one_shot_server(400, r#"{"arguments": ["quantiles must be increasing"]}"#).await;
        let transport = transport(base_url, None);

        let err = transport.get("/1d/dists/D1/pdf/?x=0").await.unwrap_err();
        server.await.unwrap();

        match err {
            OneDistError::Http { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("quantiles must be increasing"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_error() {
        let (base_url, server) = one_shot_server(200, "<html>oops</html>").await;
        let transport = transport(base_url, None);

        let err = transport.get("/1d/dists/D1/").await.unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, OneDistError::Decode(_)));
        assert!(err.to_string().contains("oops"));
    }

    #[test]
    fn test_header_rejects_bad_token() {
        let transport = transport("http://localhost".to_string(), Some("bad\ntoken"));
        assert!(matches!(
            transport.headers().unwrap_err(),
            OneDistError::InvalidArgument(_)
        ));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("abc", 10), "abc");
    }
}
