use super::{Expect, FormData, Payload, QueryParams, RequestBody, Transport, TransportError};
use crate::config::ClientConfig;
use crate::{BoxStream, Error, Result};
use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Proxy;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

const CLIENT_REQUEST_ID_HEADER: &str = "x-client-request-id";

/// reqwest-backed [`Transport`].
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| Error::configuration(format!("invalid base URL '{}': {}", config.base_url, e)))?;

        let mut headers = HeaderMap::new();
        if let Some(org) = &config.organization {
            headers.insert("OpenAI-Organization", header_value(org)?);
        }
        if let Some(project) = &config.project {
            headers.insert("OpenAI-Project", header_value(project)?);
        }

        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .default_headers(headers)
            .user_agent(concat!("merlin/", env!("CARGO_PKG_VERSION")));

        if let Some(proxy_url) = &config.proxy {
            let proxy = Proxy::all(proxy_url)
                .map_err(|e| Error::configuration(format!("invalid proxy '{}': {}", proxy_url, e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Ok(Url::parse(&joined).map_err(TransportError::from)?)
    }

    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        query: &QueryParams,
    ) -> Result<(reqwest::RequestBuilder, String)> {
        let url = self.url(path)?;
        let request_id = Uuid::new_v4().to_string();
        let mut req = self
            .client
            .request(method, url)
            .header(CLIENT_REQUEST_ID_HEADER, request_id.as_str());
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        if !query.is_empty() {
            let pairs: Vec<(&str, &str)> = query.iter().collect();
            req = req.query(&pairs);
        }
        Ok((req, request_id))
    }

    /// Send and turn non-2xx replies into [`Error::Remote`].
    async fn send(
        &self,
        req: reqwest::RequestBuilder,
        method: &str,
        path: &str,
        client_request_id: &str,
    ) -> Result<reqwest::Response> {
        let start = Instant::now();
        let resp = req.send().await.map_err(TransportError::Http)?;
        let status = resp.status();

        if status.is_success() {
            debug!(
                method,
                path,
                http_status = status.as_u16(),
                client_request_id,
                duration_ms = start.elapsed().as_millis() as u64,
                "merlin request succeeded"
            );
            return Ok(resp);
        }

        let request_id = resp
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = resp.text().await.unwrap_or_default();
        let (code, message) = error_from_body(&body);

        info!(
            method,
            path,
            http_status = status.as_u16(),
            error_code = code.as_deref().unwrap_or(""),
            request_id = request_id.as_deref().unwrap_or(""),
            client_request_id,
            duration_ms = start.elapsed().as_millis() as u64,
            "merlin request failed"
        );

        Err(Error::Remote {
            status: status.as_u16(),
            code,
            message,
            request_id,
        })
    }

    async fn read_payload(resp: reqwest::Response, expect: Expect) -> Result<Payload> {
        let bytes = resp.bytes().await.map_err(TransportError::Http)?;
        match expect {
            Expect::Bytes => Ok(Payload::Bytes(bytes)),
            Expect::Json => Ok(Payload::Json(serde_json::from_slice(&bytes)?)),
        }
    }
}

fn header_value(raw: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(raw)
        .map_err(|e| Error::configuration(format!("invalid header value '{}': {}", raw, e)))
}

/// Pull `code`/`message` out of an `{"error": {...}}` body, falling back to the raw text.
fn error_from_body(body: &str) -> (Option<String>, String) {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let err = parsed.as_ref().and_then(|v| v.get("error"));
    let code = err
        .and_then(|e| e.get("code").or_else(|| e.get("type")))
        .and_then(Value::as_str)
        .map(String::from);
    let message = err
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| body.to_string());
    (code, message)
}

fn multipart_form(form: FormData) -> Result<reqwest::multipart::Form> {
    let mut out = reqwest::multipart::Form::new();
    for (name, value) in form.fields {
        out = out.text(name, value);
    }
    for file in form.files {
        let len = file.data.len() as u64;
        let part = reqwest::multipart::Part::stream_with_length(file.data, len)
            .file_name(file.filename)
            .mime_str(&file.mime_type)
            .map_err(|e| Error::validation(format!("invalid MIME type '{}': {}", file.mime_type, e)))?;
        out = out.part(file.field, part);
    }
    Ok(out)
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, query: &QueryParams, expect: Expect) -> Result<Payload> {
        let (req, id) = self.request(reqwest::Method::GET, path, query)?;
        let resp = self.send(req, "GET", path, &id).await?;
        Self::read_payload(resp, expect).await
    }

    async fn post(
        &self,
        path: &str,
        body: RequestBody,
        query: &QueryParams,
        expect: Expect,
    ) -> Result<Payload> {
        let (mut req, id) = self.request(reqwest::Method::POST, path, query)?;
        req = match body {
            RequestBody::Empty => req,
            RequestBody::Json(v) => req.json(&v),
            RequestBody::Form(form) => req.multipart(multipart_form(form)?),
        };
        let resp = self.send(req, "POST", path, &id).await?;
        Self::read_payload(resp, expect).await
    }

    async fn delete(&self, path: &str, query: &QueryParams) -> Result<Value> {
        let (req, id) = self.request(reqwest::Method::DELETE, path, query)?;
        let resp = self.send(req, "DELETE", path, &id).await?;
        Self::read_payload(resp, Expect::Json).await?.into_json()
    }

    async fn post_stream(&self, path: &str, body: Value) -> Result<BoxStream<'static, Bytes>> {
        let (req, id) = self.request(reqwest::Method::POST, path, &QueryParams::new())?;
        let req = req
            .header(ACCEPT, "text/event-stream")
            .json(&body);
        let resp = self.send(req, "POST", path, &id).await?;

        info!(path, client_request_id = id.as_str(), "merlin stream opened");

        let byte_stream = resp
            .bytes_stream()
            .map_err(|e| Error::Transport(TransportError::Http(e)));
        Ok(Box::pin(byte_stream))
    }
}
