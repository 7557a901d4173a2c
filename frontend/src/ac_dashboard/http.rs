// frontend/src/ac_dashboard/http.rs
//
// One request path for every page: resolve URL, attach the bearer token,
// send, then hand status + body to the shared decoder.

use aircontrol_shared::api::{decode_ack, decode_list, decode_record, decode_response};
use aircontrol_shared::{ApiError, ApiMessage};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{UrlConfig, join_url, session};

#[cfg(not(target_arch = "wasm32"))]
const CONNECTION_TIMEOUT_MS: u64 = 8000;
#[cfg(not(target_arch = "wasm32"))]
const REQUEST_TIMEOUT_MS: u64 = 20000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// A file picked in a form, already read into memory.
#[derive(Clone, Debug, PartialEq)]
pub struct Upload {
    pub filename: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

pub enum Body {
    Empty,
    Json(String),
    Multipart {
        fields: Vec<(&'static str, String)>,
        file: Option<(&'static str, Upload)>,
    },
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

fn resolve_url(path: &str) -> Result<String, ApiError> {
    let base = UrlConfig::base_http();

    #[cfg(target_arch = "wasm32")]
    if base.is_empty() {
        let w = web_sys::window().ok_or_else(|| ApiError::Network("no window".into()))?;
        let origin = w
            .location()
            .origin()
            .map_err(|_| ApiError::Network("failed to read window.location.origin".into()))?;
        return Ok(join_url(&origin, path));
    }

    Ok(join_url(&base, path))
}

#[cfg(target_arch = "wasm32")]
fn form_data(
    fields: Vec<(&'static str, String)>,
    file: Option<(&'static str, Upload)>,
) -> Result<web_sys::FormData, ApiError> {
    let js_err = |what: &str| ApiError::Network(format!("multipart: {what}"));
    let fd = web_sys::FormData::new().map_err(|_| js_err("FormData"))?;
    for (k, v) in fields {
        fd.append_with_str(k, &v).map_err(|_| js_err(k))?;
    }
    if let Some((name, up)) = file {
        let parts = js_sys::Array::new();
        parts.push(&js_sys::Uint8Array::from(up.bytes.as_slice()));
        let opts = web_sys::BlobPropertyBag::new();
        opts.set_type(&up.mime);
        let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &opts)
            .map_err(|_| js_err("Blob"))?;
        fd.append_with_blob_and_filename(name, &blob, &up.filename)
            .map_err(|_| js_err(name))?;
    }
    Ok(fd)
}

#[cfg(target_arch = "wasm32")]
async fn send(method: Method, path: &str, body: Body) -> Result<(u16, String), ApiError> {
    use gloo_net::http::Request;

    let url = resolve_url(path)?;
    let mut rb = match method {
        Method::Get => Request::get(&url),
        Method::Post => Request::post(&url),
        Method::Put => Request::put(&url),
        Method::Delete => Request::delete(&url),
    };
    if let Some(token) = session::token() {
        rb = rb.header("Authorization", &bearer(&token));
    }

    let req = match body {
        Body::Empty => rb.build(),
        Body::Json(s) => rb.header("Content-Type", "application/json").body(s),
        Body::Multipart { fields, file } => rb.body(form_data(fields, file)?),
    }
    .map_err(|e| ApiError::Network(e.to_string()))?;

    let resp = req
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    Ok((status, text))
}

#[cfg(not(target_arch = "wasm32"))]
static CLIENT: once_cell::sync::Lazy<reqwest::Client> = once_cell::sync::Lazy::new(|| {
    reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_millis(CONNECTION_TIMEOUT_MS))
        .timeout(std::time::Duration::from_millis(REQUEST_TIMEOUT_MS))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

#[cfg(not(target_arch = "wasm32"))]
pub fn classify_reqwest_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        return "timeout".into();
    }
    if e.is_connect() {
        return "connect failed (refused/unreachable/DNS/TLS)".into();
    }
    if e.is_request() {
        return "request build/dispatch error".into();
    }
    if e.is_body() {
        return "body read error".into();
    }
    e.to_string()
}

#[cfg(not(target_arch = "wasm32"))]
async fn send(method: Method, path: &str, body: Body) -> Result<(u16, String), ApiError> {
    let url = resolve_url(path)?;
    let m = match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    };
    let mut rb = CLIENT.request(m, &url);
    if let Some(token) = session::token() {
        rb = rb.header(reqwest::header::AUTHORIZATION, bearer(&token));
    }

    rb = match body {
        Body::Empty => rb,
        Body::Json(s) => rb
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(s),
        Body::Multipart { fields, file } => {
            let mut form = reqwest::multipart::Form::new();
            for (k, v) in fields {
                form = form.text(k, v);
            }
            if let Some((name, up)) = file {
                let part = reqwest::multipart::Part::bytes(up.bytes)
                    .file_name(up.filename)
                    .mime_str(&up.mime)
                    .map_err(|e| ApiError::Network(e.to_string()))?;
                form = form.part(name, part);
            }
            rb.multipart(form)
        }
    };

    let resp = rb
        .send()
        .await
        .map_err(|e| ApiError::Network(classify_reqwest_error(&e)))?;
    let status = resp.status().as_u16();
    let text = resp.text().await.unwrap_or_default();
    Ok((status, text))
}

fn json_body<B: Serialize>(body: &B) -> Result<Body, ApiError> {
    serde_json::to_string(body)
        .map(Body::Json)
        .map_err(|e| ApiError::Decode(e.to_string()))
}

/// Sends and returns the raw status and body; no status handling.
pub async fn send_raw(method: Method, path: &str, body: Body) -> Result<(u16, String), ApiError> {
    let res = send(method, path, body).await;
    if let Err(e) = &res {
        log!(warn: "[http] {} {path} failed: {e}", method.as_str());
    }
    res
}

async fn exchange<T>(
    method: Method,
    path: &str,
    body: Body,
    decode: fn(u16, &str) -> Result<T, ApiError>,
) -> Result<T, ApiError> {
    let (status, text) = send_raw(method, path, body).await?;
    let out = decode(status, &text);
    if let Err(e) = &out {
        log!(warn: "[http] {} {path} -> {status}: {e}", method.as_str());
        if e.is_unauthorized() {
            session::expire();
        }
    }
    out
}

pub async fn get_json<T: DeserializeOwned>(path: &str) -> Result<T, ApiError> {
    exchange(Method::Get, path, Body::Empty, decode_response::<T>).await
}

pub async fn get_record<T: DeserializeOwned>(path: &str) -> Result<T, ApiError> {
    exchange(Method::Get, path, Body::Empty, decode_record::<T>).await
}

pub async fn get_list<T: DeserializeOwned>(path: &str) -> Result<Vec<T>, ApiError> {
    exchange(Method::Get, path, Body::Empty, decode_list::<T>).await
}

pub async fn post_json<B: Serialize>(path: &str, body: &B) -> Result<ApiMessage, ApiError> {
    exchange(Method::Post, path, json_body(body)?, decode_ack).await
}

pub async fn put_json<B: Serialize>(path: &str, body: &B) -> Result<ApiMessage, ApiError> {
    exchange(Method::Put, path, json_body(body)?, decode_ack).await
}

pub async fn delete(path: &str) -> Result<ApiMessage, ApiError> {
    exchange(Method::Delete, path, Body::Empty, decode_ack).await
}

pub async fn post_multipart(
    path: &str,
    fields: Vec<(&'static str, String)>,
    file: Option<(&'static str, Upload)>,
) -> Result<ApiMessage, ApiError> {
    exchange(Method::Post, path, Body::Multipart { fields, file }, decode_ack).await
}

/// `/api/lecturas?aire_id=3` style query strings.
pub fn with_query(path: &str, params: &[(&str, Option<String>)]) -> String {
    let q: Vec<String> = params
        .iter()
        .filter_map(|(k, v)| v.as_ref().map(|v| format!("{k}={}", encode_component(v))))
        .collect();
    if q.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{}", q.join("&"))
    }
}

fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_skips_missing_params() {
        assert_eq!(with_query("/api/lecturas", &[("aire_id", None)]), "/api/lecturas");
        assert_eq!(
            with_query("/api/lecturas", &[("aire_id", Some("7".into()))]),
            "/api/lecturas?aire_id=7"
        );
        assert_eq!(
            with_query(
                "/api/estadisticas/ubicacion",
                &[("ubicacion", Some("Sala Técnica".into()))]
            ),
            "/api/estadisticas/ubicacion?ubicacion=Sala%20T%C3%A9cnica"
        );
    }

    #[test]
    fn bearer_header_value() {
        assert_eq!(bearer("abc.def"), "Bearer abc.def");
    }
}
