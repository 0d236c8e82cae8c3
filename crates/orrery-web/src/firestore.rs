//! Firestore document store over the browser's `fetch`.

use orrery_engine::persist::firestore::{decode_document, encode_document};
use orrery_engine::{DocumentPath, DocumentStore, FirestoreConfig, StoreError};
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

/// Reads and writes whole documents through the Firestore REST API.
///
/// `write` uses `PATCH` without an update mask, which replaces the document.
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    config: FirestoreConfig,
}

impl FirestoreStore {
    pub fn new(config: FirestoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FirestoreConfig {
        &self.config
    }
}

impl DocumentStore for FirestoreStore {
    async fn write(&self, path: &DocumentPath, body: &Value) -> Result<(), StoreError> {
        let doc = encode_document(body)?;
        let url = self.config.document_url(path);
        let resp = send(&url, "PATCH", Some(&doc.to_string())).await?;
        if !resp.ok() {
            return Err(status_error(&resp).await);
        }
        log::debug!("firestore: wrote {path}");
        Ok(())
    }

    async fn read(&self, path: &DocumentPath) -> Result<Option<Value>, StoreError> {
        let url = self.config.document_url(path);
        let resp = send(&url, "GET", None).await?;
        if resp.status() == 404 {
            return Ok(None);
        }
        if !resp.ok() {
            return Err(status_error(&resp).await);
        }
        let text = response_text(&resp).await?;
        let doc: Value = serde_json::from_str(&text)?;
        Ok(Some(decode_document(&doc)?))
    }
}

fn js_err(e: JsValue) -> StoreError {
    StoreError::Transport(format!("{e:?}"))
}

async fn send(url: &str, method: &str, body: Option<&str>) -> Result<Response, StoreError> {
    let opts = RequestInit::new();
    opts.set_method(method);
    opts.set_mode(RequestMode::Cors);
    if let Some(body) = body {
        let headers = Headers::new().map_err(js_err)?;
        headers.set("Content-Type", "application/json").map_err(js_err)?;
        opts.set_headers(&headers);
        opts.set_body(&JsValue::from_str(body));
    }

    let request = Request::new_with_str_and_init(url, &opts).map_err(js_err)?;
    let window = web_sys::window()
        .ok_or_else(|| StoreError::Transport("no window".to_string()))?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_err)?;
    resp_value
        .dyn_into::<Response>()
        .map_err(|_| StoreError::Transport("fetch did not return a Response".to_string()))
}

async fn response_text(resp: &Response) -> Result<String, StoreError> {
    let text_promise = resp.text().map_err(js_err)?;
    let text_val = JsFuture::from(text_promise).await.map_err(js_err)?;
    text_val
        .as_string()
        .ok_or_else(|| StoreError::Transport("response.text() was not a string".to_string()))
}

async fn status_error(resp: &Response) -> StoreError {
    // Firestore puts a human-readable reason in the error body; fall back to
    // the status line when the body is unreadable.
    let message = match response_text(resp).await {
        Ok(text) if !text.is_empty() => text,
        _ => resp.status_text(),
    };
    StoreError::Status {
        status: resp.status(),
        message,
    }
}
