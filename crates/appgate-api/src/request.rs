// Request execution and response handling
//
// Every resource call goes through here: bearer injection (with the local
// expiry check), debug body tracing, and translation of the controller's
// `{ id, message, errors }` error shape into typed errors.

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Error, FieldError};
use crate::session::Session;

const HTTP_TARGET: &str = "appgate_api::http";

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Vec<FieldError>,
}

/// First 200 characters of a response body, for error messages.
pub(crate) fn preview(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

impl Session {
    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, Error> {
        let resp = self.send(Method::GET, path, params, None::<&()>).await?;
        self.handle_response(path, resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let resp = self.send(Method::POST, path, &[], Some(body)).await?;
        self.handle_response(path, resp).await
    }

    /// POST whose body carries a secret. The body is never traced.
    pub(crate) async fn post_secret<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let resp = self
            .dispatch(Method::POST, path, &[], Some(body), false)
            .await?;
        self.handle_response(path, resp).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let resp = self.send(Method::PUT, path, &[], Some(body)).await?;
        self.handle_response(path, resp).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), Error> {
        let resp = self.send(Method::DELETE, path, &[], None::<&()>).await?;
        self.handle_empty(path, resp).await
    }

    /// GET without a bearer token, for the few endpoints the controller
    /// serves before login.
    pub(crate) async fn get_public<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} (public)");
        let resp = self
            .http()
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.handle_response(path, resp).await
    }

    async fn send<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<reqwest::Response, Error> {
        self.dispatch(method, path, params, body, true).await
    }

    async fn dispatch<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        body: Option<&B>,
        trace_body: bool,
    ) -> Result<reqwest::Response, Error> {
        let token = self.bearer()?;
        let url = self.url(path)?;
        debug!("{method} {url}");

        let mut builder = self
            .http()
            .request(method, url)
            .bearer_auth(token.expose());
        if !params.is_empty() {
            builder = builder.query(params);
        }
        if let Some(body) = body {
            if trace_body && self.debug_enabled() {
                let rendered = serde_json::to_string(body).unwrap_or_default();
                debug!(target: HTTP_TARGET, body = %rendered, "request body");
            }
            builder = builder.json(body);
        }

        builder.send().await.map_err(|e| self.transport_error(e))
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        path: &str,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(self.parse_error(path, status, resp).await);
        }

        let body = resp.text().await.map_err(|e| self.transport_error(e))?;
        if self.debug_enabled() {
            debug!(target: HTTP_TARGET, %status, body = %body, "response body");
        }
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }

    async fn handle_empty(&self, path: &str, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(path, status, resp).await)
        }
    }

    async fn parse_error(&self, path: &str, status: StatusCode, resp: reqwest::Response) -> Error {
        if status == StatusCode::UNAUTHORIZED {
            return Error::SessionExpired;
        }
        if status == StatusCode::NOT_FOUND {
            return Error::NotFound {
                path: path.to_owned(),
            };
        }

        let raw = resp.text().await.unwrap_or_default();
        if self.debug_enabled() {
            debug!(target: HTTP_TARGET, %status, body = %raw, "error body");
        }

        let parsed = serde_json::from_str::<ErrorResponse>(&raw).ok();
        let message = parsed
            .as_ref()
            .and_then(|e| e.message.clone())
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    preview(&raw).to_owned()
                }
            });

        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
            return Error::Validation {
                message,
                errors: parsed.map(|e| e.errors).unwrap_or_default(),
            };
        }

        Error::Api {
            status: status.as_u16(),
            message,
            id: parsed.and_then(|e| e.id),
        }
    }
}
