// Fbxmon - Freebox telemetry exporter for Graphite and InfluxDB
//
// Copyright 2022 Nick Pillitteri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

use crate::error::{ErrorKind, FreeboxError};
use hyper::client::HttpConnector;
use hyper::header::CONTENT_TYPE;
use hyper::{Body, Client, Method, Request, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "mafreebox.freebox.fr";
pub const DEFAULT_APP_ID: &str = "fr.freebox.seximonitor";
pub const DEFAULT_APP_NAME: &str = "SexiMonitor";
pub const DEFAULT_APP_VERSION: &str = "0.4.2";
pub const DEFAULT_DEVICE_NAME: &str = "SexiServer";

const API_BASE: &str = "/api/v3/";
const AUTH_HEADER: &str = "X-Fbx-App-Auth";
const JSON_FORMAT: &str = "application/json";

/// Identity this application announces to the Freebox when registering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppIdentity {
    pub app_id: String,
    pub app_name: String,
    pub app_version: String,
    pub device_name: String,
}

impl Default for AppIdentity {
    fn default() -> Self {
        AppIdentity {
            app_id: DEFAULT_APP_ID.to_owned(),
            app_name: DEFAULT_APP_NAME.to_owned(),
            app_version: DEFAULT_APP_VERSION.to_owned(),
            device_name: DEFAULT_DEVICE_NAME.to_owned(),
        }
    }
}

/// Per-invocation settings handed to each component that talks to the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub endpoint: String,
    pub identity: AppIdentity,
}

impl ApiConfig {
    pub fn new<S: Into<String>>(endpoint: S, identity: AppIdentity) -> Self {
        ApiConfig {
            endpoint: endpoint.into(),
            identity,
        }
    }
}

/// Short-lived token obtained from the login handshake, sent with every
/// telemetry request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
}

impl Session {
    pub fn new<S: Into<String>>(token: S) -> Self {
        Session { token: token.into() }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Common envelope of every Freebox API response.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    result: Option<T>,
    msg: Option<String>,
    error_code: Option<String>,
}

/// Thin JSON client for the `/api/v3/` tree of a single Freebox.
///
/// Every call is fail-fast: a transport error, a non-200 status, a
/// `success: false` envelope, or a body that doesn't match the expected type
/// results in an error. Nothing is retried.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http: Client<HttpConnector>,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        ApiClient {
            config,
            http: Client::new(),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}{}", self.config.endpoint, API_BASE, path)
    }

    /// GET a resource under the API root, authenticated with the given session if any.
    pub async fn get<T>(&self, path: &str, session: Option<&Session>) -> Result<T, FreeboxError>
    where
        T: DeserializeOwned,
    {
        let mut builder = Request::builder().method(Method::GET).uri(self.url(path));
        if let Some(s) = session {
            builder = builder.header(AUTH_HEADER, s.token());
        }

        let req = builder
            .body(Body::empty())
            .map_err(|e| FreeboxError::KindMsgCause(ErrorKind::Request, "unable to build request", Box::new(e)))?;

        self.send(path, req).await
    }

    /// POST a JSON body to a resource under the API root.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, FreeboxError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body)
            .map_err(|e| FreeboxError::KindMsgCause(ErrorKind::Request, "unable to encode request body", Box::new(e)))?;

        let req = Request::builder()
            .method(Method::POST)
            .uri(self.url(path))
            .header(CONTENT_TYPE, JSON_FORMAT)
            .body(Body::from(payload))
            .map_err(|e| FreeboxError::KindMsgCause(ErrorKind::Request, "unable to build request", Box::new(e)))?;

        self.send(path, req).await
    }

    async fn send<T>(&self, path: &str, req: Request<Body>) -> Result<T, FreeboxError>
    where
        T: DeserializeOwned,
    {
        tracing::debug!(message = "sending api request", method = %req.method(), uri = %req.uri());

        let res = self
            .http
            .request(req)
            .await
            .map_err(|e| FreeboxError::KindMsgCause(ErrorKind::Request, "unable to reach freebox api", Box::new(e)))?;

        let status = res.status();
        let bytes = hyper::body::to_bytes(res.into_body())
            .await
            .map_err(|e| FreeboxError::KindMsgCause(ErrorKind::Response, "unable to read response body", Box::new(e)))?;

        tracing::debug!(message = "received api response", path = path, status = %status, bytes = bytes.len());

        if status != StatusCode::OK {
            return Err(FreeboxError::Status(
                ErrorKind::Response,
                status,
                path.to_owned(),
                String::from_utf8_lossy(&bytes).into_owned(),
            ));
        }

        parse_envelope(&bytes)
    }
}

/// Decode a response body and unwrap the `result` member of the envelope.
pub(crate) fn parse_envelope<T>(bytes: &[u8]) -> Result<T, FreeboxError>
where
    T: DeserializeOwned,
{
    let envelope: Envelope<T> = serde_json::from_slice(bytes)
        .map_err(|e| FreeboxError::KindMsgCause(ErrorKind::Response, "unable to decode api response", Box::new(e)))?;

    if !envelope.success {
        return Err(FreeboxError::Api(
            ErrorKind::Response,
            envelope.error_code.unwrap_or_else(|| "unknown".to_owned()),
            envelope.msg.unwrap_or_default(),
        ));
    }

    envelope
        .result
        .ok_or(FreeboxError::KindMsg(ErrorKind::Response, "api response missing result"))
}
