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

use crate::client::{ApiClient, Session};
use crate::credentials::Credentials;
use crate::error::{ErrorKind, FreeboxError};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use std::fmt::{self, Formatter};

/// State of an application registration as reported by the Freebox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationStatus {
    Unknown,
    Pending,
    Timeout,
    Granted,
    Denied,
}

impl fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuthorizationStatus::Unknown => "unknown",
            AuthorizationStatus::Pending => "pending",
            AuthorizationStatus::Timeout => "timeout",
            AuthorizationStatus::Granted => "granted",
            AuthorizationStatus::Denied => "denied",
        };

        f.write_str(s)
    }
}

/// Result of `login/authorize/{track_id}`: the registration status along with
/// a fresh challenge for the session handshake.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Authorization {
    pub status: AuthorizationStatus,
    pub challenge: String,
}

#[derive(Debug, Serialize)]
struct SessionRequest<'a> {
    app_id: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    session_token: String,
}

/// Compute the session password for a challenge: the lowercase hex HMAC-SHA1
/// of the challenge keyed with the app token.
pub fn session_password(app_token: &str, challenge: &str) -> String {
    let mut mac =
        <Hmac<Sha1> as Mac>::new_from_slice(app_token.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(challenge.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Fetch the registration status and current challenge for a track ID.
pub async fn authorization(client: &ApiClient, track_id: &str) -> Result<Authorization, FreeboxError> {
    client.get(&format!("login/authorize/{}", track_id), None).await
}

/// Run the two step login: fetch a challenge for the track ID, then open a
/// session with the HMAC of that challenge. Any failure is an authentication
/// error and nothing is retried.
pub async fn open_session(client: &ApiClient, creds: &Credentials) -> Result<Session, FreeboxError> {
    let auth = authorization(client, &creds.track_id)
        .await
        .map_err(|e| e.rekind(ErrorKind::Authentication, "unable to fetch login challenge"))?;

    if auth.status != AuthorizationStatus::Granted {
        tracing::debug!(
            message = "application is not authorized",
            track_id = %creds.track_id,
            status = %auth.status,
        );

        return Err(FreeboxError::KindMsg(
            ErrorKind::Authentication,
            "application is not authorized, check the registration status",
        ));
    }

    let password = session_password(&creds.app_token, &auth.challenge);
    let req = SessionRequest {
        app_id: &creds.app_id,
        password: &password,
    };

    let res: SessionResponse = client
        .post("login/session/", &req)
        .await
        .map_err(|e| e.rekind(ErrorKind::Authentication, "unable to open session"))?;

    tracing::debug!(message = "opened session", app_id = %creds.app_id);
    Ok(Session::new(res.session_token))
}
