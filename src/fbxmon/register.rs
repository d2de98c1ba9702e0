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

use crate::auth::{self, AuthorizationStatus};
use crate::client::ApiClient;
use crate::credentials::{CredentialStore, Credentials};
use crate::error::{ErrorKind, FreeboxError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct AuthorizeRequest<'a> {
    app_id: &'a str,
    app_name: &'a str,
    app_version: &'a str,
    device_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthorizeResponse {
    track_id: u64,
    app_token: String,
}

/// Outcome of a registration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// A new track ID and app token were issued and saved. The operator must
    /// still approve the application on the Freebox front panel.
    Requested(Credentials),
    /// Credentials for this endpoint were already stored, nothing was sent.
    AlreadyRegistered(Credentials),
}

/// Request a track ID and app token for the configured application identity
/// unless the store already has credentials for the endpoint.
pub async fn register(client: &ApiClient, store: &mut CredentialStore) -> Result<Registration, FreeboxError> {
    let config = client.config();
    if let Some(existing) = store.get(&config.endpoint) {
        tracing::info!(message = "application already registered", endpoint = %config.endpoint);
        return Ok(Registration::AlreadyRegistered(existing.clone()));
    }

    let identity = &config.identity;
    let req = AuthorizeRequest {
        app_id: &identity.app_id,
        app_name: &identity.app_name,
        app_version: &identity.app_version,
        device_name: &identity.device_name,
    };

    let res: AuthorizeResponse = client
        .post("login/authorize/", &req)
        .await
        .map_err(|e| e.rekind(ErrorKind::Registration, "unable to request application authorization"))?;

    let creds = Credentials {
        track_id: res.track_id.to_string(),
        app_token: res.app_token,
        app_id: identity.app_id.clone(),
        app_name: identity.app_name.clone(),
        device_name: identity.device_name.clone(),
    };

    store.insert(&config.endpoint, creds.clone())?;
    tracing::info!(message = "application registration requested", endpoint = %config.endpoint, track_id = %creds.track_id);
    Ok(Registration::Requested(creds))
}

/// Ask the Freebox for the state of the stored registration for the endpoint.
pub async fn status(client: &ApiClient, store: &CredentialStore) -> Result<AuthorizationStatus, FreeboxError> {
    let creds = store.require(&client.config().endpoint)?;
    let auth = auth::authorization(client, &creds.track_id)
        .await
        .map_err(|e| e.rekind(ErrorKind::Registration, "unable to fetch registration status"))?;

    Ok(auth.status)
}
