/*
 * Lodestone - A Minecraft Launcher
 * Copyright (C) 2025 Josh Kropf <josh@slashdev.ca>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

//! Client for the legacy Mojang (Yggdrasil) auth server

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api_client::{http_client, ApiClient};
use crate::error::{MojangErrorCode, ProviderError};

pub const MOJANG_AUTH_URL: &str = "https://authserver.mojang.com";

pub type MojangResult<T> = Result<T, ProviderError<MojangErrorCode>>;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct GameProfile {
    pub id: String,
    pub name: String
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MojangSession {
    pub access_token: String,
    pub client_token: String,
    pub selected_profile: Option<GameProfile>
}

/// Operations of the Yggdrasil auth server used by the session manager
pub trait MojangApi {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
        client_token: Option<&str>
    ) -> MojangResult<MojangSession>;

    /// Ok(false) when the server reports the token as invalid
    async fn validate(&self, access_token: &str, client_token: Option<&str>) -> MojangResult<bool>;

    async fn refresh(&self, access_token: &str, client_token: Option<&str>) -> MojangResult<MojangSession>;

    async fn invalidate(&self, access_token: &str, client_token: Option<&str>) -> MojangResult<()>;
}

pub struct YggdrasilClient {
    client: Client,
    base_url: String
}

impl YggdrasilClient {
    pub fn new() -> Self {
        Self::with_base_url(MOJANG_AUTH_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.trim_end_matches('/').to_string()
        }
    }

    async fn send<R: Serialize>(&self, path: &str, body: &R) -> MojangResult<Response> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self.post_json(&url, body).await
            .map_err(transport_error)?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(ProviderError::Rejected(decode_response_error(response).await))
        }
    }
}

impl ApiClient for YggdrasilClient {
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest<'a> {
    access_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_token: Option<&'a str>
}

impl MojangApi for YggdrasilClient {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
        client_token: Option<&str>
    ) -> MojangResult<MojangSession> {
        let mut body = json!({
            "agent": {
                "name": "Minecraft",
                "version": 1
            },
            "username": username,
            "password": password,
            "requestUser": true
        });

        if let Some(token) = client_token {
            body["clientToken"] = json!(token);
        }

        let response = self.send("authenticate", &body).await?;
        response.json().await.map_err(|e| ProviderError::Transport(e.into()))
    }

    async fn validate(&self, access_token: &str, client_token: Option<&str>) -> MojangResult<bool> {
        let request = TokenRequest { access_token, client_token };
        let url = format!("{}/validate", self.base_url);

        let response = self.post_json(&url, &request).await
            .map_err(transport_error)?;

        match response.status() {
            StatusCode::FORBIDDEN => Ok(false),
            status if status.is_success() => Ok(true),
            _ => Err(ProviderError::Rejected(decode_response_error(response).await))
        }
    }

    async fn refresh(&self, access_token: &str, client_token: Option<&str>) -> MojangResult<MojangSession> {
        let request = TokenRequest { access_token, client_token };

        let response = self.send("refresh", &request).await?;
        response.json().await.map_err(|e| ProviderError::Transport(e.into()))
    }

    async fn invalidate(&self, access_token: &str, client_token: Option<&str>) -> MojangResult<()> {
        let request = TokenRequest { access_token, client_token };

        self.send("invalidate", &request).await?;
        Ok(())
    }
}

fn transport_error(err: reqwest::Error) -> ProviderError<MojangErrorCode> {
    if err.is_connect() || err.is_timeout() {
        ProviderError::Rejected(MojangErrorCode::Unreachable)
    } else {
        ProviderError::Transport(err.into())
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: Option<String>,
    error_message: Option<String>,
    cause: Option<String>
}

async fn decode_response_error(response: Response) -> MojangErrorCode {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let code = decode_error(status, &body);
    tracing::error!("Mojang request failed with {status} ({code:?}): {body}");

    code
}

fn decode_error(status: StatusCode, body: &str) -> MojangErrorCode {
    if status == StatusCode::GONE {
        return MojangErrorCode::Gone;
    }

    let body: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = body.error_message.as_deref().unwrap_or_default();

    match body.error.as_deref() {
        Some("Method Not Allowed") => MojangErrorCode::MethodNotAllowed,
        Some("Not Found") => MojangErrorCode::NotFound,
        Some("Unsupported Media Type") => MojangErrorCode::UnsupportedMediaType,
        Some("ForbiddenOperationException") => {
            if body.cause.as_deref() == Some("UserMigratedException") {
                return MojangErrorCode::UserMigrated;
            }

            match message {
                "Invalid credentials. Invalid username or password." => MojangErrorCode::InvalidCredentials,
                "Invalid credentials." => MojangErrorCode::RateLimit,
                "Invalid token." => MojangErrorCode::InvalidToken,
                _ => MojangErrorCode::Unknown
            }
        },
        Some("IllegalArgumentException") => match message {
            "Access token already has a profile assigned." => MojangErrorCode::AccessTokenHasProfile,
            "credentials is null" => MojangErrorCode::CredentialsMissing,
            "Invalid salt version" => MojangErrorCode::InvalidSaltVersion,
            _ => MojangErrorCode::Unknown
        },
        _ => MojangErrorCode::Unknown
    }
}
