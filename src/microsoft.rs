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

/*
 * Microsoft account login, the token chain is OAuth -> Xbox Live -> XSTS -> Minecraft
 */

use anyhow::Result;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, CsrfToken, RedirectUrl, RefreshToken,
    RequestTokenError, Scope, TokenResponse, TokenUrl,
    basic::{BasicClient, BasicTokenResponse}, reqwest::async_http_client
};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use url::Url;

use crate::api_client::{http_client, ApiClient};
use crate::error::{MicrosoftErrorCode, ProviderError};

const REDIRECT_URL: &str = "https://login.microsoftonline.com/common/oauth2/nativeclient";
const SCOPES: [&str; 2] = ["XboxLive.signin", "offline_access"];

/// Used when the token endpoint omits `expires_in`
const DEFAULT_EXPIRES_IN: i64 = 3600;

pub type MicrosoftResult<T> = std::result::Result<T, ProviderError<MicrosoftErrorCode>>;

#[derive(Debug, Clone)]
pub struct OAuthToken {
    pub access_token: String,
    pub refresh_token: String,
    /// Number of seconds until the token expires
    pub expires_in: i64
}

#[derive(Debug, Clone)]
pub struct XboxToken {
    pub token: String,
    /// User hash from the display claims
    pub uhs: String
}

#[derive(Debug, Clone)]
pub struct MinecraftToken {
    pub access_token: String,
    /// Number of seconds until the token expires
    pub expires_in: i64
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct MinecraftProfile {
    pub id: String,
    pub name: String
}

/// What step one of the chain exchanges for an OAuth token
#[derive(Debug, Clone, Copy)]
pub enum OAuthGrant<'a> {
    AuthorizationCode(&'a str),
    RefreshToken(&'a str)
}

/// The five token exchange steps, each call is one network request
pub trait MicrosoftApi {
    async fn get_access_token(&self, grant: OAuthGrant<'_>) -> MicrosoftResult<OAuthToken>;

    async fn get_xbl_token(&self, ms_access_token: &str) -> MicrosoftResult<XboxToken>;

    async fn get_xsts_token(&self, xbl_token: &XboxToken) -> MicrosoftResult<XboxToken>;

    async fn get_mc_access_token(&self, xsts_token: &XboxToken) -> MicrosoftResult<MinecraftToken>;

    async fn get_mc_profile(&self, mc_access_token: &str) -> MicrosoftResult<MinecraftProfile>;
}

#[derive(Debug, Clone)]
pub struct MicrosoftEndpoints {
    pub authorize: String,
    pub token: String,
    pub xbl: String,
    pub xsts: String,
    pub mc_login: String,
    pub mc_profile: String
}

impl Default for MicrosoftEndpoints {
    fn default() -> Self {
        Self {
            authorize: "https://login.microsoftonline.com/consumers/oauth2/v2.0/authorize".to_string(),
            token: "https://login.microsoftonline.com/consumers/oauth2/v2.0/token".to_string(),
            xbl: "https://user.auth.xboxlive.com/user/authenticate".to_string(),
            xsts: "https://xsts.auth.xboxlive.com/xsts/authorize".to_string(),
            mc_login: "https://api.minecraftservices.com/authentication/login_with_xbox".to_string(),
            mc_profile: "https://api.minecraftservices.com/minecraft/profile".to_string()
        }
    }
}

pub struct MicrosoftClient {
    client: Client,
    oauth: BasicClient,
    endpoints: MicrosoftEndpoints
}

impl MicrosoftClient {
    pub fn new(client_id: &str) -> Result<Self> {
        Self::with_endpoints(client_id, MicrosoftEndpoints::default())
    }

    pub fn with_endpoints(client_id: &str, endpoints: MicrosoftEndpoints) -> Result<Self> {
        let oauth = BasicClient::new(
            ClientId::new(client_id.to_string()),
            None,
            AuthUrl::new(endpoints.authorize.clone())?,
            Some(TokenUrl::new(endpoints.token.clone())?)
        )
        .set_redirect_uri(RedirectUrl::new(REDIRECT_URL.to_string())?);

        Ok(Self { client: http_client(), oauth, endpoints })
    }

    /// Browser URL starting the authorization code flow, the code and the
    /// returned `state` are appended to the redirect URL once the user signs in
    pub fn authorize_url(&self) -> (Url, CsrfToken) {
        self.oauth
            .authorize_url(CsrfToken::new_random)
            .add_scopes(SCOPES.iter().map(|s| Scope::new(s.to_string())))
            .add_extra_param("prompt", "select_account")
            .url()
    }

    async fn post_xbox<T>(&self, url: &str, body: &serde_json::Value) -> MicrosoftResult<T>
        where T: serde::de::DeserializeOwned
    {
        let response = self.post_json(url, body).await
            .map_err(|e| ProviderError::Transport(e.into()))?;

        parse_response(response).await
    }
}

impl ApiClient for MicrosoftClient {
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url)
    }
}

impl MicrosoftApi for MicrosoftClient {
    async fn get_access_token(&self, grant: OAuthGrant<'_>) -> MicrosoftResult<OAuthToken> {
        let (result, previous_refresh) = match grant {
            OAuthGrant::AuthorizationCode(code) => {
                let result = self.oauth
                    .exchange_code(AuthorizationCode::new(code.to_string()))
                    .add_extra_param("scope", SCOPES.join(" "))
                    .request_async(async_http_client)
                    .await;

                (result, None)
            },
            OAuthGrant::RefreshToken(refresh_token) => {
                let result = self.oauth
                    .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
                    .add_scopes(SCOPES.iter().map(|s| Scope::new(s.to_string())))
                    .request_async(async_http_client)
                    .await;

                (result, Some(refresh_token))
            }
        };

        match result {
            Ok(token) => oauth_token(token, previous_refresh),
            Err(RequestTokenError::ServerResponse(err)) => {
                tracing::error!("Microsoft token endpoint rejected the request: {err}");
                Err(ProviderError::Rejected(MicrosoftErrorCode::Unknown))
            },
            Err(err) => Err(ProviderError::Transport(anyhow::anyhow!("OAuth token request failed: {err}")))
        }
    }

    async fn get_xbl_token(&self, ms_access_token: &str) -> MicrosoftResult<XboxToken> {
        let body = json!({
            "Properties": {
                "AuthMethod": "RPS",
                "SiteName": "user.auth.xboxlive.com",
                "RpsTicket": format!("d={}", ms_access_token)
            },
            "RelyingParty": "http://auth.xboxlive.com",
            "TokenType": "JWT"
        });

        let response: XboxAuthResponse = self.post_xbox(&self.endpoints.xbl, &body).await?;
        response.try_into()
    }

    async fn get_xsts_token(&self, xbl_token: &XboxToken) -> MicrosoftResult<XboxToken> {
        let body = json!({
            "Properties": {
                "SandboxId": "RETAIL",
                "UserTokens": [&xbl_token.token]
            },
            "RelyingParty": "rp://api.minecraftservices.com/",
            "TokenType": "JWT"
        });

        let response: XboxAuthResponse = self.post_xbox(&self.endpoints.xsts, &body).await?;
        response.try_into()
    }

    async fn get_mc_access_token(&self, xsts_token: &XboxToken) -> MicrosoftResult<MinecraftToken> {
        let body = json!({
            "identityToken": format!("XBL3.0 x={};{}", xsts_token.uhs, xsts_token.token)
        });

        let response: MinecraftAuthResponse = self.post_xbox(&self.endpoints.mc_login, &body).await?;

        Ok(MinecraftToken {
            access_token: response.access_token,
            expires_in: response.expires_in
        })
    }

    async fn get_mc_profile(&self, mc_access_token: &str) -> MicrosoftResult<MinecraftProfile> {
        let response = self.get_bearer(&self.endpoints.mc_profile, mc_access_token).await
            .map_err(|e| ProviderError::Transport(e.into()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ProviderError::Rejected(MicrosoftErrorCode::NoProfile));
        }

        parse_response(response).await
    }
}

fn oauth_token(
    token: BasicTokenResponse,
    previous_refresh: Option<&str>
) -> MicrosoftResult<OAuthToken> {
    let refresh_token = token.refresh_token()
        .map(|t| t.secret().to_string())
        .or_else(|| previous_refresh.map(str::to_string))
        .ok_or_else(|| ProviderError::Transport(anyhow::anyhow!("Token response has no refresh token")))?;

    let expires_in = token.expires_in()
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(DEFAULT_EXPIRES_IN);

    Ok(OAuthToken {
        access_token: token.access_token().secret().to_string(),
        refresh_token,
        expires_in
    })
}

async fn parse_response<T>(response: Response) -> MicrosoftResult<T>
    where T: serde::de::DeserializeOwned
{
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let code = decode_error(&body);

        tracing::error!("Microsoft auth request failed with {status} ({code:?}): {body}");
        return Err(ProviderError::Rejected(code));
    }

    response.json::<T>().await
        .map_err(|e| ProviderError::Transport(e.into()))
}

fn decode_error(body: &str) -> MicrosoftErrorCode {
    #[derive(Deserialize)]
    struct XboxError {
        #[serde(rename = "XErr")]
        xerr: u64
    }

    serde_json::from_str::<XboxError>(body)
        .map(|e| MicrosoftErrorCode::from_xerr(e.xerr))
        .unwrap_or(MicrosoftErrorCode::Unknown)
}

#[derive(Deserialize)]
struct XboxAuthResponse {
    #[serde(rename(deserialize = "Token"))]
    token: String,

    #[serde(rename(deserialize = "DisplayClaims"))]
    display_claims: HashMap<String, Vec<HashMap<String, String>>>
}

impl TryFrom<XboxAuthResponse> for XboxToken {
    type Error = ProviderError<MicrosoftErrorCode>;

    fn try_from(response: XboxAuthResponse) -> MicrosoftResult<Self> {
        let uhs = response.display_claims.get("xui")
            .and_then(|xui| xui.first())
            .and_then(|claim| claim.get("uhs"))
            .cloned()
            .ok_or_else(|| ProviderError::Transport(anyhow::anyhow!("No XUI claims found")))?;

        Ok(XboxToken { token: response.token, uhs })
    }
}

#[derive(Deserialize)]
struct MinecraftAuthResponse {
    access_token: String,

    /// Number of seconds until the token expires
    expires_in: i64
}
