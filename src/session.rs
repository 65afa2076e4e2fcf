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

use anyhow::anyhow;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::account_store::AccountStore;
use crate::env;
use crate::error::{DisplayError, MojangErrorCode, ErrorCode, ProviderError};
use crate::json::{Account, MicrosoftToken};
use crate::microsoft::{MicrosoftApi, MicrosoftResult, MinecraftProfile, OAuthGrant};
use crate::mojang::MojangApi;

/// Client token used when the first account added is an offline one
pub const OFFLINE_CLIENT_TOKEN: &str = "00000000000000000000000000000000";

/// Seconds taken off every provider lifetime so a token is never used right at its expiry
const EXPIRY_MARGIN_SECS: i64 = 10;

const DEFAULT_RESERVED_NAMES: [&str; 2] = ["WOUHAIT", "KNIGHTKENOBI_"];

/// Expiry instant of a token issued at `now` that lives `expires_in_secs` seconds,
/// None when the lifetime does not fit in a timestamp
pub fn calculate_expiry_date(now: DateTime<Utc>, expires_in_secs: i64) -> Option<DateTime<Utc>> {
    let millis = expires_in_secs
        .checked_sub(EXPIRY_MARGIN_SECS)?
        .checked_mul(1000)?;

    now.checked_add_signed(Duration::milliseconds(millis))
}

fn token_expiry(now: DateTime<Utc>, expires_in_secs: i64) -> MicrosoftResult<DateTime<Utc>> {
    calculate_expiry_date(now, expires_in_secs).ok_or_else(|| {
        ProviderError::Transport(anyhow!("Token lifetime of {expires_in_secs}s is out of range"))
    })
}

/// Uuid of an offline account, stable for a username on a given machine
pub fn offline_uuid(username: &str, machine_id: &str) -> String {
    let name = format!("{username}{machine_id}");

    Uuid::new_v5(&Uuid::NAMESPACE_DNS, name.as_bytes())
        .simple()
        .to_string()
}

/// Offline usernames that belong to server administrators
#[derive(Debug, Clone)]
pub struct ReservedNames(Vec<String>);

impl ReservedNames {
    pub fn new<I, S>(names: I) -> Self
        where I: IntoIterator<Item = S>, S: AsRef<str>
    {
        Self(names.into_iter().map(|n| n.as_ref().to_uppercase()).collect())
    }

    /// Names from `LODESTONE_RESERVED_NAMES`, or the built in list
    pub fn from_env() -> Self {
        match env::get_reserved_names() {
            Some(names) => Self::new(names),
            None => Self::default()
        }
    }

    pub fn contains(&self, username: &str) -> bool {
        let username = username.to_uppercase();
        self.0.iter().any(|name| *name == username)
    }
}

impl Default for ReservedNames {
    fn default() -> Self {
        Self::new(DEFAULT_RESERVED_NAMES)
    }
}

/// How the Microsoft chain is entered
#[derive(Debug, Clone, Copy)]
enum AuthMode<'a> {
    /// New account, step one exchanges an authorization code
    Full(&'a str),
    /// OAuth token expired, step one exchanges the refresh token
    MsRefresh(&'a str),
    /// Only the Minecraft token expired, step one is skipped and the OAuth access token reused
    McRefresh(&'a str)
}

struct MicrosoftAuth {
    /// None in [`AuthMode::McRefresh`]
    ms_token: Option<MicrosoftToken>,
    mc_access_token: String,
    mc_expires_at: DateTime<Utc>,
    profile: MinecraftProfile
}

/// Runs the login flows and keeps the sessions in an [`AccountStore`] usable.
///
/// Operations are not meant to run concurrently, callers serialize them.
pub struct SessionManager<M, X> {
    mojang: M,
    microsoft: X,
    clock: fn() -> DateTime<Utc>,
    machine_id: String,
    reserved_names: ReservedNames
}

impl<M: MojangApi, X: MicrosoftApi> SessionManager<M, X> {
    pub fn new(mojang: M, microsoft: X) -> Self {
        Self {
            mojang,
            microsoft,
            clock: Utc::now,
            machine_id: env::get_machine_id(),
            reserved_names: ReservedNames::from_env()
        }
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_machine_id(mut self, machine_id: impl Into<String>) -> Self {
        self.machine_id = machine_id.into();
        self
    }

    pub fn with_reserved_names(mut self, reserved_names: ReservedNames) -> Self {
        self.reserved_names = reserved_names;
        self
    }

    pub fn microsoft(&self) -> &X {
        &self.microsoft
    }

    /// Authenticate with the Mojang auth server and store the account
    pub async fn add_mojang_account(
        &self,
        store: &mut AccountStore,
        username: &str,
        password: &str
    ) -> Result<Account, DisplayError> {
        let session = self.mojang
            .authenticate(username, password, store.client_token())
            .await
            .map_err(|err| {
                tracing::error!("Mojang authentication failed: {err}");
                err.displayable()
            })?;

        let Some(profile) = session.selected_profile else {
            return Err(MojangErrorCode::NotPaid.displayable());
        };

        let account = store.add(Account::Mojang {
            uuid: profile.id,
            username: username.to_string(),
            display_name: profile.name,
            access_token: session.access_token,
            skin: None
        });

        store.set_client_token_if_unset(&session.client_token);
        persist(store)?;

        Ok(account)
    }

    /// Create an offline account, no provider is contacted
    pub fn add_unofficial_account(
        &self,
        store: &mut AccountStore,
        username: &str
    ) -> Result<Account, DisplayError> {
        if self.reserved_names.contains(username) {
            tracing::warn!("Refusing reserved offline username {username}");
            return Err(DisplayError::reserved_name());
        }

        let account = store.add(Account::Unofficial {
            uuid: offline_uuid(username, &self.machine_id),
            username: username.to_string(),
            display_name: username.to_string(),
            skin: None
        });

        store.set_client_token_if_unset(OFFLINE_CLIENT_TOKEN);
        persist(store)?;

        Ok(account)
    }

    /// Run the complete Microsoft chain for an authorization code and store the account
    pub async fn add_microsoft_account(
        &self,
        store: &mut AccountStore,
        auth_code: &str
    ) -> Result<Account, DisplayError> {
        let now = (self.clock)();
        let auth = self.microsoft_auth_flow(AuthMode::Full(auth_code), now).await
            .map_err(|err| {
                tracing::error!("Microsoft login failed: {err}");
                err.displayable()
            })?;

        let ms_token = auth.ms_token.ok_or_else(DisplayError::unknown)?;

        let account = store.add(Account::Microsoft {
            uuid: auth.profile.id,
            username: auth.profile.name.clone(),
            display_name: auth.profile.name,
            access_token: auth.mc_access_token,
            expires_at: auth.mc_expires_at,
            microsoft: ms_token,
            skin: None
        });

        persist(store)?;

        Ok(account)
    }

    /// Remove an account, Mojang sessions are invalidated on the server first.
    ///
    /// Signing out of Microsoft in the browser is left to the caller.
    pub async fn remove_account(&self, store: &mut AccountStore, uuid: &str) -> Result<(), DisplayError> {
        let Some(account) = store.get(uuid) else {
            tracing::error!("Error while removing account, {uuid} not found");
            return Err(DisplayError::account_not_found(uuid));
        };

        if let Account::Mojang { access_token, .. } = account {
            self.mojang.invalidate(access_token, store.client_token()).await
                .map_err(|err| {
                    tracing::error!("Error while removing account: {err}");
                    err.displayable()
                })?;
        }

        store.remove(uuid);
        persist(store)
    }

    /// Check that the selected account can launch the game, refreshing its tokens when needed.
    ///
    /// Returns false when the user has to log in again.
    pub async fn validate_selected(&self, store: &mut AccountStore) -> bool {
        let Some(account) = store.selected().cloned() else {
            tracing::warn!("No account selected");
            return false;
        };

        match account {
            Account::Mojang { uuid, access_token, .. } =>
                self.validate_mojang(store, &uuid, &access_token).await,
            Account::Microsoft { uuid, expires_at, microsoft, .. } =>
                self.validate_microsoft(store, &uuid, expires_at, &microsoft).await,
            Account::Unofficial { .. } => true
        }
    }

    async fn validate_mojang(&self, store: &mut AccountStore, uuid: &str, access_token: &str) -> bool {
        let client_token = store.client_token().map(str::to_string);

        match self.mojang.validate(access_token, client_token.as_deref()).await {
            Ok(true) => {},
            Ok(false) => {
                match self.mojang.refresh(access_token, client_token.as_deref()).await {
                    Ok(session) => {
                        store.update_mojang_token(uuid, &session.access_token);
                        persist_quietly(store);
                    },
                    Err(err) => {
                        tracing::error!("Error while validating selected profile: {err}");
                        tracing::info!("Account access token is invalid.");
                        return false;
                    }
                }
            },
            Err(err) => {
                tracing::error!("Error while validating selected profile: {err}");
                return false;
            }
        }

        tracing::info!("Account access token validated.");
        true
    }

    async fn validate_microsoft(
        &self,
        store: &mut AccountStore,
        uuid: &str,
        mc_expires_at: DateTime<Utc>,
        microsoft: &MicrosoftToken
    ) -> bool {
        let now = (self.clock)();

        if now < mc_expires_at {
            return true;
        }

        let mode = if now >= microsoft.expires_at {
            tracing::info!("Microsoft token expired, refreshing all tokens");
            AuthMode::MsRefresh(&microsoft.refresh_token)
        } else {
            tracing::info!("Minecraft token expired, refreshing with the current Microsoft token");
            AuthMode::McRefresh(&microsoft.access_token)
        };

        let auth = match self.microsoft_auth_flow(mode, now).await {
            Ok(auth) => auth,
            Err(err) => {
                tracing::error!("Error while refreshing Microsoft account: {err}");
                return false;
            }
        };

        store.update_microsoft_tokens(
            uuid,
            &auth.mc_access_token,
            auth.mc_expires_at,
            auth.ms_token.unwrap_or_else(|| microsoft.clone())
        );
        persist_quietly(store);

        tracing::info!("Account access token validated.");
        true
    }

    /// Lifetimes are turned into expiry instants relative to `now` as each token arrives
    async fn microsoft_auth_flow(&self, mode: AuthMode<'_>, now: DateTime<Utc>) -> MicrosoftResult<MicrosoftAuth> {
        let (ms_token, ms_access_token) = match mode {
            AuthMode::Full(code) => {
                let token = self.ms_token(OAuthGrant::AuthorizationCode(code), now).await?;
                let access_token = token.access_token.clone();
                (Some(token), access_token)
            },
            AuthMode::MsRefresh(refresh_token) => {
                let token = self.ms_token(OAuthGrant::RefreshToken(refresh_token), now).await?;
                let access_token = token.access_token.clone();
                (Some(token), access_token)
            },
            AuthMode::McRefresh(access_token) => (None, access_token.to_string())
        };

        tracing::debug!("Requesting XBL token");
        let xbl = self.microsoft.get_xbl_token(&ms_access_token).await?;

        tracing::debug!("Requesting XSTS token");
        let xsts = self.microsoft.get_xsts_token(&xbl).await?;

        tracing::debug!("Requesting Minecraft token");
        let mc_token = self.microsoft.get_mc_access_token(&xsts).await?;
        let mc_expires_at = token_expiry(now, mc_token.expires_in)?;

        tracing::debug!("Requesting Minecraft profile");
        let profile = self.microsoft.get_mc_profile(&mc_token.access_token).await?;

        Ok(MicrosoftAuth {
            ms_token,
            mc_access_token: mc_token.access_token,
            mc_expires_at,
            profile
        })
    }

    async fn ms_token(&self, grant: OAuthGrant<'_>, now: DateTime<Utc>) -> MicrosoftResult<MicrosoftToken> {
        let token = self.microsoft.get_access_token(grant).await?;

        Ok(MicrosoftToken {
            expires_at: token_expiry(now, token.expires_in)?,
            access_token: token.access_token,
            refresh_token: token.refresh_token
        })
    }
}

fn persist(store: &AccountStore) -> Result<(), DisplayError> {
    store.persist().map_err(|err| {
        tracing::error!("Failed to save {}: {err:#}", store.path().display());
        DisplayError::unknown()
    })
}

/// The refreshed tokens stay usable in memory when the write fails
fn persist_quietly(store: &AccountStore) {
    if let Err(err) = store.persist() {
        tracing::error!("Failed to save {}: {err:#}", store.path().display());
    }
}
