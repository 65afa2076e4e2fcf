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

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::{fs, path::{Path, PathBuf}};

use crate::env;
use crate::json::{Account, AccountManifest, MicrosoftToken, Skin};

const MANIFEST_FILE: &str = "accounts.json";

/// Persisted accounts, the selected account and the shared client token.
///
/// Mutations only touch memory, call [`AccountStore::persist`] to flush them.
pub struct AccountStore {
    path: PathBuf,
    manifest: AccountManifest
}

impl AccountStore {
    /// Load the store from the data directory
    pub fn load() -> Result<Self> {
        Self::load_from(env::get_data_dir().join(MANIFEST_FILE))
    }

    /// Load the store from `path`, a missing file is an empty store
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let manifest = if path.exists() {
            let json = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;

            serde_json::from_str::<AccountManifest>(&json)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            AccountManifest::default()
        };

        Ok(AccountStore { path, manifest })
    }

    pub fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let manifest_json = serde_json::to_string_pretty(&self.manifest)?;
        Ok(fs::write(&self.path, manifest_json)?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, uuid: &str) -> Option<&Account> {
        self.manifest.accounts.get(uuid)
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.manifest.accounts.values()
    }

    pub fn selected(&self) -> Option<&Account> {
        self.manifest.selected_account.as_ref()
            .and_then(|uuid| self.manifest.accounts.get(uuid))
    }

    /// Select the account with `uuid`, returns false when there is no such account
    pub fn select(&mut self, uuid: &str) -> bool {
        if !self.manifest.accounts.contains_key(uuid) {
            return false;
        }

        self.manifest.selected_account = Some(uuid.to_string());
        true
    }

    /// Insert or replace the account keyed by its uuid and select it
    pub fn add(&mut self, account: Account) -> Account {
        let uuid = account.uuid().to_string();

        self.manifest.accounts.insert(uuid.clone(), account.clone());
        self.manifest.selected_account = Some(uuid);

        account
    }

    pub fn update_mojang_token(&mut self, uuid: &str, token: &str) -> bool {
        match self.manifest.accounts.get_mut(uuid) {
            Some(Account::Mojang { access_token, .. }) => {
                *access_token = token.to_string();
                true
            },
            _ => false
        }
    }

    pub fn update_microsoft_tokens(
        &mut self,
        uuid: &str,
        mc_token: &str,
        mc_expires_at: DateTime<Utc>,
        ms_token: MicrosoftToken
    ) -> bool {
        match self.manifest.accounts.get_mut(uuid) {
            Some(Account::Microsoft { access_token, expires_at, microsoft, .. }) => {
                *access_token = mc_token.to_string();
                *expires_at = mc_expires_at;
                *microsoft = ms_token;
                true
            },
            _ => false
        }
    }

    pub fn update_skin(&mut self, uuid: &str, skin: Skin) -> bool {
        match self.manifest.accounts.get_mut(uuid) {
            Some(account) => {
                account.set_skin(skin);
                true
            },
            None => false
        }
    }

    /// Remove the account, moving the selection to the first remaining account
    pub fn remove(&mut self, uuid: &str) -> Option<Account> {
        let removed = self.manifest.accounts.remove(uuid)?;

        if self.manifest.selected_account.as_deref() == Some(uuid) {
            self.manifest.selected_account = self.manifest.accounts.keys().next().cloned();
        }

        Some(removed)
    }

    pub fn client_token(&self) -> Option<&str> {
        self.manifest.client_token.as_deref()
    }

    /// The client token is written once per installation, returns true when it was set
    pub fn set_client_token_if_unset(&mut self, token: &str) -> bool {
        if self.manifest.client_token.is_some() {
            return false;
        }

        self.manifest.client_token = Some(token.to_string());
        true
    }
}
