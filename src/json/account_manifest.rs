use chrono::{DateTime, serde::ts_milliseconds, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::PathBuf};

#[derive(Deserialize, Serialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AccountManifest {
    pub client_token: Option<String>,

    pub selected_account: Option<String>,

    #[serde(default)]
    pub accounts: BTreeMap<String, Account>
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Account {
    #[serde(rename_all = "camelCase")]
    Mojang {
        uuid: String,
        /// Login handle, the account email for migrated accounts
        username: String,
        display_name: String,
        access_token: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        skin: Option<Skin>
    },

    #[serde(rename_all = "camelCase")]
    Microsoft {
        uuid: String,
        username: String,
        display_name: String,
        /// Minecraft access token
        access_token: String,
        #[serde(with = "ts_milliseconds")]
        expires_at: DateTime<Utc>,
        microsoft: MicrosoftToken,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        skin: Option<Skin>
    },

    #[serde(rename_all = "camelCase")]
    Unofficial {
        uuid: String,
        username: String,
        display_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        skin: Option<Skin>
    }
}

/// OAuth layer tokens, expiring independently of the Minecraft token
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct MicrosoftToken {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(with = "ts_milliseconds")]
    pub expires_at: DateTime<Utc>
}

/// Skin generated for an account, `path` points at the signed texture file
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Skin {
    pub path: PathBuf,
    pub url: String,
    pub variant: SkinVariant
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SkinVariant {
    Classic,
    Slim
}

impl SkinVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkinVariant::Classic => "classic",
            SkinVariant::Slim => "slim"
        }
    }
}

impl Account {
    pub fn uuid(&self) -> &str {
        match self {
            Account::Mojang { uuid, .. }
            | Account::Microsoft { uuid, .. }
            | Account::Unofficial { uuid, .. } => uuid
        }
    }

    pub fn username(&self) -> &str {
        match self {
            Account::Mojang { username, .. }
            | Account::Microsoft { username, .. }
            | Account::Unofficial { username, .. } => username
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Account::Mojang { display_name, .. }
            | Account::Microsoft { display_name, .. }
            | Account::Unofficial { display_name, .. } => display_name
        }
    }

    pub fn skin(&self) -> Option<&Skin> {
        match self {
            Account::Mojang { skin, .. }
            | Account::Microsoft { skin, .. }
            | Account::Unofficial { skin, .. } => skin.as_ref()
        }
    }

    pub fn set_skin(&mut self, new_skin: Skin) {
        match self {
            Account::Mojang { skin, .. }
            | Account::Microsoft { skin, .. }
            | Account::Unofficial { skin, .. } => *skin = Some(new_skin)
        }
    }

    /// Token passed to the game, offline accounts have none
    pub fn access_token(&self) -> Option<&str> {
        match self {
            Account::Mojang { access_token, .. }
            | Account::Microsoft { access_token, .. } => Some(access_token),
            Account::Unofficial { .. } => None
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Account::Mojang { .. } => "mojang",
            Account::Microsoft { .. } => "microsoft",
            Account::Unofficial { .. } => "unofficial"
        }
    }
}
