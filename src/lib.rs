mod account_store;
mod api_client;
mod error;
mod json;
mod microsoft;
mod mojang;
mod session;
mod skin;
mod webhook;

pub mod env;

pub use {
    account_store::AccountStore,
    error::{DisplayError, ErrorCode, ErrorKind, MicrosoftErrorCode, MojangErrorCode, ProviderError},
    json::{Account, MicrosoftToken, Skin, SkinVariant},
    microsoft::{
        MicrosoftApi, MicrosoftClient, MicrosoftEndpoints, MicrosoftResult, MinecraftProfile,
        MinecraftToken, OAuthGrant, OAuthToken, XboxToken
    },
    mojang::{GameProfile, MojangApi, MojangResult, MojangSession, YggdrasilClient},
    session::{calculate_expiry_date, offline_uuid, ReservedNames, SessionManager, OFFLINE_CLIENT_TOKEN},
    skin::SkinUploader,
    webhook::{GameStart, WebhookNotifier}
};
