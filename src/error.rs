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

use serde::Serialize;
use std::fmt::Debug;
use thiserror::Error;

const UNKNOWN_TITLE: &str = "Unknown error during login";
const UNKNOWN_DESC: &str = "An unknown error has occurred. Please see the log for details.";

/// Broad classification of a [`DisplayError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The remote provider answered and refused the request
    ProviderRejected,
    /// Transport, parse or persistence failure, or an unrecognized provider answer
    Unknown,
    /// Refused locally without contacting any provider
    LocalPolicy,
}

/// Error presented to the user, the only error shape that leaves the session manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{title}: {desc}")]
pub struct DisplayError {
    pub kind: ErrorKind,
    pub title: String,
    pub desc: String,
}

impl DisplayError {
    fn new(kind: ErrorKind, title: &str, desc: &str) -> Self {
        Self { kind, title: title.to_string(), desc: desc.to_string() }
    }

    fn rejected(title: &str, desc: &str) -> Self {
        Self::new(ErrorKind::ProviderRejected, title, desc)
    }

    pub fn unknown() -> Self {
        Self::new(ErrorKind::Unknown, UNKNOWN_TITLE, UNKNOWN_DESC)
    }

    pub fn reserved_name() -> Self {
        Self::new(
            ErrorKind::LocalPolicy,
            "Username not allowed",
            "You cannot use the same username as a server administrator."
        )
    }

    pub fn account_not_found(uuid: &str) -> Self {
        Self {
            kind: ErrorKind::LocalPolicy,
            title: "Account not found".to_string(),
            desc: format!("No account with uuid {uuid} is stored on this machine.")
        }
    }
}

/// Provider specific error code with a total mapping to a [`DisplayError`]
pub trait ErrorCode: Copy + Debug {
    fn unknown() -> Self;
    fn displayable(self) -> DisplayError;
}

/// Failure of a single provider call
#[derive(Debug, Error)]
pub enum ProviderError<C: Debug> {
    #[error("request rejected with {0:?}")]
    Rejected(C),

    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl<C: ErrorCode> ProviderError<C> {
    pub fn code(&self) -> C {
        match self {
            ProviderError::Rejected(code) => *code,
            ProviderError::Transport(_) => C::unknown()
        }
    }

    pub fn displayable(&self) -> DisplayError {
        self.code().displayable()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MojangErrorCode {
    MethodNotAllowed,
    NotFound,
    UserMigrated,
    InvalidCredentials,
    RateLimit,
    InvalidToken,
    AccessTokenHasProfile,
    CredentialsMissing,
    InvalidSaltVersion,
    UnsupportedMediaType,
    Gone,
    Unreachable,
    NotPaid,
    Unknown,
}

impl ErrorCode for MojangErrorCode {
    fn unknown() -> Self {
        MojangErrorCode::Unknown
    }

    fn displayable(self) -> DisplayError {
        use MojangErrorCode::*;

        match self {
            MethodNotAllowed => DisplayError::rejected(
                "Internal error: Method not allowed",
                "Method not allowed. Please report this error."
            ),
            NotFound => DisplayError::rejected(
                "Internal error: Not found",
                "The authentication endpoint was not found. Please report this issue."
            ),
            UserMigrated => DisplayError::rejected(
                "Error during login: Account migrated",
                "You've attempted to login with a migrated account. Try again using the account email as the username."
            ),
            InvalidCredentials => DisplayError::rejected(
                "Error during login: Invalid credentials",
                "The email or password you've entered is incorrect. Please try again."
            ),
            RateLimit => DisplayError::rejected(
                "Error during login: Too many attempts",
                "There have been too many login attempts with this account recently. Please try again later."
            ),
            InvalidToken => DisplayError::rejected(
                "Error during login: Invalid token",
                "The provided access token is invalid."
            ),
            AccessTokenHasProfile => DisplayError::rejected(
                "Error during login: Token has profile",
                "The access token already has a profile assigned. Selecting profiles is not implemented yet."
            ),
            CredentialsMissing => DisplayError::rejected(
                "Error during login: Credentials missing",
                "Username/password was not submitted or the password is less than 3 characters."
            ),
            InvalidSaltVersion => DisplayError::rejected(
                "Error during login: Invalid salt version",
                "Invalid salt version."
            ),
            UnsupportedMediaType => DisplayError::rejected(
                "Internal error: Unsupported media type",
                "Unsupported media type. Please report this error."
            ),
            Gone => DisplayError::rejected(
                "Error during login: Account migrated",
                "The account has been migrated to a Microsoft account. Please log in with Microsoft."
            ),
            Unreachable => DisplayError::rejected(
                "Error during login: Unreachable",
                "Unable to reach the authentication servers. Ensure that they are online and you are connected to the internet."
            ),
            NotPaid => DisplayError::rejected(
                "Error during login: Game not purchased",
                "The account you are trying to login with has not purchased a copy of Minecraft. You may purchase a copy on minecraft.net or create a free account in this launcher."
            ),
            Unknown => DisplayError::unknown()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MicrosoftErrorCode {
    NoProfile,
    NoXboxAccount,
    XblBanned,
    Under18,
    Unknown,
}

impl MicrosoftErrorCode {
    /// Decode the `XErr` value returned by the XSTS endpoint
    pub fn from_xerr(xerr: u64) -> Self {
        match xerr {
            2148916233 => MicrosoftErrorCode::NoXboxAccount,
            2148916235 => MicrosoftErrorCode::XblBanned,
            2148916238 => MicrosoftErrorCode::Under18,
            _ => MicrosoftErrorCode::Unknown
        }
    }
}

impl ErrorCode for MicrosoftErrorCode {
    fn unknown() -> Self {
        MicrosoftErrorCode::Unknown
    }

    fn displayable(self) -> DisplayError {
        match self {
            MicrosoftErrorCode::NoProfile => DisplayError::rejected(
                "Error during login: Profile not set up",
                "Your Microsoft account does not yet have a Minecraft profile set up. If you have recently purchased the game or redeemed it through Xbox Game Pass, you have to set up your profile on minecraft.net."
            ),
            MicrosoftErrorCode::NoXboxAccount => DisplayError::rejected(
                "Error during login: No Xbox account",
                "Your Microsoft account has no Xbox account associated with it."
            ),
            MicrosoftErrorCode::XblBanned => DisplayError::rejected(
                "Error during login: Xbox Live unavailable",
                "Your Microsoft account is from a country where Xbox Live is not available or banned."
            ),
            MicrosoftErrorCode::Under18 => DisplayError::rejected(
                "Error during login: Parental approval required",
                "Accounts for users under the age of 18 must be added to a family by an adult."
            ),
            MicrosoftErrorCode::Unknown => DisplayError::unknown()
        }
    }
}
