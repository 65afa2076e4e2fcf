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

use anyhow::{bail, Context, Result};
use console::style;
use url::Url;

use lodestone::{
    env, Account, AccountStore, MicrosoftClient, SessionManager, YggdrasilClient
};

use super::{prompt_confirm, prompt_input, prompt_password, report};

type Sessions = SessionManager<YggdrasilClient, MicrosoftClient>;

/// Only signing in with Microsoft needs the client id, other commands run without it
fn session_manager() -> Result<Sessions> {
    let client_id = env::get_azure_client_id().unwrap_or_else(|err| {
        tracing::debug!("{err:#}");
        String::new()
    });

    let microsoft = MicrosoftClient::new(&client_id)?;
    Ok(SessionManager::new(YggdrasilClient::new(), microsoft))
}

pub async fn add_mojang_account(username: Option<String>) -> Result<()> {
    let username = match username {
        Some(username) => username,
        None => prompt_input("Username")?
    };
    let password = prompt_password("Password")?;

    let mut store = AccountStore::load()?;
    let account = session_manager()?
        .add_mojang_account(&mut store, &username, &password).await
        .map_err(report)?;

    println!("Signed in as {}", style(account.display_name()).green());
    Ok(())
}

pub async fn add_microsoft_account() -> Result<()> {
    env::get_azure_client_id()?;
    let sessions = session_manager()?;

    let (url, state) = sessions.microsoft().authorize_url();

    println!("Open the URL in your browser and sign in:\n\t{url}");
    println!("Once signed in, the browser lands on a blank page.");

    let redirect = prompt_input("Paste the address of that page")?;
    let code = auth_code(&redirect, state.secret())?;

    let mut store = AccountStore::load()?;
    let account = sessions.add_microsoft_account(&mut store, &code).await
        .map_err(report)?;

    println!("Signed in as {}", style(account.display_name()).green());
    Ok(())
}

/// Authorization code from the redirect URL, its `state` must match the one sent
fn auth_code(redirect: &str, expected_state: &str) -> Result<String> {
    let url = Url::parse(redirect.trim())
        .context("Expected the address of the page the browser landed on")?;

    let param = |name: &str| url.query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned());

    if let Some(error) = param("error") {
        let desc = param("error_description").unwrap_or_default();
        bail!("Sign in failed: {error} {desc}");
    }

    if param("state").as_deref() != Some(expected_state) {
        bail!("Sign in response does not match this login attempt, try again");
    }

    param("code").context("No authorization code found in the address")
}

pub fn add_offline_account(username: &str) -> Result<()> {
    let mut store = AccountStore::load()?;
    let account = session_manager()?
        .add_unofficial_account(&mut store, username)
        .map_err(report)?;

    println!("Added offline account {} ({})", style(account.display_name()).green(), account.uuid());
    Ok(())
}

pub fn list_accounts() -> Result<()> {
    let store = AccountStore::load()?;
    let selected = store.selected().map(Account::uuid);

    for account in store.accounts() {
        let marker = if Some(account.uuid()) == selected { "*" } else { " " };
        println!(
            "{marker} {} {:<16} {}",
            account.uuid(),
            account.display_name(),
            style(account.type_name()).dim()
        );
    }

    Ok(())
}

pub fn select_account(uuid: &str) -> Result<()> {
    let mut store = AccountStore::load()?;

    if !store.select(uuid) {
        bail!("No account with uuid {uuid}");
    }

    store.persist()
}

pub async fn remove_account(uuid: &str) -> Result<()> {
    let mut store = AccountStore::load()?;

    let Some(account) = store.get(uuid) else {
        bail!("No account with uuid {uuid}");
    };

    if !prompt_confirm(format!("Remove account {}?", account.display_name()))? {
        return Ok(());
    }

    let is_microsoft = matches!(account, Account::Microsoft { .. });

    session_manager()?.remove_account(&mut store, uuid).await
        .map_err(report)?;

    if is_microsoft {
        println!("To fully sign out, also sign out of your Microsoft account in the browser.");
    }

    Ok(())
}

pub async fn validate_session() -> Result<()> {
    let mut store = AccountStore::load()?;

    if session_manager()?.validate_selected(&mut store).await {
        println!("{}", style("Session is valid").green());
        Ok(())
    } else {
        bail!("Session is not valid, sign in again")
    }
}

pub fn print_account_status() -> Result<()> {
    let store = AccountStore::load()?;

    let Some(account) = store.selected() else {
        println!("No account selected");
        return Ok(());
    };

    println!("Selected {} account {}", account.type_name(), style(account.display_name()).green());
    println!("   uuid {}", account.uuid());

    if let Account::Microsoft { expires_at, microsoft, .. } = account {
        println!("   Minecraft token refresh at {expires_at}");
        println!("   Microsoft token refresh at {}", microsoft.expires_at);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const REDIRECT: &str = "https://login.microsoftonline.com/common/oauth2/nativeclient";

    #[test]
    fn code_from_redirect_url() {
        let url = format!("{REDIRECT}?code=M.abc-123&state=xyz");
        assert_eq!(auth_code(&url, "xyz").unwrap(), "M.abc-123");
    }

    #[test]
    fn state_must_match() {
        let url = format!("{REDIRECT}?code=M.abc-123&state=forged");
        assert!(auth_code(&url, "xyz").is_err());

        let url = format!("{REDIRECT}?code=M.abc-123");
        assert!(auth_code(&url, "xyz").is_err());
    }

    #[test]
    fn rejected_sign_in() {
        let url = format!("{REDIRECT}?error=access_denied&error_description=cancelled&state=xyz");
        assert!(auth_code(&url, "xyz").is_err());
        assert!(auth_code("M.abc-123", "xyz").is_err());
        assert!(auth_code("", "xyz").is_err());
    }
}
