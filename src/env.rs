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
use std::env;
use std::path::PathBuf;

const DATA_HOME_VAR: &str = "LODESTONE_DATA_HOME";
const PACKAGE_NAME: &str = env!("CARGO_PKG_NAME");

/// Override the data directory for the remainder of the process
pub fn set_data_dir(dir: &str) {
    env::set_var(DATA_HOME_VAR, dir);
}

pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = env::var(DATA_HOME_VAR) {
        return PathBuf::from(dir);
    }

    // get base data directory from XDG_DATA_HOME, or ~/.local/share
    let base_data_dir = match env::var("XDG_DATA_HOME") {
        Ok(var) => PathBuf::from(var),
        Err(_) => {
            let home_dir = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home_dir).join(".local").join("share")
        }
    };

    base_data_dir.join(PACKAGE_NAME)
}

pub fn get_package_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Application (client) id registered in Azure for the Microsoft login
pub fn get_azure_client_id() -> Result<String> {
    env::var("AZURE_CLIENT_ID")
        .context("AZURE_CLIENT_ID env var not found")
}

/// Discord webhook that receives game start announcements, if any
pub fn get_discord_webhook_url() -> Option<String> {
    env::var("LODESTONE_DISCORD_WEBHOOK").ok()
        .filter(|url| !url.trim().is_empty())
}

/// Comma separated list of offline names nobody may claim
pub fn get_reserved_names() -> Option<Vec<String>> {
    env::var("LODESTONE_RESERVED_NAMES").ok().map(|names| {
        names.split(',')
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect()
    })
}

/// Identifier of this machine, mixed into offline account uuids.
///
/// Reads the OS machine id (/etc/machine-id, MachineGuid or IOPlatformUUID),
/// the host name is only used when the OS has none.
pub fn get_machine_id() -> String {
    match machine_uid::get() {
        Ok(id) if !id.trim().is_empty() => id.trim().to_string(),
        result => {
            if let Err(err) = result {
                tracing::warn!("Machine id not available, falling back to host name: {err}");
            }

            hostname::get()
                .ok()
                .and_then(|h| h.into_string().ok())
                .unwrap_or_else(|| "unknown".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn machine_id_is_stable() {
        let id = get_machine_id();

        assert!(!id.is_empty());
        assert_eq!(get_machine_id(), id);
    }
}
