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

use anyhow::Result;

use lodestone::{AccountStore, GameStart, WebhookNotifier};

pub async fn notify_game_start(mods: &[String], packs: &[String]) -> Result<()> {
    let store = AccountStore::load()?;

    let player = store.selected()
        .map(|account| account.display_name().to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    let start = GameStart { player: &player, mods, resource_packs: packs };
    WebhookNotifier::from_env().send_game_starting(&start).await;

    Ok(())
}
