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
use console::style;
use std::path::Path;

use lodestone::{AccountStore, SkinUploader, SkinVariant};

pub async fn upload_skin(file: &Path, slim: bool) -> Result<()> {
    let mut store = AccountStore::load()?;

    let uuid = store.selected()
        .map(|account| account.uuid().to_string())
        .context("No account selected")?;

    let variant = if slim { SkinVariant::Slim } else { SkinVariant::Classic };
    let skin = SkinUploader::new().upload(&mut store, &uuid, file, variant).await?;

    println!("Skin saved to {}", style(skin.path.display()).green());
    Ok(())
}
