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

mod cli;
mod cmds;

use cmds::{
    add_microsoft_account, add_mojang_account, add_offline_account, list_accounts,
    notify_game_start, print_account_status, remove_account, select_account, upload_skin,
    validate_session
};
use cli::{AuthCommands, Parser, Cli, Commands};
use lodestone::env;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Some(dir) = cli.data_dir {
        env::set_data_dir(&dir.to_string_lossy());
    }

    match cli.command {
        Commands::Auth { command } => {
            match command {
                AuthCommands::Mojang { username } => add_mojang_account(username).await,
                AuthCommands::Microsoft => add_microsoft_account().await,
                AuthCommands::Offline { username } => add_offline_account(&username),
                AuthCommands::List => list_accounts(),
                AuthCommands::Select { uuid } => select_account(&uuid),
                AuthCommands::Remove { uuid } => remove_account(&uuid).await,
                AuthCommands::Validate => validate_session().await,
                AuthCommands::Status => print_account_status()
            }
        },
        Commands::Skin { file, slim } => upload_skin(&file, slim).await,
        Commands::Notify { mods, packs } => {
            notify_game_start(&mods, &packs).await
        }
    }
}
