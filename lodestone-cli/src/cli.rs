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

pub use clap::Parser;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Set the directory where the account store is kept
    /// [default: $LODESTONE_DATA_HOME or $XDG_DATA_HOME/lodestone]
    #[arg(short, verbatim_doc_comment)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in, switch between and manage stored accounts
    Auth {
        #[clap(subcommand)]
        command: AuthCommands
    },

    /// Sign a skin image and use it for the selected account
    Skin {
        /// Path to the 64x64 skin png
        file: PathBuf,

        /// Use the slim (Alex) arm model
        #[arg(long)]
        slim: bool
    },

    /// Announce a game start on the configured Discord webhook
    Notify {
        /// Name of an installed mod, may be repeated
        #[arg(long = "mod")]
        mods: Vec<String>,

        /// Name of an enabled resource pack, may be repeated
        #[arg(long = "pack")]
        packs: Vec<String>
    }
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Sign in with a legacy Mojang account
    Mojang {
        /// Mojang username or email, prompt when not specified
        username: Option<String>
    },

    /// Sign in with a Microsoft account in the browser
    Microsoft,

    /// Add an offline account that never contacts a server
    Offline {
        username: String
    },

    /// List stored accounts, the selected account is marked with *
    List,

    /// Make the account with the given uuid the selected account
    Select {
        uuid: String
    },

    /// Sign out and delete the account with the given uuid
    Remove {
        uuid: String
    },

    /// Check the selected account's session, refreshing tokens when needed
    Validate,

    /// Print information about the selected account
    Status
}
