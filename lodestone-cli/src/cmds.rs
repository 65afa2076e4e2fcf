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

mod auth;
mod notify;
mod skin;

pub use {
    auth::add_microsoft_account,
    auth::add_mojang_account,
    auth::add_offline_account,
    auth::list_accounts,
    auth::print_account_status,
    auth::remove_account,
    auth::select_account,
    auth::validate_session,
    notify::notify_game_start,
    skin::upload_skin
};

use console::style;
use dialoguer::{Confirm, Input, Password, theme::ColorfulTheme};
use lodestone::DisplayError;

fn console_theme() -> ColorfulTheme {
    ColorfulTheme::default()
}

fn prompt_confirm<S: Into<String>>(prompt: S) -> std::io::Result<bool> {
    Confirm::with_theme(&console_theme())
        .with_prompt(prompt)
        .wait_for_newline(true)
        .default(false)
        .interact()
}

fn prompt_input<S: Into<String>>(prompt: S) -> std::io::Result<String> {
    Input::with_theme(&console_theme())
        .with_prompt(prompt)
        .interact_text()
}

fn prompt_password<S: Into<String>>(prompt: S) -> std::io::Result<String> {
    Password::with_theme(&console_theme())
        .with_prompt(prompt)
        .interact()
}

/// Print the error for the user, the command then exits with a failure status
fn report(err: DisplayError) -> anyhow::Error {
    eprintln!("{} {}", style(&err.title).red().bold(), err.desc);
    anyhow::Error::new(err).context("Account operation failed")
}
