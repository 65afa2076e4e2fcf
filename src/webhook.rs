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

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder};
use serde_json::{json, Value};

use crate::api_client::{http_client, ApiClient};
use crate::env;

/// Embed colors, green for a vanilla client and red when anything was added
const COLOR_VANILLA: u32 = 5763719;
const COLOR_MODDED: u32 = 15548997;

pub struct GameStart<'a> {
    pub player: &'a str,
    pub mods: &'a [String],
    pub resource_packs: &'a [String]
}

impl GameStart<'_> {
    fn is_vanilla(&self) -> bool {
        self.mods.is_empty() && self.resource_packs.is_empty()
    }

    /// Discord message with a single embed
    pub fn message(&self, timestamp: DateTime<Utc>) -> Value {
        let color = if self.is_vanilla() { COLOR_VANILLA } else { COLOR_MODDED };

        json!({
            "embeds": [{
                "title": format!("**{}** started the game", self.player),
                "color": color,
                "fields": [
                    {
                        "name": "Mods:",
                        "value": list_field(self.mods),
                        "inline": true
                    },
                    {
                        "name": "Resource Packs:",
                        "value": list_field(self.resource_packs),
                        "inline": true
                    }
                ],
                "timestamp": timestamp.to_rfc3339()
            }]
        })
    }
}

fn list_field(items: &[String]) -> String {
    if items.is_empty() {
        "`None`".to_string()
    } else {
        format!("`{}`", items.join(", "))
    }
}

/// Announces game starts to a Discord channel
pub struct WebhookNotifier {
    client: Client,
    url: Option<String>
}

impl WebhookNotifier {
    pub fn new(url: Option<String>) -> Self {
        Self { client: http_client(), url }
    }

    pub fn from_env() -> Self {
        Self::new(env::get_discord_webhook_url())
    }

    /// Post the announcement, failures are logged and never interrupt a launch
    pub async fn send_game_starting(&self, start: &GameStart<'_>) {
        let Some(url) = &self.url else {
            tracing::debug!("No Discord webhook configured");
            return;
        };

        match self.post(url, &start.message(Utc::now())).await {
            Ok(()) => tracing::info!("Message sent to Discord"),
            Err(err) => tracing::error!("Error while trying to send message to Discord: {err:#}")
        }
    }

    async fn post(&self, url: &str, message: &Value) -> Result<()> {
        let response = self.post_json(url, message).await?;
        let status = response.status();

        if !status.is_success() {
            bail!("HTTP error {status}");
        }

        Ok(())
    }
}

impl ApiClient for WebhookNotifier {
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mockito::Matcher;

    #[test]
    fn vanilla_message() {
        let start = GameStart { player: "Steve", mods: &[], resource_packs: &[] };
        let timestamp = Utc.timestamp_opt(1700000000, 0).unwrap();
        let message = start.message(timestamp);

        let embed = &message["embeds"][0];
        assert_eq!(embed["title"], "**Steve** started the game");
        assert_eq!(embed["color"], COLOR_VANILLA);
        assert_eq!(embed["fields"][0]["value"], "`None`");
        assert_eq!(embed["fields"][1]["value"], "`None`");
        assert_eq!(embed["timestamp"], "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn modded_message() {
        let mods = vec!["sodium".to_string(), "iris".to_string()];
        let start = GameStart { player: "Alex", mods: &mods, resource_packs: &[] };
        let message = start.message(Utc::now());

        let embed = &message["embeds"][0];
        assert_eq!(embed["color"], COLOR_MODDED);
        assert_eq!(embed["fields"][0]["value"], "`sodium, iris`");
    }

    #[tokio::test]
    async fn posts_embed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", "/webhook")
            .match_body(Matcher::PartialJson(json!({
                "embeds": [{"title": "**Steve** started the game"}]
            })))
            .with_status(204)
            .create_async().await;

        let notifier = WebhookNotifier::new(Some(format!("{}/webhook", server.url())));
        let start = GameStart { player: "Steve", mods: &[], resource_packs: &[] };
        notifier.send_game_starting(&start).await;

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_url_is_noop() {
        let start = GameStart { player: "Steve", mods: &[], resource_packs: &[] };
        WebhookNotifier::new(None).send_game_starting(&start).await;
    }

    #[tokio::test]
    async fn http_error_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server.mock("POST", "/webhook")
            .with_status(404)
            .create_async().await;

        let notifier = WebhookNotifier::new(Some(format!("{}/webhook", server.url())));
        let start = GameStart { player: "Steve", mods: &[], resource_packs: &[] };
        let url = format!("{}/webhook", server.url());

        assert!(notifier.post(&url, &start.message(Utc::now())).await.is_err());
    }
}
