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

use reqwest::{header, Client, Method, RequestBuilder, Response};

use crate::env;

pub fn user_agent() -> String {
    format!("lodestone/{}", env::get_package_version())
}

pub fn http_client() -> Client {
    Client::builder()
        .user_agent(user_agent())
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Requests against an auth provider, the status is left for the caller to decode
pub trait ApiClient {
    fn request(&self, method: Method, url: &str) -> RequestBuilder;

    async fn post_json<R>(&self, url: &str, body: &R) -> reqwest::Result<Response>
        where R: serde::Serialize
    {
        self.request(Method::POST, url)
            .header(header::ACCEPT, "application/json")
            .json(body)
            .send().await
    }

    async fn get_bearer(&self, url: &str, token: &str) -> reqwest::Result<Response> {
        self.request(Method::GET, url)
            .bearer_auth(token)
            .send().await
    }
}
