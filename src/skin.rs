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

//! Skin signing through the MineSkin API

use anyhow::{bail, Context, Result};
use reqwest::{multipart::{Form, Part}, Client, Method, RequestBuilder};
use serde::Deserialize;
use std::{fs, path::{Path, PathBuf}};

use crate::account_store::AccountStore;
use crate::api_client::{http_client, ApiClient};
use crate::env;
use crate::json::{Skin, SkinVariant};

pub const MINESKIN_URL: &str = "https://api.mineskin.org";

/// Expiry written into every skin file, 2100-01-01
const SKIN_EXPIRES_AT_MS: i64 = 4102444800000;

#[derive(Deserialize)]
struct GenerateResponse {
    data: GenerateData
}

#[derive(Deserialize)]
struct GenerateData {
    texture: Texture
}

#[derive(Deserialize)]
struct Texture {
    value: Option<String>,
    signature: Option<String>,
    #[serde(default)]
    url: String
}

/// Uploads skin images and keeps the signed textures next to the account store
pub struct SkinUploader {
    client: Client,
    base_url: String,
    skin_dir: PathBuf
}

impl SkinUploader {
    pub fn new() -> Self {
        Self::with_base_url(MINESKIN_URL, env::get_data_dir().join("skin"))
    }

    pub fn with_base_url(base_url: &str, skin_dir: impl Into<PathBuf>) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            skin_dir: skin_dir.into()
        }
    }

    pub async fn is_available(&self) -> bool {
        let url = format!("{}/get/delay", self.base_url);

        match self.request(Method::GET, &url).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::warn!("MineSkin status check returned {}", response.status());
                false
            },
            Err(err) => {
                tracing::warn!("MineSkin status check failed: {err}");
                false
            }
        }
    }

    /// Sign the image at `file` as the skin of account `uuid`.
    ///
    /// The texture is written to `<name>.skin` and recorded on the account.
    pub async fn upload(
        &self,
        store: &mut AccountStore,
        uuid: &str,
        file: &Path,
        variant: SkinVariant
    ) -> Result<Skin> {
        let name = store.get(uuid)
            .map(|account| account.display_name().to_string())
            .with_context(|| format!("No account with uuid {uuid}"))?;

        if !self.is_available().await {
            bail!("MineSkin API is not available");
        }

        let image = fs::read(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;

        let file_name = file.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "skin.png".to_string());

        let form = Form::new()
            .part("file", Part::bytes(image).file_name(file_name))
            .text("variant", variant.as_str())
            .text("name", name.clone());

        let url = format!("{}/generate/upload", self.base_url);
        let response = self.request(Method::POST, &url)
            .multipart(form)
            .send().await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Skin upload failed with {status}: {body}");
        }

        let texture = response.json::<GenerateResponse>().await?.data.texture;

        let (Some(value), Some(signature)) = (texture.value, texture.signature) else {
            bail!("Skin upload returned an unsigned texture");
        };

        fs::create_dir_all(&self.skin_dir)?;

        let path = self.skin_dir.join(format!("{name}.skin"));
        fs::write(&path, format!("{value}\n{signature}\n{SKIN_EXPIRES_AT_MS}"))
            .with_context(|| format!("Failed to write {}", path.display()))?;

        let skin = Skin { path, url: texture.url, variant };

        store.update_skin(uuid, skin.clone());
        store.persist()?;

        tracing::info!("Skin of {name} saved to {}", skin.path.display());

        Ok(skin)
    }
}

impl ApiClient for SkinUploader {
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::Account;
    use mockito::Matcher;
    use tempfile::TempDir;

    fn store_with_steve(dir: &TempDir) -> AccountStore {
        let mut store = AccountStore::load_from(dir.path().join("accounts.json")).unwrap();
        store.add(Account::Unofficial {
            uuid: "steve-uuid".to_string(),
            username: "Steve".to_string(),
            display_name: "Steve".to_string(),
            skin: None
        });

        store
    }

    fn skin_image(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("steve.png");
        fs::write(&path, b"not really a png").unwrap();
        path
    }

    #[tokio::test]
    async fn upload_records_skin() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_with_steve(&dir);
        let image = skin_image(&dir);

        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/get/delay")
            .with_status(200)
            .with_body(r#"{"delay": 0}"#)
            .create_async().await;
        let upload = server.mock("POST", "/generate/upload")
            .match_header("content-type", Matcher::Regex("multipart/form-data".to_string()))
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"(?s)name="variant".{0,8}slim"#.to_string()),
                Matcher::Regex(r#"(?s)name="name".{0,8}Steve"#.to_string())
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{
                "data": {
                    "texture": {
                        "value": "texture-value",
                        "signature": "texture-signature",
                        "url": "https://textures.minecraft.net/texture/abc"
                    }
                }
            }"#)
            .create_async().await;

        let uploader = SkinUploader::with_base_url(&server.url(), dir.path().join("skin"));
        let skin = uploader.upload(&mut store, "steve-uuid", &image, SkinVariant::Slim).await.unwrap();

        upload.assert_async().await;

        assert_eq!(skin.path, dir.path().join("skin").join("Steve.skin"));
        assert_eq!(skin.url, "https://textures.minecraft.net/texture/abc");
        assert_eq!(skin.variant, SkinVariant::Slim);
        assert_eq!(
            fs::read_to_string(&skin.path).unwrap(),
            "texture-value\ntexture-signature\n4102444800000"
        );

        let reloaded = AccountStore::load_from(store.path()).unwrap();
        assert_eq!(reloaded.get("steve-uuid").and_then(Account::skin), Some(&skin));
    }

    #[tokio::test]
    async fn unavailable_api_skips_upload() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_with_steve(&dir);
        let image = skin_image(&dir);

        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/get/delay")
            .with_status(503)
            .create_async().await;
        let upload = server.mock("POST", "/generate/upload")
            .expect(0)
            .create_async().await;

        let uploader = SkinUploader::with_base_url(&server.url(), dir.path().join("skin"));
        let result = uploader.upload(&mut store, "steve-uuid", &image, SkinVariant::Classic).await;

        assert!(result.is_err());
        upload.assert_async().await;
        assert_eq!(store.get("steve-uuid").and_then(Account::skin), None);
    }

    #[tokio::test]
    async fn unsigned_texture_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_with_steve(&dir);
        let image = skin_image(&dir);

        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/get/delay")
            .with_status(200)
            .create_async().await;
        server.mock("POST", "/generate/upload")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": {"texture": {"url": "https://textures.minecraft.net/texture/abc"}}}"#)
            .create_async().await;

        let uploader = SkinUploader::with_base_url(&server.url(), dir.path().join("skin"));
        let result = uploader.upload(&mut store, "steve-uuid", &image, SkinVariant::Classic).await;

        assert!(result.is_err());
        assert!(!dir.path().join("skin").join("Steve.skin").exists());
    }

    #[tokio::test]
    async fn unknown_account() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_with_steve(&dir);
        let image = skin_image(&dir);

        let uploader = SkinUploader::with_base_url("http://127.0.0.1:1", dir.path().join("skin"));
        let result = uploader.upload(&mut store, "missing", &image, SkinVariant::Classic).await;

        assert!(result.is_err());
    }
}
