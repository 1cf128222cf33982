use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode};
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

use super::{Outcome, SubtitleResolver};
use crate::config::PrimaryConfig;
use crate::error::Result;
use crate::hash::{ContentHash, compute_hash};
use crate::video::VideoFile;

/// Hash-keyed lookup against the SubDB download API
pub struct SubDbResolver {
    client: Client,
    config: PrimaryConfig,
}

impl SubDbResolver {
    pub fn new(client: Client, config: PrimaryConfig) -> Self {
        Self { client, config }
    }

    /// Download the subtitle for `hash`.
    ///
    /// Only a 200 counts as a hit; every other status is reported as `None`.
    /// The body is returned untouched.
    pub async fn fetch(&self, hash: &ContentHash, language: &str) -> Result<Option<Vec<u8>>> {
        let response = self
            .client
            .get(&self.config.endpoint)
            .header(USER_AGENT, &self.config.user_agent)
            .query(&[
                ("action", "download"),
                ("hash", hash.as_str()),
                ("language", language),
            ])
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            debug!("SubDB has no subtitle for {}: HTTP {}", hash, response.status());
            return Ok(None);
        }

        Ok(Some(response.bytes().await?.to_vec()))
    }
}

#[async_trait]
impl SubtitleResolver for SubDbResolver {
    fn name(&self) -> &'static str {
        "subdb"
    }

    async fn resolve(&self, video: &VideoFile, output_dir: &Path) -> Result<Outcome> {
        let hash = compute_hash(&video.path).await?;

        match self.fetch(&hash, &self.config.language).await? {
            Some(bytes) => {
                let srt_path = output_dir.join(video.subtitle_file_name());
                fs::write(&srt_path, &bytes).await?;
                info!("Wrote {} ({} bytes) from SubDB", srt_path.display(), bytes.len());
                Ok(Outcome::Written(vec![srt_path]))
            }
            None => Ok(Outcome::NotFound),
        }
    }
}
