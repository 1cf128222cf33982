//! Name-keyed fallback that scrapes Subscene.
//!
//! Three hops: the release search page, the chosen release page, and the zip
//! archive behind its download button. A miss at any hop is `NotFound`.

use async_trait::async_trait;
use reqwest::{Client, Url};
use scraper::{Html, Selector};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zip::ZipArchive;

use super::{Outcome, SubtitleResolver};
use crate::config::FallbackConfig;
use crate::error::{Result, SubgrabError};
use crate::video::VideoFile;

const SEARCH_PATH: &str = "/subtitles/release";
const DOWNLOAD_BUTTON_SELECTOR: &str = "a#downloadButton";

/// Scrape-based resolver keyed by the video's base name
pub struct SubsceneResolver {
    client: Client,
    config: FallbackConfig,
    base_url: Url,
}

impl SubsceneResolver {
    pub fn new(client: Client, config: FallbackConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            SubgrabError::Config(format!("Invalid fallback base_url '{}': {}", config.base_url, e))
        })?;

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    /// Search releases by name and return the first one labeled with the target language
    pub async fn search(&self, base_name: &str) -> Result<Option<Url>> {
        let url = self.join(SEARCH_PATH)?;
        let response = self.client.get(url).query(&[("q", base_name)]).send().await?;

        if !response.status().is_success() {
            debug!("Search for '{}' failed: HTTP {}", base_name, response.status());
            return Ok(None);
        }

        let html = response.text().await?;
        find_release_link(&html, &self.config.language_name)
            .map(|link| self.join(&link))
            .transpose()
    }

    /// Fetch a release page and return the archive URL behind its download button
    pub async fn download_link(&self, release_url: Url) -> Result<Option<Url>> {
        let response = self.client.get(release_url.clone()).send().await?;

        if !response.status().is_success() {
            debug!("Release page {} failed: HTTP {}", release_url, response.status());
            return Ok(None);
        }

        let html = response.text().await?;
        match find_download_link(&html) {
            Some(link) => Ok(Some(self.join(&link)?)),
            None => {
                warn!("No download button on release page {}", release_url);
                Ok(None)
            }
        }
    }

    /// Run the full search -> release -> archive sequence for `base_name`
    pub async fn fetch(&self, base_name: &str, output_dir: &Path) -> Result<Outcome> {
        let Some(release_url) = self.search(base_name).await? else {
            info!("No {} release found for '{}'", self.config.language_name, base_name);
            return Ok(Outcome::NotFound);
        };
        debug!("Selected release page: {}", release_url);

        let Some(archive_url) = self.download_link(release_url).await? else {
            return Ok(Outcome::NotFound);
        };

        let response = self.client.get(archive_url.clone()).send().await?;
        if !response.status().is_success() {
            debug!("Archive download {} failed: HTTP {}", archive_url, response.status());
            return Ok(Outcome::NotFound);
        }

        let bytes = response.bytes().await?.to_vec();
        let target_dir = output_dir.to_path_buf();
        let extracted =
            tokio::task::spawn_blocking(move || extract_archive(bytes, &target_dir)).await??;
        if extracted.is_empty() {
            warn!("Archive from {} contained no files", archive_url);
            return Ok(Outcome::NotFound);
        }

        info!("Extracted {} file(s) for '{}' from Subscene", extracted.len(), base_name);
        Ok(Outcome::Written(extracted))
    }

    fn join(&self, link: &str) -> Result<Url> {
        self.base_url
            .join(link)
            .map_err(|e| SubgrabError::Scrape(format!("Invalid link '{}': {}", link, e)))
    }
}

#[async_trait]
impl SubtitleResolver for SubsceneResolver {
    fn name(&self) -> &'static str {
        "subscene"
    }

    async fn resolve(&self, video: &VideoFile, output_dir: &Path) -> Result<Outcome> {
        self.fetch(&video.base_name, output_dir).await
    }
}

/// Pick the first `<a>` holding exactly two `<span>` labels whose first label,
/// trimmed, equals `language_name`. Returns its trimmed `href`.
///
/// Only the first labeled anchor is considered; if it carries no usable
/// `href` the search is a miss.
pub fn find_release_link(html: &str, language_name: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let anchor_selector = Selector::parse("a").ok()?;
    let span_selector = Selector::parse("span").ok()?;

    document
        .select(&anchor_selector)
        .find(|anchor| {
            let labels: Vec<String> = anchor
                .select(&span_selector)
                .map(|span| span.text().collect::<String>())
                .collect();

            labels.len() == 2 && labels[0].trim() == language_name
        })
        .and_then(|anchor| anchor.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
}

/// `href` of the release page's download button
pub fn find_download_link(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(DOWNLOAD_BUTTON_SELECTOR).ok()?;

    document
        .select(&selector)
        .next()
        .and_then(|button| button.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
}

/// Unpack an in-memory zip into `output_dir`, returning the files written.
///
/// Entries whose names would land outside `output_dir` are skipped.
pub fn extract_archive(bytes: Vec<u8>, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut extracted = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(relative) = entry.enclosed_name() else {
            warn!("Skipping archive entry with unsafe name: {}", entry.name());
            continue;
        };
        let outpath = output_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&outpath)?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut outfile = fs::File::create(&outpath)?;
        std::io::copy(&mut entry, &mut outfile)?;
        debug!("Extracted {}", outpath.display());
        extracted.push(outpath);
    }

    Ok(extracted)
}
