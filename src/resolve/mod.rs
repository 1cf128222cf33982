// Subtitle resolution strategies
//
// Each source implements the same SubtitleResolver capability:
// - SubDb: hash-keyed API lookup, writes <basename>.srt directly
// - Subscene: name-keyed scrape (search -> release page -> zip archive)
//
// The orchestrator tries them in the order returned by ResolverFactory and
// stops at the first one that writes something.

pub mod subdb;
pub mod subscene;

use async_trait::async_trait;
use reqwest::Client;
use std::path::{Path, PathBuf};

pub use subdb::SubDbResolver;
pub use subscene::SubsceneResolver;

use crate::config::Config;
use crate::error::Result;
use crate::video::VideoFile;

/// Result of a single resolver attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Subtitle files written to the output directory
    Written(Vec<PathBuf>),
    /// The source has nothing for this video
    NotFound,
}

/// Main trait for subtitle sources
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubtitleResolver: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Try to produce a subtitle for `video` inside `output_dir`
    async fn resolve(&self, video: &VideoFile, output_dir: &Path) -> Result<Outcome>;
}

/// Factory for building the resolver chain
pub struct ResolverFactory;

impl ResolverFactory {
    /// Shared HTTP client with the configured per-request timeout
    pub fn create_client(config: &Config) -> Result<Client> {
        Ok(Client::builder().timeout(config.http.timeout()).build()?)
    }

    /// Primary hash lookup first, scrape fallback second
    pub fn create_chain(config: &Config) -> Result<Vec<Box<dyn SubtitleResolver>>> {
        let client = Self::create_client(config)?;

        Ok(vec![
            Box::new(SubDbResolver::new(client.clone(), config.primary.clone())),
            Box::new(SubsceneResolver::new(client, config.fallback.clone())?),
        ])
    }
}
