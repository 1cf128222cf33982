use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::resolve::{Outcome, ResolverFactory, SubtitleResolver};
use crate::video::{VideoFile, discover_videos};

/// What happened to one video during a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoStatus {
    /// `<basename>.srt` already present, nothing was fetched
    AlreadyPresent,
    /// Another video with the same base name was handled earlier in this pass
    DuplicateBaseName,
    /// A resolver wrote subtitle files
    Fetched {
        resolver: &'static str,
        files: Vec<PathBuf>,
    },
    /// Every resolver came up empty or failed
    Missing,
}

pub struct SubtitleOrchestrator {
    resolvers: Vec<Box<dyn SubtitleResolver>>,
    video_extensions: Vec<String>,
    output_dir: PathBuf,
}

impl SubtitleOrchestrator {
    pub fn new(
        resolvers: Vec<Box<dyn SubtitleResolver>>,
        video_extensions: Vec<String>,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            resolvers,
            video_extensions,
            output_dir,
        }
    }

    /// Build the default SubDB -> Subscene chain from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            ResolverFactory::create_chain(config)?,
            config.scan.video_extensions.clone(),
            config.scan.resolve_output_dir()?,
        ))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Fetch subtitles for every video directly inside `directory`.
    ///
    /// Only listing the directory or preparing the output directory can fail;
    /// per-video problems are logged and the pass moves on.
    pub async fn run<P: AsRef<Path>>(&self, directory: P) -> Result<()> {
        let directory = directory.as_ref();
        info!("Scanning {} for videos", directory.display());

        let videos = discover_videos(directory, &self.video_extensions)?;
        fs::create_dir_all(&self.output_dir).await?;

        let mut seen = HashSet::new();
        for video in &videos {
            if !seen.insert(video.base_name.clone()) {
                warn!(
                    "Skipping {}: another video named '{}' was already handled",
                    video.path.display(),
                    video.base_name
                );
                continue;
            }

            match self.process_video(video).await {
                VideoStatus::Fetched { resolver, files } => {
                    info!("{}: {} file(s) via {}", video.path.display(), files.len(), resolver)
                }
                VideoStatus::Missing => warn!("No subtitle found for {}", video.path.display()),
                _ => {}
            }
        }

        info!("Processed {} video files", videos.len());
        Ok(())
    }

    /// Try each resolver in order until one writes something
    pub async fn process_video(&self, video: &VideoFile) -> VideoStatus {
        let srt_path = self.output_dir.join(video.subtitle_file_name());
        if srt_path.exists() {
            debug!("Subtitle already present: {}", srt_path.display());
            return VideoStatus::AlreadyPresent;
        }

        for resolver in &self.resolvers {
            match resolver.resolve(video, &self.output_dir).await {
                Ok(Outcome::Written(files)) => {
                    return VideoStatus::Fetched {
                        resolver: resolver.name(),
                        files,
                    };
                }
                Ok(Outcome::NotFound) => {
                    debug!("{} has nothing for {}", resolver.name(), video.base_name);
                }
                Err(e) => {
                    warn!("{} failed for {}: {}", resolver.name(), video.path.display(), e);
                }
            }
        }

        VideoStatus::Missing
    }
}
