use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{Result, SubgrabError};

/// A video discovered in the scanned directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFile {
    /// Absolute path to the video
    pub path: PathBuf,
    /// File name without its extension
    pub base_name: String,
    /// Extension including the leading dot, as stored on disk
    pub extension: String,
}

impl VideoFile {
    /// Build a video from a path, returning `None` when it has no usable stem or extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let path = path.as_ref();
        let base_name = path.file_stem()?.to_str()?.to_string();
        let extension = format!(".{}", path.extension()?.to_str()?);

        Some(Self {
            path: path.to_path_buf(),
            base_name,
            extension,
        })
    }

    /// Name of the subtitle file that belongs to this video
    pub fn subtitle_file_name(&self) -> String {
        format!("{}.srt", self.base_name)
    }
}

/// List the immediate children of `dir` whose extension is in `extensions`.
///
/// Extensions carry their leading dot and are compared case-sensitively.
/// Results are absolute and ordered by file name.
pub fn discover_videos<P: AsRef<Path>>(dir: P, extensions: &[String]) -> Result<Vec<VideoFile>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(SubgrabError::FileNotFound(dir.display().to_string()));
    }
    let dir = std::path::absolute(dir)?;

    let mut videos = Vec::new();
    for entry in WalkDir::new(&dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| SubgrabError::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        match VideoFile::from_path(entry.path()) {
            Some(video) if extensions.contains(&video.extension) => videos.push(video),
            _ => debug!("Skipping non-video entry: {}", entry.path().display()),
        }
    }

    info!("Found {} video files in {}", videos.len(), dir.display());
    Ok(videos)
}
