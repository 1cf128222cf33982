//! Subgrab - Subtitle Fetcher for Local Videos
//!
//! Looks up subtitles for every video in a directory, first by content hash
//! against the SubDB API, then by file name through a Subscene scrape.

pub mod cli;
pub mod config;
pub mod error;
pub mod hash;
pub mod orchestrator;
pub mod resolve;
pub mod video;
