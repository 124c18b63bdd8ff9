use std::{
    io::{BufWriter, Write},
    path::Path,
};

use thiserror::Error;

use crate::travel_info::TravelInfo;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache file unreadable: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache file malformed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Loads the cached travel entries. A missing or malformed file is an
/// error; callers that want an empty starting cache create one with
/// [`store`] first.
pub fn load(path: &Path) -> Result<Vec<TravelInfo>, CacheError> {
    let file = std::fs::File::open(path)?;
    let entries: Vec<TravelInfo> = serde_json::from_reader(file)?;

    Ok(entries)
}

/// Overwrites the cache with exactly `entries`, truncating any previous
/// content.
pub fn store(path: &Path, entries: &[TravelInfo]) -> Result<(), CacheError> {
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::with_capacity(64 * 1024, file);
    serde_json::to_writer(&mut writer, entries)?;
    writer.flush()?;

    Ok(())
}
