use std::collections::HashSet;
use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use log::{info, warn};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Result, SyncError};
use crate::status::StatusMap;

lazy_static! {
  static ref TRAILING_SEGMENT_REGEX: Regex = Regex::new("/([^/]+)$").unwrap();
}

/// The resource index: resource key -> entry, in file order.
pub type ResourceIndex = Map<String, Value>;

pub fn load_index(path: &Path) -> Result<ResourceIndex> {
  let contents = fs::read_to_string(path)?;
  let index = serde_json::from_str(&contents)?;
  Ok(index)
}

/// Two-space indentation, non-ASCII written as-is.
pub fn save_index(path: &Path, index: &ResourceIndex) -> Result<()> {
  let mut buffer = Vec::new();
  let formatter = serde_json::ser::PrettyFormatter::with_indent(b"  ");
  let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
  index.serialize(&mut serializer)?;
  fs::write(path, buffer).map_err(SyncError::from)
}

/// The last path segment of a video URL, e.g. `ep_42` for `https://host/video/ep_42`.
pub fn video_id_from_url(url: &str) -> Option<&str> {
  TRAILING_SEGMENT_REGEX
    .captures(url)
    .and_then(|cap| cap.get(1))
    .map(|m| m.as_str())
}

/// Remove every entry whose video is known to be unpublished.
/// Entries without a `videoUrl`, or whose video was never fetched, are kept.
/// Returns the removed keys in index order.
pub fn prune(index: &mut ResourceIndex, statuses: &StatusMap) -> Vec<String> {
  let mut to_remove = Vec::new();
  for (key, entry) in index.iter() {
    let url = match entry.get("videoUrl").and_then(Value::as_str) {
      Some(url) if !url.is_empty() => url,
      _ => continue,
    };
    let video_id = match video_id_from_url(url) {
      Some(id) => id,
      None => continue,
    };
    match statuses.published(video_id) {
      Some(false) => {
        info!("removing {} (video {}): unpublished", key, video_id);
        to_remove.push(key.clone());
      }
      Some(true) => {}
      None => warn!(
        "video {} for {} not found in the fetched statuses, keeping.",
        video_id, key
      ),
    }
  }
  if !to_remove.is_empty() {
    let doomed: HashSet<&String> = to_remove.iter().collect();
    let retained: ResourceIndex = std::mem::take(index)
      .into_iter()
      .filter(|(key, _)| !doomed.contains(key))
      .collect();
    *index = retained;
  }
  to_remove
}
