use std::collections::{BTreeSet, HashMap};

use log::{info, warn};

use crate::error::SyncError;

/// Video ids appear both with and without this prefix, depending on who wrote them.
pub const VIDEO_ID_PREFIX: &str = "ep_";

/// Both spellings of a video id: the id as given, then its counterpart
/// with [`VIDEO_ID_PREFIX`] stripped (if present) or added (if absent).
pub fn spelling_variants(video_id: &str) -> [String; 2] {
  let counterpart = match video_id.strip_prefix(VIDEO_ID_PREFIX) {
    Some(bare) => bare.to_string(),
    None => format!("{}{}", VIDEO_ID_PREFIX, video_id),
  };
  [video_id.to_string(), counterpart]
}

/// One video as reported by the remote catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoStatus {
  pub video_id: String,
  pub published: bool,
  pub title: Option<String>,
}

/// Published flags keyed by video id, every id stored under both spellings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusMap {
  entries: HashMap<String, bool>,
}

impl StatusMap {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, video_id: &str, published: bool) {
    for spelling in spelling_variants(video_id) {
      self.entries.insert(spelling, published);
    }
  }

  /// Merge `other` into `self`; on collisions `other` wins.
  pub fn merge(&mut self, other: StatusMap) {
    self.entries.extend(other.entries);
  }

  /// Exact-key lookup.
  pub fn get(&self, key: &str) -> Option<bool> {
    self.entries.get(key).copied()
  }

  pub fn contains_key(&self, key: &str) -> bool {
    self.entries.contains_key(key)
  }

  /// The published flag of a video under either spelling of its id.
  /// `None` means the video was never fetched, which is not the same as unpublished.
  pub fn published(&self, video_id: &str) -> Option<bool> {
    spelling_variants(video_id)
      .iter()
      .find_map(|spelling| self.get(spelling))
  }

  /// Number of keys, counting both spellings.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl FromIterator<VideoStatus> for StatusMap {
  fn from_iter<I: IntoIterator<Item = VideoStatus>>(iter: I) -> Self {
    let mut map = StatusMap::new();
    for video in iter {
      map.insert(&video.video_id, video.published);
    }
    map
  }
}

/// What a single topic query produced.
#[derive(Debug)]
pub enum FetchOutcome {
  Complete(Vec<VideoStatus>),
  /// Fewer videos came back than the server says exist; they are still usable.
  Partial {
    videos: Vec<VideoStatus>,
    total_count: u64,
  },
  Failed(SyncError),
}

impl FetchOutcome {
  pub fn videos(&self) -> &[VideoStatus] {
    match self {
      FetchOutcome::Complete(videos) | FetchOutcome::Partial { videos, .. } => videos.as_slice(),
      FetchOutcome::Failed(_) => &[],
    }
  }

  /// The dual-spelling map for this topic, empty when the fetch failed.
  pub fn status_map(&self) -> StatusMap {
    self.videos().iter().cloned().collect()
  }
}

/// Anything that can answer "which videos of this topic are published".
pub trait StatusSource {
  fn fetch_statuses(&self, topic_id: &str) -> FetchOutcome;
}

/// The merged result of querying every topic.
#[derive(Debug, Default)]
pub struct Aggregation {
  pub statuses: StatusMap,
  pub partial_topics: Vec<String>,
  pub failed_topics: Vec<(String, SyncError)>,
}

/// Query `source` once per topic, one at a time, and merge everything it returns.
/// Failed topics contribute nothing; their videos stay unknown.
pub fn aggregate<S: StatusSource + ?Sized>(source: &S, topic_ids: &BTreeSet<String>) -> Aggregation {
  let mut aggregation = Aggregation::default();
  let total = topic_ids.len();
  for (index, topic_id) in topic_ids.iter().enumerate() {
    if (index + 1) % 10 == 0 {
      info!("[{}/{}] querying...", index + 1, total);
    }
    let outcome = source.fetch_statuses(topic_id);
    let topic_map = outcome.status_map();
    match outcome {
      FetchOutcome::Complete(_) => {}
      FetchOutcome::Partial { videos, total_count } => {
        warn!(
          "[{}] fetched {} of {} videos; the rest stay unknown.",
          topic_id,
          videos.len(),
          total_count
        );
        aggregation.partial_topics.push(topic_id.clone());
      }
      FetchOutcome::Failed(e) => {
        if e.is_transport() {
          warn!("[{}] unreachable, no statuses: {}", topic_id, e);
        } else {
          warn!("[{}] unusable response, no statuses: {}", topic_id, e);
        }
        aggregation.failed_topics.push((topic_id.clone(), e));
      }
    }
    aggregation.statuses.merge(topic_map);
  }
  info!("total videos in master map: {}", aggregation.statuses.len());
  aggregation
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::cell::RefCell;

  fn video(id: &str, published: bool) -> VideoStatus {
    VideoStatus {
      video_id: id.to_string(),
      published,
      title: None,
    }
  }

  struct ScriptedSource {
    calls: RefCell<Vec<String>>,
  }

  impl StatusSource for ScriptedSource {
    fn fetch_statuses(&self, topic_id: &str) -> FetchOutcome {
      self.calls.borrow_mut().push(topic_id.to_string());
      match topic_id {
        "G1" => FetchOutcome::Complete(vec![video("ep_1", true), video("shared", true)]),
        "G2" => FetchOutcome::Partial {
          videos: vec![video("2", false), video("shared", false)],
          total_count: 5,
        },
        _ => FetchOutcome::Failed(SyncError::Http(500)),
      }
    }
  }

  #[test]
  fn prefixed_id_gets_bare_counterpart() {
    assert_eq!(spelling_variants("ep_123"), ["ep_123".to_string(), "123".to_string()]);
    assert_eq!(spelling_variants("123"), ["123".to_string(), "ep_123".to_string()]);
  }

  #[test]
  fn insert_registers_both_spellings() {
    let map: StatusMap = vec![video("ep_123", true)].into_iter().collect();
    assert_eq!(map.get("ep_123"), Some(true));
    assert_eq!(map.get("123"), Some(true));
    assert!(map.contains_key("ep_123") && map.contains_key("123"));
    assert_eq!(map.len(), 2);
  }

  #[test]
  fn published_is_none_for_unknown_videos() {
    let mut map = StatusMap::new();
    map.insert("456", false);
    assert_eq!(map.published("ep_456"), Some(false));
    assert_eq!(map.published("789"), None);
  }

  #[test]
  fn failed_outcome_has_empty_map() {
    let outcome = FetchOutcome::Failed(SyncError::Schema("missing data".into()));
    assert!(outcome.status_map().is_empty());
  }

  #[test]
  fn aggregate_merges_topics_in_order_and_records_anomalies() {
    let source = ScriptedSource {
      calls: RefCell::new(Vec::new()),
    };
    let topics: BTreeSet<String> = ["G1", "G2", "G3"].iter().map(|t| t.to_string()).collect();
    let aggregation = aggregate(&source, &topics);

    assert_eq!(*source.calls.borrow(), vec!["G1", "G2", "G3"]);
    assert_eq!(aggregation.statuses.get("1"), Some(true));
    assert_eq!(aggregation.statuses.get("ep_2"), Some(false));
    // G2 comes after G1, so its answer wins.
    assert_eq!(aggregation.statuses.get("shared"), Some(false));
    assert_eq!(aggregation.statuses.get("ep_shared"), Some(false));
    assert_eq!(aggregation.partial_topics, vec!["G2".to_string()]);
    assert_eq!(aggregation.failed_topics.len(), 1);
    assert_eq!(aggregation.failed_topics[0].0, "G3");
  }
}
