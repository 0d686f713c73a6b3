use std::env;
use std::path::PathBuf;

pub const REPORT_FILEPATH: &str = "doc/grammar/epic_lessons_full_report.csv";
pub const INDEX_FILEPATH: &str = "frontend/src/data/grammar_resources.json";
pub const GRAPHQL_ENDPOINT: &str = "https://api.ejoy.io/graph?";
pub const PASS_KEY: &str = "ejoy2018";
pub const ORIGIN: &str = "https://api.ejoy.io";
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36";
/// Only one page is ever requested per topic.
pub const PAGE_SIZE: u32 = 300;

pub const LESSON_ID_COLUMN: &str = "Lesson ID";
pub const TOPIC_ID_COLUMN: &str = "Grammar Topic ID";
pub const STATUS_COLUMN: &str = "Status Published";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportColumns {
  pub lesson_id: String,
  pub topic_id: String,
  pub status: String,
}

impl Default for ReportColumns {
  fn default() -> Self {
    ReportColumns {
      lesson_id: LESSON_ID_COLUMN.to_string(),
      topic_id: TOPIC_ID_COLUMN.to_string(),
      status: STATUS_COLUMN.to_string(),
    }
  }
}

/// Everything the job needs to know about its surroundings.
#[derive(Clone, Debug)]
pub struct Config {
  pub report_path: PathBuf,
  pub index_path: PathBuf,
  pub endpoint: String,
  /// Sent with every request, in this order.
  pub headers: Vec<(String, String)>,
  pub page_size: u32,
  pub columns: ReportColumns,
}

impl Default for Config {
  fn default() -> Self {
    Config {
      report_path: PathBuf::from(REPORT_FILEPATH),
      index_path: PathBuf::from(INDEX_FILEPATH),
      endpoint: GRAPHQL_ENDPOINT.to_string(),
      headers: default_headers(PASS_KEY),
      page_size: PAGE_SIZE,
      columns: ReportColumns::default(),
    }
  }
}

impl Config {
  /// The defaults, with any `PUBLISH_SYNC_*` variables from the environment applied.
  pub fn from_env() -> Self {
    Self::from_lookup(|key| env::var(key).ok())
  }

  fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
    let mut config = Config::default();
    if let Some(path) = lookup("PUBLISH_SYNC_REPORT") {
      config.report_path = PathBuf::from(path);
    }
    if let Some(path) = lookup("PUBLISH_SYNC_INDEX") {
      config.index_path = PathBuf::from(path);
    }
    if let Some(endpoint) = lookup("PUBLISH_SYNC_ENDPOINT") {
      config.endpoint = endpoint;
    }
    if let Some(key) = lookup("PUBLISH_SYNC_PASS_KEY") {
      config.headers = default_headers(&key);
    }
    if let Some(size) = lookup("PUBLISH_SYNC_PAGE_SIZE").and_then(|v| v.trim().parse().ok()) {
      config.page_size = size;
    }
    config
  }
}

fn default_headers(pass_key: &str) -> Vec<(String, String)> {
  [
    ("accept", "application/json"),
    ("content-type", "application/json"),
    ("pass-key", pass_key),
    ("origin", ORIGIN),
    ("user-agent", USER_AGENT),
  ]
  .iter()
  .map(|(name, value)| (name.to_string(), value.to_string()))
  .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  #[test]
  fn defaults_use_the_fixed_constants() {
    let config = Config::default();
    assert_eq!(config.report_path, PathBuf::from(REPORT_FILEPATH));
    assert_eq!(config.endpoint, GRAPHQL_ENDPOINT);
    assert_eq!(config.page_size, 300);
    assert!(config
      .headers
      .iter()
      .any(|(name, value)| name == "pass-key" && value == PASS_KEY));
  }

  #[test]
  fn environment_overrides_defaults() {
    let vars: HashMap<&str, &str> = [
      ("PUBLISH_SYNC_REPORT", "/tmp/report.csv"),
      ("PUBLISH_SYNC_PASS_KEY", "secret"),
      ("PUBLISH_SYNC_PAGE_SIZE", "50"),
    ]
    .into_iter()
    .collect();
    let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
    assert_eq!(config.report_path, PathBuf::from("/tmp/report.csv"));
    assert_eq!(config.index_path, PathBuf::from(INDEX_FILEPATH));
    assert_eq!(config.page_size, 50);
    assert!(config
      .headers
      .iter()
      .any(|(name, value)| name == "pass-key" && value == "secret"));
  }

  #[test]
  fn unparsable_page_size_is_ignored() {
    let config = Config::from_lookup(|key| {
      (key == "PUBLISH_SYNC_PAGE_SIZE").then(|| "lots".to_string())
    });
    assert_eq!(config.page_size, PAGE_SIZE);
  }
}
