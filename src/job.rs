use log::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::index::{load_index, prune, save_index};
use crate::remote::RemoteStatusFetcher;
use crate::report::Report;
use crate::status::{aggregate, StatusSource};

/// What a run did, for the final log line and for callers that want to act on it.
#[derive(Debug, Default)]
pub struct RunSummary {
  pub topics: usize,
  pub failed_topics: Vec<String>,
  pub partial_topics: Vec<String>,
  pub known_videos: usize,
  pub rows_changed: usize,
  pub removed_resources: Vec<String>,
}

/// Run against the live catalog described by `config`.
pub fn run(config: &Config) -> Result<RunSummary> {
  let fetcher = RemoteStatusFetcher::new(config)?;
  run_with_source(config, &fetcher)
}

/// Reconcile the report and the resource index against `source`.
/// Topic failures are tolerated; any file error aborts the run.
pub fn run_with_source<S: StatusSource + ?Sized>(config: &Config, source: &S) -> Result<RunSummary> {
  info!("loading report {}", config.report_path.display());
  let mut report = Report::load(&config.report_path, &config.columns)?;
  let topic_ids = report.topic_ids();
  info!("found {} unique grammar topics.", topic_ids.len());

  let aggregation = aggregate(source, &topic_ids);
  if !aggregation.failed_topics.is_empty() {
    warn!(
      "{} topic(s) could not be fetched; their videos will not be pruned: {}",
      aggregation.failed_topics.len(),
      aggregation
        .failed_topics
        .iter()
        .map(|(topic, _)| topic.as_str())
        .collect::<Vec<_>>()
        .join(", ")
    );
  }
  let statuses = aggregation.statuses;

  info!("updating report rows...");
  let rows_changed = report.update_statuses(&statuses);
  info!("updated status for {} rows in the report.", rows_changed);
  report.save(&config.report_path)?;

  info!("filtering resource index {}", config.index_path.display());
  let mut index = load_index(&config.index_path)?;
  let removed_resources = prune(&mut index, &statuses);
  save_index(&config.index_path, &index)?;
  info!("removed {} unpublished videos from the index.", removed_resources.len());

  Ok(RunSummary {
    topics: topic_ids.len(),
    failed_topics: aggregation
      .failed_topics
      .into_iter()
      .map(|(topic, _)| topic)
      .collect(),
    partial_topics: aggregation.partial_topics,
    known_videos: statuses.len(),
    rows_changed,
    removed_resources,
  })
}
