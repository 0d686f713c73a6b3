/// Meant to be ran by hand (or from cron) whenever videos get (un)published upstream.
///
/// Paths and endpoint come from `publish_sync::config`, overridable via `PUBLISH_SYNC_*`.
use std::error::Error;
use std::result::Result;
use std::time::Instant;

use env_logger::Env;
use log::info;

use publish_sync::config::Config;
use publish_sync::job::run;

pub fn main() -> Result<(), Box<dyn Error>> {
  env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
  let start_time = Instant::now();
  let config = Config::from_env();
  let summary = run(&config)?;
  info!(
    "-- Done: {} topics ({} failed, {} partial), {} known video ids, {} rows changed, {} resources removed in {} sec.",
    summary.topics,
    summary.failed_topics.len(),
    summary.partial_topics.len(),
    summary.known_videos,
    summary.rows_changed,
    summary.removed_resources.len(),
    (Instant::now() - start_time).as_secs()
  );
  Ok(())
}
