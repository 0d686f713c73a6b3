use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use csv::{StringRecord, Terminator};
use log::debug;

use crate::config::ReportColumns;
use crate::error::{Result, SyncError};
use crate::status::StatusMap;

pub const PUBLISHED: &str = "Yes";
pub const UNPUBLISHED: &str = "No";

/// The lesson report: a header row and every record, in file order.
#[derive(Clone, Debug)]
pub struct Report {
  headers: StringRecord,
  records: Vec<StringRecord>,
  lesson_id_idx: usize,
  topic_id_idx: Option<usize>,
  status_idx: usize,
  /// Rows were separated by `\r\n` in the file we loaded.
  crlf: bool,
}

impl Report {
  pub fn load(path: &Path, columns: &ReportColumns) -> Result<Self> {
    let contents = fs::read_to_string(path)?;
    let crlf = contents
      .find('\n')
      .map_or(false, |end| contents[..end].ends_with('\r'));
    let mut reader = csv::Reader::from_reader(contents.as_bytes());
    let headers = reader.headers()?.clone();
    let records = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;
    Self::from_parts(headers, records, crlf, columns)
  }

  fn from_parts(
    headers: StringRecord,
    records: Vec<StringRecord>,
    crlf: bool,
    columns: &ReportColumns,
  ) -> Result<Self> {
    let position = |name: &str| headers.iter().position(|h| h == name);
    let lesson_id_idx =
      position(&columns.lesson_id).ok_or_else(|| SyncError::MissingColumn(columns.lesson_id.clone()))?;
    let status_idx =
      position(&columns.status).ok_or_else(|| SyncError::MissingColumn(columns.status.clone()))?;
    let topic_id_idx = position(&columns.topic_id);
    Ok(Report {
      headers,
      records,
      lesson_id_idx,
      topic_id_idx,
      status_idx,
      crlf,
    })
  }

  pub fn headers(&self) -> &StringRecord {
    &self.headers
  }

  pub fn records(&self) -> &[StringRecord] {
    &self.records
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  /// Distinct non-empty topic ids.
  pub fn topic_ids(&self) -> BTreeSet<String> {
    let idx = match self.topic_id_idx {
      Some(idx) => idx,
      None => return BTreeSet::new(),
    };
    self
      .records
      .iter()
      .filter_map(|record| record.get(idx))
      .filter(|id| !id.is_empty())
      .map(String::from)
      .collect()
  }

  /// Rewrite the status of every lesson the map knows about.
  /// Returns how many records actually changed.
  pub fn update_statuses(&mut self, statuses: &StatusMap) -> usize {
    let mut changed = 0;
    for record in self.records.iter_mut() {
      let lesson_id = match record.get(self.lesson_id_idx) {
        Some(id) => id,
        None => continue,
      };
      let new_status = match statuses.published(lesson_id) {
        Some(true) => PUBLISHED,
        Some(false) => UNPUBLISHED,
        None => continue,
      };
      if record.get(self.status_idx) != Some(new_status) {
        debug!(
          "changing {} from {:?} to {}",
          lesson_id,
          record.get(self.status_idx).unwrap_or_default(),
          new_status
        );
        *record = with_field(record, self.status_idx, new_status);
        changed += 1;
      }
    }
    changed
  }

  /// Write every row back with the line endings the file was loaded with.
  pub fn save(&self, path: &Path) -> Result<()> {
    let terminator = if self.crlf {
      Terminator::CRLF
    } else {
      Terminator::Any(b'\n')
    };
    let mut writer = csv::WriterBuilder::new()
      .terminator(terminator)
      .from_path(path)?;
    writer.write_record(&self.headers)?;
    for record in &self.records {
      writer.write_record(record)?;
    }
    writer.flush()?;
    Ok(())
  }
}

fn with_field(record: &StringRecord, idx: usize, value: &str) -> StringRecord {
  record
    .iter()
    .enumerate()
    .map(|(i, field)| if i == idx { value } else { field })
    .collect()
}
