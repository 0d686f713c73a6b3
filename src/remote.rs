use std::str::FromStr;

use log::debug;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;
use crate::error::{Result, SyncError};
use crate::status::{FetchOutcome, StatusSource, VideoStatus};

pub const OPERATION_NAME: &str = "getVideoByGrammar";

const VIDEOS_BY_GRAMMAR_QUERY: &str = r#"
query getVideoByGrammar($id:ID!, $options:OptionCateType,$first: Int, $after: String){
    byGrammarVideoEpic(id:$id, options:$options){
        videos(first: $first, after: $after){
            totalCount
            infos {
                _id
                statusPublished
                title
            }
        }
    }
}
"#;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryBody<'a> {
  query: &'a str,
  variables: QueryVariables<'a>,
  operation_name: &'a str,
}

#[derive(Debug, Serialize)]
struct QueryVariables<'a> {
  id: &'a str,
  options: QueryOptions,
  first: u32,
  after: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryOptions {
  exclusive_feature: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseData {
  by_grammar_video_epic: VideoEpic,
}

#[derive(Debug, Deserialize)]
struct VideoEpic {
  videos: VideoPage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoPage {
  total_count: u64,
  infos: Vec<VideoInfo>,
}

#[derive(Debug, Deserialize)]
struct VideoInfo {
  #[serde(rename = "_id")]
  id: String,
  #[serde(rename = "statusPublished")]
  status_published: Option<bool>,
  #[serde(default)]
  title: Option<String>,
}

/// Asks the remote catalog for the videos of one grammar topic at a time.
pub struct RemoteStatusFetcher {
  client: Client,
  endpoint: String,
  page_size: u32,
}

impl RemoteStatusFetcher {
  pub fn new(config: &Config) -> Result<Self> {
    let client = reqwest::blocking::Client::builder()
      .default_headers(header_map(&config.headers)?)
      .build()?;
    Ok(RemoteStatusFetcher {
      client,
      endpoint: config.endpoint.clone(),
      page_size: config.page_size,
    })
  }

  fn query(&self, topic_id: &str) -> Result<String> {
    let body = QueryBody {
      query: VIDEOS_BY_GRAMMAR_QUERY,
      variables: QueryVariables {
        id: topic_id,
        options: QueryOptions {
          exclusive_feature: false,
        },
        first: self.page_size,
        after: "",
      },
      operation_name: OPERATION_NAME,
    };
    let resp = self.client.post(&self.endpoint).json(&body).send()?;
    let status = resp.status();
    if status != 200 {
      return Err(SyncError::Http(status.as_u16()));
    }
    Ok(resp.text()?)
  }
}

impl StatusSource for RemoteStatusFetcher {
  fn fetch_statuses(&self, topic_id: &str) -> FetchOutcome {
    match self.query(topic_id) {
      Ok(payload) => parse_response(&payload),
      Err(e) => FetchOutcome::Failed(e),
    }
  }
}

fn header_map(headers: &[(String, String)]) -> Result<HeaderMap> {
  let mut map = HeaderMap::new();
  for (name, value) in headers {
    let header_name =
      HeaderName::from_str(name).map_err(|_| SyncError::InvalidHeader(name.clone()))?;
    let header_value =
      HeaderValue::from_str(value).map_err(|_| SyncError::InvalidHeader(name.clone()))?;
    map.insert(header_name, header_value);
  }
  Ok(map)
}

/// Interpret one response body. Never panics; anything unusable becomes `Failed`.
pub fn parse_response(payload: &str) -> FetchOutcome {
  match parse_page(payload) {
    Ok(page) => {
      let returned = page.infos.len() as u64;
      let total_count = page.total_count;
      let videos = page
        .infos
        .into_iter()
        .filter_map(|info| match info.status_published {
          Some(published) => Some(VideoStatus {
            video_id: info.id,
            published,
            title: info.title,
          }),
          None => {
            debug!("video {} has no publication status, skipping.", info.id);
            None
          }
        })
        .collect();
      if returned < total_count {
        FetchOutcome::Partial {
          videos,
          total_count,
        }
      } else {
        FetchOutcome::Complete(videos)
      }
    }
    Err(e) => FetchOutcome::Failed(e),
  }
}

fn parse_page(payload: &str) -> Result<VideoPage> {
  let response: Value =
    serde_json::from_str(payload).map_err(|e| SyncError::Schema(format!("body is not json: {}", e)))?;
  if let Some(errors) = response.get("errors") {
    return Err(SyncError::Api(errors.to_string()));
  }
  let data = response
    .get("data")
    .cloned()
    .ok_or_else(|| SyncError::Schema("missing \"data\"".to_string()))?;
  let data: ResponseData =
    serde_json::from_value(data).map_err(|e| SyncError::Schema(e.to_string()))?;
  Ok(data.by_grammar_video_epic.videos)
}
