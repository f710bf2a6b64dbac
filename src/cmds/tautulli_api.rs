use crate::error::{Error, Result};
use crate::media::{HistoryQuery, PlayHistory, PlayRecord, Section, WatchTimeStats};
use models::{Envelope, HistoryPage, HistoryRow, WatchTimeRow};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use url::Url;

pub mod endpoints {
    pub const API: &str = "api/v2";

    pub const GET_HISTORY: &str = "get_history";
    pub const GET_LIBRARY_WATCH_TIME_STATS: &str = "get_library_watch_time_stats";

    /// Tautulli pages history by `length`; ask for everything at once.
    pub const HISTORY_LENGTH: i64 = i64::MAX;
}

pub mod models {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize, Debug)]
    pub struct Envelope<T> {
        pub response: Body<T>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Body<T> {
        pub result: String,
        pub message: Option<String>,
        pub data: Option<T>,
    }

    #[derive(Deserialize, Debug)]
    pub struct HistoryPage {
        #[serde(rename = "recordsFiltered", default)]
        pub records_filtered: u64,
        #[serde(default)]
        pub data: Vec<HistoryRow>,
    }

    #[derive(Deserialize, Debug)]
    pub struct HistoryRow {
        #[serde(default, deserialize_with = "rating_key")]
        pub rating_key: u64,
        pub watched_status: Option<f64>,
        pub title: Option<String>,
        pub full_title: Option<String>,
        pub parent_title: Option<String>,
        pub grandparent_title: Option<String>,
        pub original_title: Option<String>,
    }

    #[derive(Deserialize, Debug)]
    pub struct WatchTimeRow {
        pub query_days: u32,
        #[serde(default)]
        pub total_time: Option<u64>,
        #[serde(default)]
        pub total_plays: Option<u64>,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }

    /// Rows for deleted items carry an empty rating key; those map to 0.
    pub fn rating_key<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match Option::<NumberOrString>::deserialize(deserializer)? {
            Some(NumberOrString::Number(n)) => Ok(n),
            Some(NumberOrString::String(s)) if s.is_empty() => Ok(0),
            Some(NumberOrString::String(s)) => s.parse().map_err(serde::de::Error::custom),
            None => Ok(0),
        }
    }
}

impl From<HistoryRow> for PlayRecord {
    fn from(row: HistoryRow) -> PlayRecord {
        PlayRecord {
            rating_key: row.rating_key,
            watched_status: row.watched_status.unwrap_or(0.0),
            title: row.title.unwrap_or_default(),
            full_title: row.full_title.unwrap_or_default(),
            parent_title: row.parent_title.unwrap_or_default(),
            grandparent_title: row.grandparent_title.unwrap_or_default(),
            original_title: row.original_title.unwrap_or_default(),
        }
    }
}

impl From<WatchTimeRow> for WatchTimeStats {
    fn from(row: WatchTimeRow) -> WatchTimeStats {
        WatchTimeStats {
            query_days: row.query_days,
            total_time: row.total_time.unwrap_or(0),
            total_plays: row.total_plays.unwrap_or(0),
        }
    }
}

/// Tautulli's `api/v2` endpoint.
pub struct TautulliClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl TautulliClient {
    pub fn new(client: Client, base_url: Url, api_key: String) -> TautulliClient {
        TautulliClient {
            client,
            base_url,
            api_key,
        }
    }

    fn request<T: DeserializeOwned>(&self, cmd: &str, params: &[(&str, String)]) -> Result<T> {
        let mut url = self
            .base_url
            .join(endpoints::API)
            .map_err(|_| Error::InvalidAddress(self.base_url.to_string()))?;
        url.query_pairs_mut()
            .append_pair("apikey", &self.api_key)
            .append_pair("cmd", cmd)
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        log::debug!("Tautulli {}", cmd);

        let envelope = self
            .client
            .get(url)
            .send()?
            .error_for_status()?
            .json::<Envelope<T>>()?;
        unwrap_envelope(cmd, envelope)
    }
}

fn unwrap_envelope<T>(cmd: &str, envelope: Envelope<T>) -> Result<T> {
    let body = envelope.response;
    if body.result != "success" {
        return Err(Error::Tautulli {
            cmd: cmd.to_string(),
            message: body.message.unwrap_or(body.result),
        });
    }
    body.data.ok_or_else(|| Error::EmptyResponse(cmd.to_string()))
}

impl PlayHistory for TautulliClient {
    fn history(&self, query: &HistoryQuery<'_>) -> Result<Vec<PlayRecord>> {
        let page = self.request::<HistoryPage>(
            endpoints::GET_HISTORY,
            &[
                ("user", query.user.to_string()),
                ("after", query.after.format("%Y-%m-%d").to_string()),
                ("media_type", "track".to_string()),
                ("length", endpoints::HISTORY_LENGTH.to_string()),
                ("section_id", query.section.key.clone()),
            ],
        )?;
        log::debug!("{} history records matched", page.records_filtered);
        Ok(page.data.into_iter().map(PlayRecord::from).collect())
    }

    fn watch_time_stats(&self, section: &Section, query_days: u32) -> Result<WatchTimeStats> {
        let rows = self.request::<Vec<WatchTimeRow>>(
            endpoints::GET_LIBRARY_WATCH_TIME_STATS,
            &[
                ("section_id", section.key.clone()),
                ("query_days", query_days.to_string()),
            ],
        )?;
        rows.into_iter()
            .next()
            .map(WatchTimeStats::from)
            .ok_or_else(|| Error::EmptyResponse(endpoints::GET_LIBRARY_WATCH_TIME_STATS.to_string()))
    }
}
