use super::plex_api::{endpoints::PAGE_SIZE, models::MediaContainer, PlexClient};
use crate::error::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::de::DeserializeOwned;
use url::Url;

pub fn progress_bar(len: u64) -> ProgressBar {
    let bar_style = ProgressStyle::default_bar()
        .template("[{wide_bar}] {pos}/{len}")
        .map(|s| s.progress_chars("=> "))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    ProgressBar::new(len).with_style(bar_style)
}

/// Cyan heading line, as printed above every report section.
pub fn heading(text: &str) -> String {
    style(text).cyan().to_string()
}

/// Containers without `totalSize` end on the first short page.
fn last_page(fetched: usize, received: u64, total_size: Option<u64>) -> bool {
    match total_size {
        _ if fetched == 0 => true,
        Some(total) => received >= total,
        None => fetched < PAGE_SIZE,
    }
}

impl PlexClient {
    /// Fetches every item behind `endpoint`, one container page at a time.
    pub fn paged_request<T: DeserializeOwned>(&self, endpoint: Url) -> Result<Vec<T>> {
        let mut data: Vec<T> = Vec::new();
        let mut progress: Option<ProgressBar> = None;

        loop {
            let mut url = endpoint.clone();
            url.query_pairs_mut()
                .append_pair("X-Plex-Container-Start", &data.len().to_string())
                .append_pair("X-Plex-Container-Size", &PAGE_SIZE.to_string());

            let page = self.get::<MediaContainer<T>>(url)?;
            let fetched = page.metadata.len();
            data.extend(page.metadata);
            let received = data.len() as u64;

            let total_size = page.total_size;
            let bar =
                progress.get_or_insert_with(|| progress_bar(total_size.unwrap_or(received)));
            if total_size.is_none() {
                bar.set_length(received);
            }
            bar.inc(fetched as u64);

            if last_page(fetched, received, total_size) {
                break;
            }
        }

        if let Some(bar) = progress {
            bar.finish_and_clear();
        }

        Ok(data)
    }
}
