use crate::cmds::plex_api::PlexClient;
use crate::cmds::tautulli_api::TautulliClient;
use crate::error::{Error, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use url::Url;

const LOCALHOST: &str = "localhost";
const PLEX_PORT: u16 = 32400;
const TAUTULLI_PORT: u16 = 8181;

/// Where the Plex and Tautulli servers run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerTarget {
    Local,
    Remote(String),
}

impl ServerTarget {
    pub fn from_flags(local: bool, host: Option<&str>) -> Result<ServerTarget> {
        match (local, host.filter(|h| !h.is_empty())) {
            (true, _) => Ok(ServerTarget::Local),
            (false, Some(host)) => Ok(ServerTarget::Remote(host.to_string())),
            (false, None) => Err(Error::MissingHost),
        }
    }

    /// Plex listens on plain HTTP locally and on HTTPS remotely.
    pub fn plex_url(&self) -> Result<Url> {
        match self {
            ServerTarget::Local => parse_url(&format!("http://{}:{}", LOCALHOST, PLEX_PORT)),
            ServerTarget::Remote(host) => parse_url(&format!("https://{}:{}", host, PLEX_PORT)),
        }
    }

    pub fn tautulli_url(&self) -> Result<Url> {
        let host = match self {
            ServerTarget::Local => LOCALHOST,
            ServerTarget::Remote(host) => host,
        };
        parse_url(&format!("https://{}:{}", host, TAUTULLI_PORT))
    }
}

fn parse_url(address: &str) -> Result<Url> {
    Url::parse(address).map_err(|_| Error::InvalidAddress(address.to_string()))
}

/// Both servers usually run with self-signed certificates, so certificate
/// checks are off.
fn http_client(mut headers: HeaderMap) -> Result<Client> {
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    let client = Client::builder()
        .default_headers(headers)
        .danger_accept_invalid_certs(true)
        .build()?;
    Ok(client)
}

pub fn plex_session(api_key: &str, target: &ServerTarget) -> Result<PlexClient> {
    let base_url = target.plex_url()?;
    log::debug!("Opening Plex session at {}", base_url);

    let mut headers = HeaderMap::new();
    headers.insert(
        "X-Plex-Token",
        HeaderValue::from_str(api_key).map_err(|_| Error::InvalidApiKey)?,
    );
    Ok(PlexClient::new(http_client(headers)?, base_url))
}

pub fn tautulli_session(api_key: &str, target: &ServerTarget) -> Result<TautulliClient> {
    let base_url = target.tautulli_url()?;
    log::debug!("Opening Tautulli session at {}", base_url);

    Ok(TautulliClient::new(
        http_client(HeaderMap::new())?,
        base_url,
        api_key.to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_without_host_fails_fast() {
        assert!(matches!(
            ServerTarget::from_flags(false, None),
            Err(Error::MissingHost)
        ));
        assert!(matches!(
            ServerTarget::from_flags(false, Some("")),
            Err(Error::MissingHost)
        ));
    }

    #[test]
    fn local_flag_wins_over_host() {
        assert_eq!(
            ServerTarget::from_flags(true, Some("media.example.org")).unwrap(),
            ServerTarget::Local
        );
    }

    #[test]
    fn base_urls() {
        let local = ServerTarget::Local;
        assert_eq!(local.plex_url().unwrap().as_str(), "http://localhost:32400/");
        assert_eq!(local.tautulli_url().unwrap().as_str(), "https://localhost:8181/");

        let remote = ServerTarget::from_flags(false, Some("media.example.org")).unwrap();
        assert_eq!(
            remote.plex_url().unwrap().as_str(),
            "https://media.example.org:32400/"
        );
        assert_eq!(
            remote.tautulli_url().unwrap().as_str(),
            "https://media.example.org:8181/"
        );
    }
}
