use crate::error::{Error, Result};
use crate::media::{Album, Artist, MediaLibrary, Playlist, PlaylistStore, Section, Track};
use itertools::Itertools;
use models::{
    AlbumMetadata, ArtistMetadata, IdentityContainer, ItemMetadata, MediaContainer,
    PlaylistMetadata, Response, SectionContainer, TrackMetadata,
};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use url::Url;

pub mod endpoints {
    pub const IDENTITY: &str = "identity";
    pub const SECTIONS: &str = "library/sections";
    pub const METADATA: &str = "library/metadata";
    pub const PLAYLISTS: &str = "playlists";

    pub const ARTIST_TYPE: u8 = 8;
    pub const ALBUM_TYPE: u8 = 9;
    pub const TRACK_TYPE: u8 = 10;

    pub const PAGE_SIZE: usize = 500;

    pub fn section_items(section_key: &str) -> String {
        format!("{}/{}/all", SECTIONS, section_key)
    }

    pub fn metadata(rating_key: u64) -> String {
        format!("{}/{}", METADATA, rating_key)
    }

    pub fn playlist(rating_key: u64) -> String {
        format!("{}/{}", PLAYLISTS, rating_key)
    }

    pub fn playlist_items(rating_key: u64) -> String {
        format!("{}/{}/items", PLAYLISTS, rating_key)
    }

    pub fn library_uri(machine_identifier: &str, rating_keys: &str) -> String {
        format!(
            "server://{}/com.plexapp.plugins.library/{}/{}",
            machine_identifier, METADATA, rating_keys
        )
    }
}

pub mod models {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize, Debug)]
    pub struct Response<T> {
        #[serde(rename = "MediaContainer")]
        pub media_container: T,
    }

    #[derive(Deserialize, Debug)]
    #[serde(bound(deserialize = "T: Deserialize<'de>"))]
    pub struct MediaContainer<T> {
        #[serde(default)]
        pub size: u64,
        #[serde(rename = "totalSize")]
        pub total_size: Option<u64>,
        #[serde(rename = "Metadata", default)]
        pub metadata: Vec<T>,
    }

    #[derive(Deserialize, Debug)]
    pub struct IdentityContainer {
        #[serde(rename = "machineIdentifier")]
        pub machine_identifier: String,
    }

    #[derive(Deserialize, Debug)]
    pub struct SectionContainer {
        #[serde(rename = "Directory", default)]
        pub directories: Vec<Directory>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Directory {
        pub key: String,
        pub title: String,
    }

    #[derive(Deserialize, Debug)]
    pub struct Tag {
        pub tag: String,
    }

    #[derive(Deserialize, Debug)]
    pub struct ArtistMetadata {
        #[serde(rename = "ratingKey", deserialize_with = "rating_key")]
        pub rating_key: u64,
        pub title: String,
        #[serde(rename = "titleSort")]
        pub title_sort: Option<String>,
    }

    #[derive(Deserialize, Debug)]
    pub struct AlbumMetadata {
        #[serde(rename = "ratingKey", deserialize_with = "rating_key")]
        pub rating_key: u64,
        pub title: String,
        #[serde(rename = "titleSort")]
        pub title_sort: Option<String>,
        #[serde(rename = "parentRatingKey", deserialize_with = "rating_key")]
        pub parent_rating_key: u64,
        #[serde(rename = "parentTitle", default)]
        pub parent_title: String,
        #[serde(rename = "Genre", default)]
        pub genres: Vec<Tag>,
        #[serde(rename = "Style", default)]
        pub styles: Vec<Tag>,
        #[serde(rename = "Format", default)]
        pub formats: Vec<Tag>,
    }

    #[derive(Deserialize, Debug)]
    pub struct TrackMetadata {
        #[serde(rename = "ratingKey", deserialize_with = "rating_key")]
        pub rating_key: u64,
        #[serde(default)]
        pub title: String,
        #[serde(rename = "parentRatingKey", deserialize_with = "rating_key")]
        pub parent_rating_key: u64,
        #[serde(rename = "parentTitle", default)]
        pub parent_title: String,
        #[serde(rename = "grandparentRatingKey", deserialize_with = "rating_key")]
        pub grandparent_rating_key: u64,
        #[serde(rename = "grandparentTitle", default)]
        pub grandparent_title: String,
        #[serde(rename = "userRating")]
        pub user_rating: Option<f64>,
    }

    #[derive(Deserialize, Debug)]
    pub struct ItemMetadata {
        pub title: String,
        #[serde(rename = "titleSort")]
        pub title_sort: Option<String>,
    }

    #[derive(Deserialize, Debug)]
    pub struct PlaylistMetadata {
        #[serde(rename = "ratingKey", deserialize_with = "rating_key")]
        pub rating_key: u64,
        pub title: String,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }

    /// Plex sends rating keys as strings, older servers as numbers.
    pub fn rating_key<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match NumberOrString::deserialize(deserializer)? {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::String(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

impl From<ArtistMetadata> for Artist {
    fn from(m: ArtistMetadata) -> Artist {
        Artist {
            rating_key: m.rating_key,
            title_sort: m.title_sort.unwrap_or_else(|| m.title.clone()),
            title: m.title,
        }
    }
}

impl From<AlbumMetadata> for Album {
    fn from(m: AlbumMetadata) -> Album {
        Album {
            rating_key: m.rating_key,
            title_sort: m.title_sort.unwrap_or_else(|| m.title.clone()),
            title: m.title,
            artist_key: m.parent_rating_key,
            artist_title: m.parent_title,
            genres: m.genres.into_iter().map(|t| t.tag).collect(),
            styles: m.styles.into_iter().map(|t| t.tag).collect(),
            formats: m.formats.into_iter().map(|t| t.tag).collect(),
        }
    }
}

impl From<TrackMetadata> for Track {
    fn from(m: TrackMetadata) -> Track {
        Track {
            rating_key: m.rating_key,
            title: m.title,
            album_key: m.parent_rating_key,
            album_title: m.parent_title,
            artist_key: m.grandparent_rating_key,
            artist_title: m.grandparent_title,
            user_rating: m.user_rating,
        }
    }
}

impl From<PlaylistMetadata> for Playlist {
    fn from(m: PlaylistMetadata) -> Playlist {
        Playlist {
            rating_key: m.rating_key,
            title: m.title,
        }
    }
}

/// Plex Media Server over its JSON HTTP API.
pub struct PlexClient {
    client: Client,
    base_url: Url,
}

impl PlexClient {
    pub fn new(client: Client, base_url: Url) -> PlexClient {
        PlexClient { client, base_url }
    }

    pub(super) fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|_| Error::InvalidAddress(format!("{}{}", self.base_url, path)))
    }

    pub(super) fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        log::debug!("GET {}", url.path());
        let resp = self
            .client
            .get(url)
            .send()?
            .error_for_status()?
            .json::<Response<T>>()?;
        Ok(resp.media_container)
    }

    fn section_items<T: DeserializeOwned>(&self, section: &Section, kind: u8) -> Result<Vec<T>> {
        let mut url = self.url(&endpoints::section_items(&section.key))?;
        url.query_pairs_mut().append_pair("type", &kind.to_string());
        self.paged_request(url)
    }

    fn machine_identifier(&self) -> Result<String> {
        let identity = self.get::<IdentityContainer>(self.url(endpoints::IDENTITY)?)?;
        Ok(identity.machine_identifier)
    }
}

impl MediaLibrary for PlexClient {
    fn section(&self, name: &str) -> Result<Section> {
        let sections = self.get::<SectionContainer>(self.url(endpoints::SECTIONS)?)?;
        sections
            .directories
            .into_iter()
            .find(|d| d.title == name)
            .map(|d| Section {
                key: d.key,
                title: d.title,
            })
            .ok_or_else(|| Error::SectionNotFound(name.to_string()))
    }

    fn artists(&self, section: &Section) -> Result<Vec<Artist>> {
        let artists = self.section_items::<ArtistMetadata>(section, endpoints::ARTIST_TYPE)?;
        Ok(artists.into_iter().map(Artist::from).collect())
    }

    fn albums(&self, section: &Section) -> Result<Vec<Album>> {
        let albums = self.section_items::<AlbumMetadata>(section, endpoints::ALBUM_TYPE)?;
        Ok(albums.into_iter().map(Album::from).collect())
    }

    fn tracks(&self, section: &Section) -> Result<Vec<Track>> {
        let tracks = self.section_items::<TrackMetadata>(section, endpoints::TRACK_TYPE)?;
        Ok(tracks.into_iter().map(Track::from).collect())
    }

    fn sort_title(&self, rating_key: u64) -> Result<String> {
        let container =
            self.get::<MediaContainer<ItemMetadata>>(self.url(&endpoints::metadata(rating_key))?)?;
        let item = container
            .metadata
            .into_iter()
            .next()
            .ok_or(Error::ItemNotFound(rating_key))?;
        Ok(item.title_sort.unwrap_or(item.title))
    }
}

impl PlaylistStore for PlexClient {
    fn playlist(&self, title: &str) -> Result<Playlist> {
        let mut url = self.url(endpoints::PLAYLISTS)?;
        url.query_pairs_mut()
            .append_pair("playlistType", "audio")
            .append_pair("title", title);
        let container = self.get::<MediaContainer<PlaylistMetadata>>(url)?;
        container
            .metadata
            .into_iter()
            .find(|p| p.title == title)
            .map(Playlist::from)
            .ok_or_else(|| Error::PlaylistNotFound(title.to_string()))
    }

    fn playlist_items(&self, playlist: &Playlist) -> Result<Vec<Track>> {
        let url = self.url(&endpoints::playlist_items(playlist.rating_key))?;
        let items = self.paged_request::<TrackMetadata>(url)?;
        Ok(items.into_iter().map(Track::from).collect())
    }

    fn delete_playlist(&self, playlist: &Playlist) -> Result<()> {
        let url = self.url(&endpoints::playlist(playlist.rating_key))?;
        log::debug!("DELETE {}", url.path());
        self.client.delete(url).send()?.error_for_status()?;
        Ok(())
    }

    fn create_playlist(&self, title: &str, items: &[Track]) -> Result<Playlist> {
        let rating_keys = items.iter().map(|t| t.rating_key).join(",");
        let uri = endpoints::library_uri(&self.machine_identifier()?, &rating_keys);

        let mut url = self.url(endpoints::PLAYLISTS)?;
        url.query_pairs_mut()
            .append_pair("type", "audio")
            .append_pair("title", title)
            .append_pair("smart", "0")
            .append_pair("uri", &uri);
        log::debug!("POST {}", url.path());

        let container = self
            .client
            .post(url)
            .send()?
            .error_for_status()?
            .json::<Response<MediaContainer<PlaylistMetadata>>>()?
            .media_container;
        container
            .metadata
            .into_iter()
            .next()
            .map(Playlist::from)
            .ok_or_else(|| Error::PlaylistNotFound(title.to_string()))
    }
}
