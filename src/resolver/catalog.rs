//! Spotify Web API catalog: track search, artist top tracks and albums.
//!
//! Authentication uses the client-credentials flow; the bearer token is kept
//! until shortly before it expires.

use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::types::ResolveError;
use crate::config::CatalogSettings;
use crate::descriptor;

/// Renew tokens this long before Spotify says they expire.
const TOKEN_SLACK: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct Artist {
    #[serde(default)]
    id: Option<String>,
    name: String,
}

#[derive(Debug, Deserialize)]
struct Track {
    name: String,
    #[serde(default)]
    artists: Vec<Artist>,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct TrackSearch {
    tracks: Page<Track>,
}

#[derive(Debug, Deserialize)]
struct Album {
    id: String,
}

#[derive(Debug, Deserialize)]
struct AlbumSearch {
    albums: Page<Album>,
}

#[derive(Debug, Deserialize)]
struct TopTracks {
    #[serde(default)]
    tracks: Vec<Track>,
}

fn track_descriptor(track: &Track) -> String {
    let artists: Vec<&str> = track.artists.iter().map(|a| a.name.as_str()).collect();
    descriptor::format(&track.name, &artists)
}

/// Format search hits as `"<n>. <name> by <artist1>, <artist2>"`.
fn numbered_descriptors(tracks: &[Track]) -> Vec<String> {
    let plain: Vec<String> = tracks.iter().map(track_descriptor).collect();
    descriptor::numbered(&plain)
}

pub struct SpotifyCatalog {
    client: Client,
    settings: CatalogSettings,
    token: Option<(String, Instant)>,
}

impl SpotifyCatalog {
    pub fn new(settings: CatalogSettings) -> Result<Self, ResolveError> {
        let client = Client::builder()
            .user_agent(concat!("reprise/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()
            .map_err(|e| ResolveError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            settings,
            token: None,
        })
    }

    fn token(&mut self) -> Result<String, ResolveError> {
        if let Some((token, expires)) = &self.token {
            if Instant::now() < *expires {
                return Ok(token.clone());
            }
        }

        let (Some(id), Some(secret)) = (&self.settings.client_id, &self.settings.client_secret)
        else {
            return Err(ResolveError::Unavailable(
                "Spotify credentials missing: set SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET"
                    .to_string(),
            ));
        };

        let resp: TokenResponse = self
            .client
            .post(&self.settings.token_url)
            .basic_auth(id, Some(secret))
            .form(&[("grant_type", "client_credentials")])
            .send()?
            .error_for_status()?
            .json()?;

        info!(expires_in = resp.expires_in, "obtained catalog token");
        let expires = Instant::now() + Duration::from_secs(resp.expires_in).saturating_sub(TOKEN_SLACK);
        self.token = Some((resp.access_token.clone(), expires));
        Ok(resp.access_token)
    }

    fn get<T: for<'de> Deserialize<'de>>(
        &mut self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ResolveError> {
        let token = self.token()?;
        let url = format!("{}{}", self.settings.api_url.trim_end_matches('/'), path);
        debug!(%url, "catalog request");
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .query(query)
            .send()?;

        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            // Token revoked early; the next call fetches a fresh one.
            self.token = None;
        }
        Ok(resp.error_for_status()?.json()?)
    }

    fn search_tracks(&mut self, query: &str, limit: u8) -> Result<Vec<Track>, ResolveError> {
        let limit = limit.to_string();
        let found: TrackSearch =
            self.get("/search", &[("q", query), ("type", "track"), ("limit", &limit)])?;
        Ok(found.tracks.items)
    }

    /// Numbered descriptors of the tracks matching `query`.
    pub fn search(&mut self, query: &str) -> Result<Vec<String>, ResolveError> {
        let limit = self.settings.search_limit;
        let tracks = self.search_tracks(query, limit)?;
        if tracks.is_empty() {
            return Err(ResolveError::NotFound(query.to_string()));
        }
        Ok(numbered_descriptors(&tracks))
    }

    /// Top tracks of the first artist of the best match for `descriptor`.
    pub fn similar(&mut self, descriptor: &str) -> Result<Vec<String>, ResolveError> {
        let query = descriptor::clean(descriptor).replacen(descriptor::SEPARATOR, " ", 1);
        let tracks = self.search_tracks(&query, 1)?;
        let artist_id = tracks
            .first()
            .and_then(|t| t.artists.first())
            .and_then(|a| a.id.clone())
            .ok_or_else(|| ResolveError::NotFound(descriptor.to_string()))?;

        let market = self.settings.market.clone();
        let top: TopTracks = self.get(
            &format!("/artists/{artist_id}/top-tracks"),
            &[("market", market.as_str())],
        )?;
        Ok(top.tracks.iter().map(track_descriptor).collect())
    }

    /// Tracks of the best-matching album, in album order.
    pub fn album(&mut self, query: &str) -> Result<Vec<String>, ResolveError> {
        let found: AlbumSearch =
            self.get("/search", &[("q", query), ("type", "album"), ("limit", "1")])?;
        let album = found
            .albums
            .items
            .first()
            .ok_or_else(|| ResolveError::NotFound(query.to_string()))?;

        let path = format!("/albums/{}/tracks", album.id);
        let tracks: Page<Track> = self.get(&path, &[("limit", "50")])?;
        if tracks.items.is_empty() {
            return Err(ResolveError::NotFound(query.to_string()));
        }
        Ok(tracks.items.iter().map(track_descriptor).collect())
    }
}

#[cfg(test)]
pub(super) fn parse_search(json: &str) -> Vec<String> {
    let found: TrackSearch = serde_json::from_str(json).unwrap();
    numbered_descriptors(&found.tracks.items)
}

#[cfg(test)]
pub(super) fn parse_top_tracks(json: &str) -> Vec<String> {
    let top: TopTracks = serde_json::from_str(json).unwrap();
    top.tracks.iter().map(track_descriptor).collect()
}
