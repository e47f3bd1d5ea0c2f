use std::time::Duration;

use anyhow::Context;
use msgs::UNKNOWN_LOCATION;
use serde::Deserialize;

const USER_AGENT: &str = "BusTrackerApp/1.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// Turns a coordinate into a human readable place name.
#[derive(Debug, Clone)]
pub enum Geocoder {
    Nominatim { client: reqwest::Client, base_url: String },
    Disabled,
}

#[derive(Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
}

impl Geocoder {
    pub fn nominatim(base_url: &str) -> anyhow::Result<Geocoder> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("could not build geocoding client")?;
        Ok(Geocoder::Nominatim {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Never fails: any lookup problem yields [`UNKNOWN_LOCATION`].
    pub async fn place_name(&self, lat: f64, lng: f64) -> String {
        let Geocoder::Nominatim { client, base_url } = self else {
            return UNKNOWN_LOCATION.to_string();
        };
        match reverse(client, base_url, lat, lng).await {
            Ok(Some(name)) => name,
            Ok(None) => UNKNOWN_LOCATION.to_string(),
            Err(e) => {
                tracing::warn!("reverse geocoding ({lat}, {lng}) failed: {e:#}");
                UNKNOWN_LOCATION.to_string()
            }
        }
    }
}

async fn reverse(client: &reqwest::Client, base_url: &str, lat: f64, lng: f64) -> anyhow::Result<Option<String>> {
    let response = client
        .get(format!("{base_url}/reverse"))
        .query(&[("lat", lat.to_string()), ("lon", lng.to_string()), ("format", "json".to_string())])
        .send()
        .await?;

    if !response.status().is_success() {
        tracing::debug!("geocoder answered {}", response.status());
        return Ok(None);
    }

    let body = response.json::<ReverseResponse>().await?;
    Ok(body.display_name.filter(|name| !name.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_geocoder_names_nothing() {
        let name = Geocoder::Disabled.place_name(17.6, 78.4).await;
        assert_eq!(name, UNKNOWN_LOCATION);
    }

    #[tokio::test]
    async fn test_unreachable_geocoder_falls_back() {
        let geocoder = Geocoder::nominatim("http://127.0.0.1:9").unwrap();
        assert_eq!(geocoder.place_name(17.6, 78.4).await, UNKNOWN_LOCATION);
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let Geocoder::Nominatim { base_url, .. } = Geocoder::nominatim("https://example.org/").unwrap() else {
            panic!("expected nominatim geocoder")
        };
        assert_eq!(base_url, "https://example.org");
    }
}
