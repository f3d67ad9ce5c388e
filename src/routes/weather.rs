//! Current weather (GET /api/weather)
//!
//! Reads OpenWeatherMap when an API key is configured and wttr.in otherwise.
//! Both are normalized into the same [`Weather`] shape.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Response,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{policy::WEATHER, respond, AppState, ClientIdentity};
use crate::error::{ApiError, Result};
use crate::models::requests::{or_default, required};
use crate::models::WeatherQuery;
use crate::routes::query_params;
use crate::upstream::{UpstreamClient, UpstreamError};

const UNAVAILABLE: &str = "Weather service unavailable";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Weather {
    pub location: Location,
    pub current: Conditions,
    pub units: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub name: String,
    pub country: String,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conditions {
    pub temperature: i64,
    pub feels_like: i64,
    pub humidity: i64,
    pub pressure: i64,
    pub condition: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub wind: Wind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wind {
    pub speed: f64,
    pub direction: Option<String>,
}

/// Handler for GET /api/weather
pub async fn weather_handler(
    State(state): State<AppState>,
    ClientIdentity(identity): ClientIdentity,
    query: std::result::Result<Query<WeatherQuery>, QueryRejection>,
) -> Response {
    let result = weather(&state, &identity, query).await;
    respond(&WEATHER, &identity, result)
}

async fn weather(
    state: &AppState,
    identity: &str,
    query: std::result::Result<Query<WeatherQuery>, QueryRejection>,
) -> Result<Value> {
    state.check_rate(&WEATHER, identity).await?;
    let query = query_params(query)?;

    let city = required(&query.city, "City parameter is required")?;
    let units = or_default(&query.units, "metric").to_ascii_lowercase();

    let key = format!("{}:{units}", city.to_lowercase());
    state
        .cached(&WEATHER, &key, || async {
            let weather = fetch_weather(&state.upstream, city, &units)
                .await
                .map_err(|e| ApiError::upstream(UNAVAILABLE, e))?;
            serde_json::to_value(weather).map_err(|e| ApiError::internal(UNAVAILABLE, e.to_string()))
        })
        .await
}

/// Fetches current conditions for `city` from whichever provider is configured.
pub async fn fetch_weather(
    upstream: &UpstreamClient,
    city: &str,
    units: &str,
) -> std::result::Result<Weather, UpstreamError> {
    match upstream.config().openweather_api_key.as_deref() {
        Some(api_key) => fetch_openweather(upstream, city, units, api_key).await,
        None => fetch_wttr(upstream, city, units).await,
    }
}

fn unit_label(units: &str) -> &'static str {
    match units {
        "metric" => "°C",
        "standard" => "K",
        _ => "°F",
    }
}

// == OpenWeatherMap ==

#[derive(Debug, Deserialize)]
struct OwResponse {
    name: String,
    coord: OwCoord,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: i64,
    pressure: i64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    deg: Option<f64>,
}

async fn fetch_openweather(
    upstream: &UpstreamClient,
    city: &str,
    units: &str,
    api_key: &str,
) -> std::result::Result<Weather, UpstreamError> {
    let url = format!("{}/weather", upstream.config().openweather_base_url);
    let data: OwResponse = upstream
        .get_json(&url, &[("q", city), ("appid", api_key), ("units", units)])
        .await?;

    let summary = data
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| UpstreamError::Parse("empty weather list".to_string()))?;

    Ok(Weather {
        location: Location {
            name: data.name,
            country: data.sys.country,
            coordinates: Coordinates {
                lat: data.coord.lat,
                lon: data.coord.lon,
            },
        },
        current: Conditions {
            temperature: data.main.temp.round() as i64,
            feels_like: data.main.feels_like.round() as i64,
            humidity: data.main.humidity,
            pressure: data.main.pressure,
            condition: summary.main,
            description: summary.description,
            icon: Some(format!(
                "https://openweathermap.org/img/wn/{}@2x.png",
                summary.icon
            )),
            wind: Wind {
                speed: data.wind.speed,
                direction: data.wind.deg.map(|deg| format!("{deg}°")),
            },
        },
        units: unit_label(units),
    })
}

// == wttr.in ==

/// wttr.in's j1 format reports every number as a string.
#[derive(Debug, Deserialize)]
struct WttrResponse {
    current_condition: Vec<WttrCurrent>,
    nearest_area: Vec<WttrArea>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WttrCurrent {
    #[serde(rename = "temp_C")]
    temp_c: String,
    #[serde(rename = "temp_F")]
    temp_f: String,
    #[serde(rename = "FeelsLikeC")]
    feels_like_c: String,
    #[serde(rename = "FeelsLikeF")]
    feels_like_f: String,
    humidity: String,
    pressure: String,
    weather_desc: Vec<WttrValue>,
    windspeed_kmph: String,
    windspeed_miles: String,
    #[serde(rename = "winddir16Point")]
    winddir_16_point: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WttrArea {
    country: Vec<WttrValue>,
    latitude: String,
    longitude: String,
}

#[derive(Debug, Deserialize)]
struct WttrValue {
    value: String,
}

fn number<T: std::str::FromStr>(field: &str, raw: &str) -> std::result::Result<T, UpstreamError> {
    raw.trim()
        .parse()
        .map_err(|_| UpstreamError::Parse(format!("{field}: {raw:?}")))
}

async fn fetch_wttr(
    upstream: &UpstreamClient,
    city: &str,
    units: &str,
) -> std::result::Result<Weather, UpstreamError> {
    let url = format!(
        "{}/{}",
        upstream.config().wttr_base_url.trim_end_matches('/'),
        url::form_urlencoded::byte_serialize(city.as_bytes()).collect::<String>()
    );
    let data: WttrResponse = upstream.get_json(&url, &[("format", "j1")]).await?;

    let current = data
        .current_condition
        .into_iter()
        .next()
        .ok_or_else(|| UpstreamError::Parse("missing current_condition".to_string()))?;
    let area = data
        .nearest_area
        .into_iter()
        .next()
        .ok_or_else(|| UpstreamError::Parse("missing nearest_area".to_string()))?;

    let imperial = units == "imperial";
    let (temp, feels, wind) = if imperial {
        (&current.temp_f, &current.feels_like_f, &current.windspeed_miles)
    } else {
        (&current.temp_c, &current.feels_like_c, &current.windspeed_kmph)
    };
    let description = current
        .weather_desc
        .first()
        .map(|d| d.value.clone())
        .unwrap_or_default();

    Ok(Weather {
        location: Location {
            name: city.to_string(),
            country: area
                .country
                .first()
                .map(|c| c.value.clone())
                .unwrap_or_default(),
            coordinates: Coordinates {
                lat: number("latitude", &area.latitude)?,
                lon: number("longitude", &area.longitude)?,
            },
        },
        current: Conditions {
            temperature: number("temperature", temp)?,
            feels_like: number("feels_like", feels)?,
            humidity: number("humidity", &current.humidity)?,
            pressure: number("pressure", &current.pressure)?,
            condition: description.clone(),
            description,
            icon: None,
            wind: Wind {
                speed: number("wind", wind)?,
                direction: current.winddir_16_point,
            },
        },
        units: if imperial { "°F" } else { "°C" },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::UpstreamConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn wttr_body() -> Value {
        json!({
            "current_condition": [{
                "temp_C": "18",
                "temp_F": "64",
                "FeelsLikeC": "17",
                "FeelsLikeF": "63",
                "humidity": "72",
                "pressure": "1015",
                "weatherDesc": [{"value": "Partly cloudy"}],
                "windspeedKmph": "11",
                "windspeedMiles": "7",
                "winddir16Point": "WSW"
            }],
            "nearest_area": [{
                "country": [{"value": "France"}],
                "latitude": "48.867",
                "longitude": "2.333"
            }]
        })
    }

    #[tokio::test]
    async fn test_wttr_without_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Paris"))
            .and(query_param("format", "j1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(wttr_body()))
            .mount(&server)
            .await;

        let client = UpstreamClient::new(UpstreamConfig {
            wttr_base_url: server.uri(),
            ..UpstreamConfig::default()
        })
        .unwrap();
        let weather = fetch_weather(&client, "Paris", "metric").await.unwrap();

        assert_eq!(weather.location.name, "Paris");
        assert_eq!(weather.location.country, "France");
        assert_eq!(weather.current.temperature, 18);
        assert_eq!(weather.current.description, "Partly cloudy");
        assert_eq!(weather.current.wind.direction.as_deref(), Some("WSW"));
        assert_eq!(weather.units, "°C");
    }

    #[tokio::test]
    async fn test_wttr_imperial_reads_fahrenheit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(wttr_body()))
            .mount(&server)
            .await;

        let client = UpstreamClient::new(UpstreamConfig {
            wttr_base_url: server.uri(),
            ..UpstreamConfig::default()
        })
        .unwrap();
        let weather = fetch_weather(&client, "Paris", "imperial").await.unwrap();

        assert_eq!(weather.current.temperature, 64);
        assert_eq!(weather.current.wind.speed, 7.0);
        assert_eq!(weather.units, "°F");
    }

    #[tokio::test]
    async fn test_openweather_with_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "London"))
            .and(query_param("appid", "secret"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "London",
                "coord": {"lat": 51.51, "lon": -0.13},
                "sys": {"country": "GB"},
                "main": {"temp": 11.6, "feels_like": 10.4, "humidity": 81, "pressure": 1012},
                "weather": [{"main": "Clouds", "description": "overcast clouds", "icon": "04d"}],
                "wind": {"speed": 4.1, "deg": 240.0}
            })))
            .mount(&server)
            .await;

        let client = UpstreamClient::new(UpstreamConfig {
            openweather_base_url: server.uri(),
            openweather_api_key: Some("secret".to_string()),
            ..UpstreamConfig::default()
        })
        .unwrap();
        let weather = fetch_weather(&client, "London", "metric").await.unwrap();

        assert_eq!(weather.location.country, "GB");
        assert_eq!(weather.current.temperature, 12);
        assert_eq!(weather.current.feels_like, 10);
        assert_eq!(
            weather.current.icon.as_deref(),
            Some("https://openweathermap.org/img/wn/04d@2x.png")
        );
        assert_eq!(weather.current.wind.direction.as_deref(), Some("240°"));
    }

    #[tokio::test]
    async fn test_malformed_wttr_number_is_parse_error() {
        let server = MockServer::start().await;
        let mut body = wttr_body();
        body["current_condition"][0]["humidity"] = json!("n/a");
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = UpstreamClient::new(UpstreamConfig {
            wttr_base_url: server.uri(),
            ..UpstreamConfig::default()
        })
        .unwrap();
        let result = fetch_weather(&client, "Paris", "metric").await;
        assert!(matches!(result, Err(UpstreamError::Parse(_))));
    }
}
