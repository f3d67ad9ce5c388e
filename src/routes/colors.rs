//! Color palette generator (GET /api/colors)

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Response,
};
use rand::Rng;
use serde::Serialize;
use serde_json::Value;

use crate::api::{policy::COLORS, respond, AppState, ClientIdentity};
use crate::cache::{current_timestamp_ms, time_bucket};
use crate::error::{ApiError, Result};
use crate::models::requests::{clamped_number, or_default};
use crate::models::ColorsQuery;
use crate::routes::query_params;

const MAX_COLORS: u32 = 20;

/// Palette families understood by the generator. Anything else is random.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteKind {
    Random,
    Warm,
    Cool,
    Pastel,
    Vibrant,
    Monochrome,
}

impl PaletteKind {
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "warm" => PaletteKind::Warm,
            "cool" => PaletteKind::Cool,
            "pastel" => PaletteKind::Pastel,
            "vibrant" => PaletteKind::Vibrant,
            "monochrome" => PaletteKind::Monochrome,
            _ => PaletteKind::Random,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Color {
    pub hex: String,
    pub rgb: String,
    pub hsl: String,
    pub name: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Palette {
    #[serde(rename = "type")]
    pub kind: String,
    pub count: usize,
    pub format: String,
    pub colors: Vec<Color>,
    pub palette_url: String,
}

/// Handler for GET /api/colors
///
/// Palettes are cached per five-minute bucket, so repeated requests inside
/// a bucket see the same colors.
pub async fn colors_handler(
    State(state): State<AppState>,
    ClientIdentity(identity): ClientIdentity,
    query: std::result::Result<Query<ColorsQuery>, QueryRejection>,
) -> Response {
    let result = palette(&state, &identity, query).await;
    respond(&COLORS, &identity, result)
}

async fn palette(
    state: &AppState,
    identity: &str,
    query: std::result::Result<Query<ColorsQuery>, QueryRejection>,
) -> Result<Value> {
    state.check_rate(&COLORS, identity).await?;
    let query = query_params(query)?;

    let kind = or_default(&query.palette, "random").to_ascii_lowercase();
    let count = clamped_number(&query.count, "count", 5, 0, MAX_COLORS)?;
    let format = or_default(&query.format, "hex").to_string();

    let key = format!(
        "{kind}:{count}:{format}:{}",
        time_bucket(current_timestamp_ms(), COLORS.ttl_secs)
    );
    state
        .cached(&COLORS, &key, || async {
            let palette = generate_palette(&kind, count, &format);
            serde_json::to_value(palette)
                .map_err(|e| ApiError::internal("Color generation failed", e.to_string()))
        })
        .await
}

/// Builds a palette of `count` colors of the given family.
pub fn generate_palette(kind: &str, count: u32, format: &str) -> Palette {
    let family = PaletteKind::parse(kind);
    let mut rng = rand::thread_rng();

    let colors: Vec<Color> = (0..count.min(MAX_COLORS))
        .map(|_| {
            let (r, g, b) = random_rgb(&mut rng, family);
            describe(r, g, b)
        })
        .collect();

    let palette_url = format!(
        "https://coolors.co/{}",
        colors
            .iter()
            .map(|c| c.hex.trim_start_matches('#'))
            .collect::<Vec<_>>()
            .join("-")
    );

    Palette {
        kind: kind.to_string(),
        count: colors.len(),
        format: format.to_string(),
        colors,
        palette_url,
    }
}

fn random_rgb<R: Rng>(rng: &mut R, family: PaletteKind) -> (u8, u8, u8) {
    match family {
        PaletteKind::Random => (rng.gen(), rng.gen(), rng.gen()),
        PaletteKind::Warm => (
            rng.gen_range(156..=255),
            rng.gen_range(50..200),
            rng.gen_range(0..100),
        ),
        PaletteKind::Cool => (
            rng.gen_range(0..100),
            rng.gen_range(50..200),
            rng.gen_range(156..=255),
        ),
        PaletteKind::Pastel => (
            rng.gen_range(155..=254),
            rng.gen_range(155..=254),
            rng.gen_range(155..=254),
        ),
        PaletteKind::Vibrant => {
            const BASES: [(i16, i16, i16); 9] = [
                (255, 0, 0),
                (0, 255, 0),
                (0, 0, 255),
                (255, 255, 0),
                (255, 0, 255),
                (0, 255, 255),
                (255, 128, 0),
                (128, 255, 0),
                (0, 128, 255),
            ];
            let (r, g, b) = BASES[rng.gen_range(0..BASES.len())];
            let mut jitter = |c: i16| (c + rng.gen_range(-50..50)).clamp(0, 255) as u8;
            (jitter(r), jitter(g), jitter(b))
        }
        PaletteKind::Monochrome => {
            let gray = rng.gen();
            (gray, gray, gray)
        }
    }
}

/// Renders one color in hex, rgb and hsl notation.
pub fn describe(r: u8, g: u8, b: u8) -> Color {
    let hex = format!("#{r:02x}{g:02x}{b:02x}");
    Color {
        name: color_name(&hex),
        rgb: format!("rgb({r}, {g}, {b})"),
        hsl: rgb_to_hsl(r, g, b),
        hex,
    }
}

pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> String {
    let (r, g, b) = (r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    let (h, s) = if max == min {
        (0.0, 0.0)
    } else {
        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        (h / 6.0, s)
    };

    format!(
        "hsl({}, {}%, {}%)",
        (h * 360.0).round(),
        (s * 100.0).round(),
        (l * 100.0).round()
    )
}

fn color_name(hex: &str) -> &'static str {
    match hex.to_ascii_uppercase().as_str() {
        "#FF0000" => "Red",
        "#00FF00" => "Green",
        "#0000FF" => "Blue",
        "#FFFF00" => "Yellow",
        "#FF00FF" => "Magenta",
        "#00FFFF" => "Cyan",
        "#000000" => "Black",
        "#FFFFFF" => "White",
        "#808080" => "Gray",
        "#FFA500" => "Orange",
        "#800080" => "Purple",
        "#FFC0CB" => "Pink",
        _ => "Custom Color",
    }
}
