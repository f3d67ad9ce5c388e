//! QR code generator (GET /api/qr)
//!
//! PNG codes come back as a base64 data URL, SVG codes as markup. Both take
//! custom dark and light colors.

use std::fmt;
use std::io::Cursor;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Response,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use image::{DynamicImage, ImageFormat, Rgb};
use qrcode::render::svg;
use qrcode::types::QrError;
use qrcode::QrCode;
use serde::Serialize;
use serde_json::Value;

use crate::api::{policy::QR, respond, AppState, ClientIdentity};
use crate::error::{ApiError, Result};
use crate::models::requests::{clamped_number, or_default, required};
use crate::models::QrQuery;
use crate::routes::query_params;

const FAILED: &str = "QR code generation failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrFormat {
    Png,
    Svg,
}

impl QrFormat {
    fn parse(raw: &str) -> Result<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            _ => Err(ApiError::validation("Format must be png or svg")),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }
}

/// An RGB color written as `#rrggbb`; the `#` is optional on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor([u8; 3]);

impl HexColor {
    pub fn parse(raw: &str, name: &str) -> Result<Self> {
        let invalid = || ApiError::validation(format!("{name} must be a hex color like #000000"));

        let digits = raw.strip_prefix('#').unwrap_or(raw);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |at: usize| u8::from_str_radix(&digits[at..at + 2], 16);
        match (channel(0), channel(2), channel(4)) {
            (Ok(r), Ok(g), Ok(b)) => Ok(Self([r, g, b])),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrImage {
    pub text: String,
    pub qr_code: String,
    pub format: &'static str,
    pub size: u32,
    pub color: String,
    pub background: String,
}

/// Handler for GET /api/qr
pub async fn qr_handler(
    State(state): State<AppState>,
    ClientIdentity(identity): ClientIdentity,
    query: std::result::Result<Query<QrQuery>, QueryRejection>,
) -> Response {
    let result = qr(&state, &identity, query).await;
    respond(&QR, &identity, result)
}

async fn qr(
    state: &AppState,
    identity: &str,
    query: std::result::Result<Query<QrQuery>, QueryRejection>,
) -> Result<Value> {
    state.check_rate(&QR, identity).await?;
    let query = query_params(query)?;

    let text = required(&query.text, "Text parameter is required")?;
    let size = clamped_number(&query.size, "size", 200, 100, 1000)?;
    let format = QrFormat::parse(or_default(&query.format, "png"))?;
    let dark = HexColor::parse(or_default(&query.color, "#000000"), "color")?;
    let light = HexColor::parse(or_default(&query.background, "#ffffff"), "background")?;

    let key = format!("{size}:{}:{dark}:{light}:{text}", format.as_str());
    state
        .cached(&QR, &key, || async {
            let image = QrImage {
                text: text.to_string(),
                qr_code: render(text, format, size, dark, light)?,
                format: format.as_str(),
                size,
                color: dark.to_string(),
                background: light.to_string(),
            };
            serde_json::to_value(image).map_err(|e| ApiError::internal(FAILED, e.to_string()))
        })
        .await
}

/// Encodes `text` and renders it at no less than `size` pixels square.
///
/// Text beyond QR capacity is a 400; any other encoder failure is a 500.
pub fn render(text: &str, format: QrFormat, size: u32, dark: HexColor, light: HexColor) -> Result<String> {
    let code = QrCode::new(text.as_bytes()).map_err(|e| match e {
        QrError::DataTooLong => ApiError::validation("Text is too long for a QR code"),
        other => ApiError::internal(FAILED, other.to_string()),
    })?;

    match format {
        QrFormat::Svg => {
            let (dark, light) = (dark.to_string(), light.to_string());
            Ok(code
                .render::<svg::Color>()
                .min_dimensions(size, size)
                .dark_color(svg::Color(&dark))
                .light_color(svg::Color(&light))
                .build())
        }
        QrFormat::Png => {
            let image = code
                .render::<Rgb<u8>>()
                .min_dimensions(size, size)
                .dark_color(Rgb(dark.0))
                .light_color(Rgb(light.0))
                .build();

            let mut bytes = Vec::new();
            DynamicImage::ImageRgb8(image)
                .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
                .map_err(|e| ApiError::internal(FAILED, e.to_string()))?;
            Ok(format!("data:image/png;base64,{}", STANDARD.encode(&bytes)))
        }
    }
}
