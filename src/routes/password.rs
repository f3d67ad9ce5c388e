//! Password generator (GET /api/password)

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Response,
};
use rand::{seq::SliceRandom, Rng};
use serde::Serialize;
use serde_json::Value;

use crate::api::{policy::PASSWORD, respond, AppState, ClientIdentity};
use crate::error::{ApiError, Result};
use crate::models::requests::{clamped_number, flag};
use crate::models::PasswordQuery;
use crate::routes::query_params;

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()_+-=[]{}|;:,.<>?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CharsetOptions {
    pub uppercase: bool,
    pub lowercase: bool,
    pub numbers: bool,
    pub symbols: bool,
}

impl CharsetOptions {
    /// Characters to draw from; lowercase plus digits when nothing is enabled.
    fn charset(&self) -> Vec<u8> {
        let mut charset = Vec::new();
        if self.lowercase {
            charset.extend_from_slice(LOWERCASE);
        }
        if self.uppercase {
            charset.extend_from_slice(UPPERCASE);
        }
        if self.numbers {
            charset.extend_from_slice(DIGITS);
        }
        if self.symbols {
            charset.extend_from_slice(SYMBOLS);
        }
        if charset.is_empty() {
            charset.extend_from_slice(LOWERCASE);
            charset.extend_from_slice(DIGITS);
        }
        charset
    }

    fn charset_size(&self) -> u32 {
        let mut size = 0;
        if self.lowercase {
            size += 26;
        }
        if self.uppercase {
            size += 26;
        }
        if self.numbers {
            size += 10;
        }
        if self.symbols {
            size += 32;
        }
        size
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordBatch {
    pub passwords: Vec<String>,
    pub length: u32,
    pub count: u32,
    pub options: CharsetOptions,
    pub strength: &'static str,
}

/// Handler for GET /api/password
pub async fn password_handler(
    State(state): State<AppState>,
    ClientIdentity(identity): ClientIdentity,
    query: std::result::Result<Query<PasswordQuery>, QueryRejection>,
) -> Response {
    let result = passwords(&state, &identity, query).await;
    respond(&PASSWORD, &identity, result)
}

async fn passwords(
    state: &AppState,
    identity: &str,
    query: std::result::Result<Query<PasswordQuery>, QueryRejection>,
) -> Result<Value> {
    state.check_rate(&PASSWORD, identity).await?;
    let batch = build_batch(&query_params(query)?)?;
    to_payload(&batch)
}

/// Validates the query and generates the requested passwords.
pub fn build_batch(query: &PasswordQuery) -> Result<PasswordBatch> {
    let length = clamped_number(&query.length, "length", 12, 4, 128)?;
    let count = clamped_number(&query.count, "count", 1, 1, 10)?;
    let options = CharsetOptions {
        uppercase: flag(&query.uppercase, true),
        lowercase: flag(&query.lowercase, true),
        numbers: flag(&query.numbers, true),
        symbols: flag(&query.symbols, false),
    };

    let mut rng = rand::thread_rng();
    Ok(PasswordBatch {
        passwords: (0..count)
            .map(|_| generate_password(&mut rng, length, &options))
            .collect(),
        length,
        count,
        options,
        strength: strength_label(length, &options),
    })
}

/// Draws `length` characters uniformly from the enabled charset.
pub fn generate_password<R: Rng>(rng: &mut R, length: u32, options: &CharsetOptions) -> String {
    let charset = options.charset();
    (0..length)
        .filter_map(|_| charset.choose(rng).map(|&b| b as char))
        .collect()
}

/// Labels a password by its entropy in bits.
pub fn strength_label(length: u32, options: &CharsetOptions) -> &'static str {
    let size = options.charset_size();
    let entropy = if size == 0 {
        0.0
    } else {
        length as f64 * (size as f64).log2()
    };

    match entropy {
        e if e < 30.0 => "Very Weak",
        e if e < 50.0 => "Weak",
        e if e < 70.0 => "Fair",
        e if e < 90.0 => "Strong",
        _ => "Very Strong",
    }
}

fn to_payload<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::internal("Password generation failed", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    const ALL_ON: CharsetOptions = CharsetOptions {
        uppercase: true,
        lowercase: true,
        numbers: true,
        symbols: true,
    };
    const ALL_OFF: CharsetOptions = CharsetOptions {
        uppercase: false,
        lowercase: false,
        numbers: false,
        symbols: false,
    };

    #[test]
    fn test_generated_length_and_charset() {
        let mut rng = StdRng::seed_from_u64(7);
        let options = CharsetOptions {
            numbers: true,
            ..ALL_OFF
        };
        let password = generate_password(&mut rng, 32, &options);

        assert_eq!(password.len(), 32);
        assert!(password.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_empty_charset_falls_back() {
        let mut rng = StdRng::seed_from_u64(1);
        let password = generate_password(&mut rng, 64, &ALL_OFF);
        assert!(password
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_build_batch_defaults() {
        let batch = build_batch(&PasswordQuery::default()).unwrap();

        assert_eq!(batch.count, 1);
        assert_eq!(batch.length, 12);
        assert_eq!(batch.passwords[0].len(), 12);
        assert!(!batch.options.symbols);
        assert_eq!(batch.strength, "Strong");
    }

    #[test]
    fn test_build_batch_rejects_non_numeric_length() {
        let query = PasswordQuery {
            length: Some("long".to_string()),
            ..PasswordQuery::default()
        };
        assert!(matches!(build_batch(&query), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_strength_bands() {
        let default_opts = CharsetOptions {
            symbols: false,
            ..ALL_ON
        };
        // 62 symbols: ~5.95 bits per char
        assert_eq!(strength_label(4, &default_opts), "Very Weak");
        assert_eq!(strength_label(8, &default_opts), "Weak");
        assert_eq!(strength_label(12, &default_opts), "Strong");
        assert_eq!(strength_label(16, &ALL_ON), "Very Strong");
        assert_eq!(strength_label(128, &ALL_OFF), "Very Weak");
    }
}
