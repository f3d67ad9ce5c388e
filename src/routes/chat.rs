//! Rule-based chat assistant (POST /api/ai/chat)

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Response,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use crate::api::{policy::AI_CHAT, respond, AppState, ClientIdentity};
use crate::cache::current_timestamp_ms;
use crate::error::{ApiError, Result};
use crate::models::requests::required;
use crate::models::ChatRequest;
use crate::routes::json_body;

const MAX_MESSAGE_LENGTH: usize = 2_000;
const MODEL_NAME: &str = "freebie-rules-v1";

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub conversation_id: String,
    pub timestamp: String,
    pub model: &'static str,
}

/// Handler for POST /api/ai/chat
pub async fn chat_handler(
    State(state): State<AppState>,
    ClientIdentity(identity): ClientIdentity,
    body: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let result = chat(&state, &identity, body).await;
    respond(&AI_CHAT, &identity, result)
}

async fn chat(
    state: &AppState,
    identity: &str,
    body: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Value> {
    state.check_rate(&AI_CHAT, identity).await?;
    let request = json_body(body)?;

    let message = required(&request.message, "Message is required")?;
    if message.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(ApiError::validation(format!(
            "Message exceeds maximum length of {MAX_MESSAGE_LENGTH} characters"
        )));
    }

    // Replies are keyed by message text only
    let key = message.to_lowercase();
    let conversation_id = request
        .conversation_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| current_timestamp_ms().to_string());

    state
        .cached(&AI_CHAT, &key, || async {
            let reply = ChatReply {
                response: reply_to(message),
                conversation_id,
                timestamp: Utc::now().to_rfc3339(),
                model: MODEL_NAME,
            };
            serde_json::to_value(reply)
                .map_err(|e| ApiError::internal("AI service temporarily unavailable", e.to_string()))
        })
        .await
}

const GREETINGS: &[&str] = &["hello", "hi", "hey", "good morning", "good afternoon", "good evening"];
const HELP: &[&str] = &["help", "what can you do", "commands", "features"];
const WEATHER: &[&str] = &["weather", "temperature", "climate"];
const TIME: &[&str] = &["time", "date", "today"];
const THANKS: &[&str] = &["thank you", "thanks", "appreciate"];

/// Picks a canned reply by keyword, first matching group wins.
pub fn reply_to(message: &str) -> String {
    let lower = message.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if mentions(GREETINGS) {
        "Hello! I'm the Freebie assistant. How can I help you today?".to_string()
    } else if mentions(HELP) {
        "I can help you with:\n• Weather information\n• Crypto prices\n• Quotes and memes\n• \
         Passwords, colors and short links\n• And much more!"
            .to_string()
    } else if mentions(WEATHER) {
        "I can help you get weather information! Use the weather API with a city name."
            .to_string()
    } else if mentions(TIME) {
        format!("Current time: {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"))
    } else if mentions(THANKS) {
        "You're welcome! Happy to help anytime!".to_string()
    } else {
        format!(
            "I understand you're asking about \"{message}\". While I'm a simple assistant, I can \
             help you with weather, prices, quotes and more! Try asking about my features."
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting() {
        assert!(reply_to("Hey there").starts_with("Hello!"));
    }

    #[test]
    fn test_help_before_weather() {
        assert!(reply_to("help with weather").starts_with("I can help you with:"));
    }

    #[test]
    fn test_thanks() {
        assert!(reply_to("Thanks a lot").starts_with("You're welcome"));
    }

    #[test]
    fn test_default_echoes_message() {
        let reply = reply_to("quantum pasta");
        assert!(reply.contains("\"quantum pasta\""));
    }
}
