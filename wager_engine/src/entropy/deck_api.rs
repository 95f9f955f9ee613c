//! Client for the public deck-of-cards HTTP service.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{
    Card, DeckHandle, DeckSource, check_draw,
    errors::{EntropyError, EntropyResult},
};
use crate::config::EngineConfig;

/// Default service root.
pub const DEFAULT_DECK_API_URL: &str = "https://deckofcardsapi.com/api/deck";

#[derive(Debug, Deserialize)]
struct ShuffleResponse {
    success: bool,
    deck_id: String,
    remaining: usize,
}

#[derive(Debug, Deserialize)]
struct DrawResponse {
    success: bool,
    remaining: usize,
    #[serde(default)]
    cards: Vec<ApiCard>,
}

#[derive(Debug, Deserialize)]
struct ApiCard {
    value: String,
    suit: String,
}

impl DrawResponse {
    fn into_cards(self, requested: usize) -> EntropyResult<(Vec<Card>, usize)> {
        if !self.success {
            return Err(EntropyError::SourceUnavailable(
                "deck service rejected the draw".to_string(),
            ));
        }
        if self.cards.len() != requested {
            return Err(EntropyError::SourceUnavailable(format!(
                "deck service returned {} cards, expected {requested}",
                self.cards.len()
            )));
        }
        let cards = self
            .cards
            .iter()
            .map(|c| Card::from_api(&c.value, &c.suit))
            .collect::<EntropyResult<Vec<_>>>()?;
        Ok((cards, self.remaining))
    }
}

/// Deck source backed by the remote shuffle/draw API.
#[derive(Clone, Debug)]
pub struct DeckApiSource {
    client: Client,
    base_url: String,
}

impl DeckApiSource {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> EntropyResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &EngineConfig) -> EntropyResult<Self> {
        Self::new(config.deck_api_url.clone(), config.deck_api_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl DeckSource for DeckApiSource {
    async fn open_deck(&self) -> EntropyResult<DeckHandle> {
        let url = format!("{}/new/shuffle/?deck_count=1", self.base_url);
        let resp: ShuffleResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !resp.success {
            return Err(EntropyError::SourceUnavailable(
                "deck service could not shuffle a new deck".to_string(),
            ));
        }

        debug!("Opened remote deck {} ({} cards)", resp.deck_id, resp.remaining);
        Ok(DeckHandle::new(resp.deck_id, resp.remaining))
    }

    async fn draw(&self, handle: &mut DeckHandle, count: usize) -> EntropyResult<Vec<Card>> {
        check_draw(handle, count)?;

        let url = format!(
            "{}/{}/draw/?count={count}",
            self.base_url,
            handle.deck_id()
        );
        let resp: DrawResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let (cards, remaining) = resp.into_cards(count)?;
        handle.set_remaining(remaining);
        Ok(cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::Suit;

    const DRAW_BODY: &str = r#"{
        "success": true,
        "deck_id": "kxozasf3edqu",
        "cards": [
            {"code": "6H", "image": "https://deckofcardsapi.com/static/img/6H.png",
             "value": "6", "suit": "HEARTS"},
            {"code": "KS", "image": "https://deckofcardsapi.com/static/img/KS.png",
             "value": "KING", "suit": "SPADES"}
        ],
        "remaining": 50
    }"#;

    #[test]
    fn test_draw_response_parsing() {
        let resp: DrawResponse = serde_json::from_str(DRAW_BODY).unwrap();
        let (cards, remaining) = resp.into_cards(2).unwrap();
        assert_eq!(cards, vec![Card(6, Suit::Heart), Card(13, Suit::Spade)]);
        assert_eq!(remaining, 50);
    }

    #[test]
    fn test_draw_response_count_mismatch() {
        let resp: DrawResponse = serde_json::from_str(DRAW_BODY).unwrap();
        assert!(matches!(
            resp.into_cards(3),
            Err(EntropyError::SourceUnavailable(_))
        ));
    }

    #[test]
    fn test_failed_draw_response() {
        let body = r#"{"success": false, "deck_id": "x", "remaining": 0,
                       "error": "Not enough cards remaining to draw 1 additional"}"#;
        let resp: DrawResponse = serde_json::from_str(body).unwrap();
        assert!(resp.into_cards(1).is_err());
    }

    #[test]
    fn test_shuffle_response_parsing() {
        let body = r#"{"success": true, "deck_id": "3p40paa87x90",
                       "shuffled": true, "remaining": 52}"#;
        let resp: ShuffleResponse = serde_json::from_str(body).unwrap();
        assert!(resp.success);
        assert_eq!(resp.deck_id, "3p40paa87x90");
        assert_eq!(resp.remaining, 52);
    }

    #[tokio::test]
    async fn test_invalid_count_rejected_before_request() {
        // Unroutable base URL: reaching the network would fail differently.
        let source = DeckApiSource::new("http://127.0.0.1:9/", Duration::from_millis(50)).unwrap();
        assert_eq!(source.base_url(), "http://127.0.0.1:9");

        let mut handle = DeckHandle::new("abc", 1);
        let err = source.draw(&mut handle, 2).await.unwrap_err();
        assert!(matches!(err, EntropyError::DeckExhausted { .. }));
        assert_eq!(handle.remaining(), 1);
    }
}
