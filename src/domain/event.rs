//! Provider payload shapes.
//!
//! The client caches these as opaque JSON and only decodes them at the edge.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Entry of the provider's sports list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sport {
    pub key: String,
    #[serde(default)]
    pub group: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub has_outrights: bool,
}

/// Price for a single outcome, in decimal odds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub point: Option<f64>,
}

impl Outcome {
    /// Implied probability of the quoted price
    pub fn implied_probability(&self) -> Decimal {
        match Decimal::from_f64_retain(self.price) {
            Some(price) if price > Decimal::ZERO => Decimal::ONE / price,
            _ => Decimal::ZERO,
        }
    }
}

/// Market quote (h2h, spreads, totals)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    pub key: String,
    #[serde(default)]
    pub last_update: Option<String>,
    pub outcomes: Vec<Outcome>,
}

/// Bookmaker odds for an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmaker {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub last_update: Option<String>,
    #[serde(default)]
    pub markets: Vec<MarketQuote>,
}

/// Team score in a scores listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub name: String,
    pub score: String,
}

/// Match listing, shared by odds, live odds and scores responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub sport_key: String,
    #[serde(default)]
    pub sport_title: Option<String>,
    pub commence_time: String,
    #[serde(default)]
    pub home_team: Option<String>,
    #[serde(default)]
    pub away_team: Option<String>,
    #[serde(default)]
    pub bookmakers: Vec<Bookmaker>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub scores: Option<Vec<Score>>,
    #[serde(default)]
    pub last_update: Option<String>,
}

impl Event {
    /// Human-readable fixture name
    pub fn fixture(&self) -> String {
        match (&self.home_team, &self.away_team) {
            (Some(home), Some(away)) => format!("{} vs {}", home, away),
            (Some(team), None) | (None, Some(team)) => team.clone(),
            (None, None) => self.id.clone(),
        }
    }

    /// Best (highest) priced outcome per name across bookmakers for a market
    pub fn best_prices(&self, market: &str) -> Vec<Outcome> {
        let mut best: Vec<Outcome> = Vec::new();
        let quotes = self
            .bookmakers
            .iter()
            .flat_map(|b| b.markets.iter().filter(|m| m.key == market));
        for quote in quotes {
            for outcome in &quote.outcomes {
                match best.iter_mut().find(|o| o.name == outcome.name) {
                    Some(current) if outcome.price > current.price => *current = outcome.clone(),
                    Some(_) => {}
                    None => best.push(outcome.clone()),
                }
            }
        }
        best
    }

    /// Score line such as "2 - 1", when the provider reported one
    pub fn score_line(&self) -> Option<String> {
        let scores = self.scores.as_ref()?;
        let find = |team: &Option<String>| {
            team.as_ref()
                .and_then(|t| scores.iter().find(|s| &s.name == t))
                .map(|s| s.score.clone())
        };
        Some(format!(
            "{} - {}",
            find(&self.home_team)?,
            find(&self.away_team)?
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> Event {
        serde_json::from_value(serde_json::json!({
            "id": "e1",
            "sport_key": "soccer_epl",
            "sport_title": "EPL",
            "commence_time": "2026-10-20T19:00:00Z",
            "home_team": "Arsenal",
            "away_team": "Chelsea",
            "bookmakers": [
                {
                    "key": "a",
                    "title": "Book A",
                    "markets": [{"key": "h2h", "outcomes": [
                        {"name": "Arsenal", "price": 2.1},
                        {"name": "Chelsea", "price": 3.4},
                        {"name": "Draw", "price": 3.2}
                    ]}]
                },
                {
                    "key": "b",
                    "title": "Book B",
                    "markets": [{"key": "h2h", "outcomes": [
                        {"name": "Arsenal", "price": 2.25},
                        {"name": "Chelsea", "price": 3.1}
                    ]}]
                }
            ],
            "scores": [
                {"name": "Arsenal", "score": "2"},
                {"name": "Chelsea", "score": "1"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_best_prices_takes_maximum_per_outcome() {
        let event = sample_event();
        let best = event.best_prices("h2h");
        assert_eq!(best.len(), 3);
        let price = |name: &str| best.iter().find(|o| o.name == name).map(|o| o.price);
        assert_eq!(price("Arsenal"), Some(2.25));
        assert_eq!(price("Chelsea"), Some(3.4));
        assert_eq!(price("Draw"), Some(3.2));
        assert!(event.best_prices("totals").is_empty());
    }

    #[test]
    fn test_fixture_and_score_line() {
        let event = sample_event();
        assert_eq!(event.fixture(), "Arsenal vs Chelsea");
        assert_eq!(event.score_line().as_deref(), Some("2 - 1"));
    }

    #[test]
    fn test_implied_probability() {
        let outcome = Outcome {
            name: "Team".to_string(),
            price: 2.0,
            point: None,
        };
        assert_eq!(outcome.implied_probability(), Decimal::new(5, 1));

        let broken = Outcome {
            name: "Team".to_string(),
            price: 0.0,
            point: None,
        };
        assert_eq!(broken.implied_probability(), Decimal::ZERO);
    }
}
