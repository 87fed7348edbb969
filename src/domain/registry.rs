//! Known sports and their default polling settings.

use super::sport::{SportConfig, DEFAULT_REFRESH_INTERVAL_SECS};
use std::collections::HashMap;

/// Default settings for one known sport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SportDefault {
    pub key: &'static str,
    pub display_name: &'static str,
    pub enabled: bool,
    pub refresh_interval_seconds: u32,
}

const STANDARD_SPORTS: &[SportDefault] = &[
    SportDefault {
        key: "soccer_uefa_champs_league",
        display_name: "Champions League",
        enabled: true,
        refresh_interval_seconds: DEFAULT_REFRESH_INTERVAL_SECS,
    },
    SportDefault {
        key: "soccer_epl",
        display_name: "Premier League",
        enabled: true,
        refresh_interval_seconds: DEFAULT_REFRESH_INTERVAL_SECS,
    },
    SportDefault {
        key: "soccer_france_ligue_one",
        display_name: "Ligue 1",
        enabled: true,
        refresh_interval_seconds: DEFAULT_REFRESH_INTERVAL_SECS,
    },
    SportDefault {
        key: "soccer_spain_la_liga",
        display_name: "La Liga",
        enabled: true,
        refresh_interval_seconds: DEFAULT_REFRESH_INTERVAL_SECS,
    },
    SportDefault {
        key: "soccer_italy_serie_a",
        display_name: "Serie A",
        enabled: true,
        refresh_interval_seconds: DEFAULT_REFRESH_INTERVAL_SECS,
    },
    SportDefault {
        key: "soccer_germany_bundesliga",
        display_name: "Bundesliga",
        enabled: true,
        refresh_interval_seconds: DEFAULT_REFRESH_INTERVAL_SECS,
    },
];

/// Static table of sport defaults
#[derive(Debug, Clone)]
pub struct SportRegistry {
    sports: HashMap<&'static str, SportDefault>,
}

impl Default for SportRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl SportRegistry {
    /// The football leagues shown on the home screen.
    pub fn standard() -> Self {
        Self::with_sports(STANDARD_SPORTS)
    }

    pub fn with_sports(sports: &[SportDefault]) -> Self {
        Self {
            sports: sports.iter().map(|s| (s.key, *s)).collect(),
        }
    }

    pub fn display_name<'a>(&self, sport_id: &'a str) -> &'a str {
        self.sports
            .get(sport_id)
            .map(|s| s.display_name)
            .unwrap_or(sport_id)
    }

    /// Default config for a known sport.
    pub fn default_config(&self, sport_id: &str) -> Option<SportConfig> {
        self.sports
            .get(sport_id)
            .map(|s| SportConfig::new(s.enabled, s.refresh_interval_seconds))
    }

    /// Every known sport at its default settings.
    pub fn defaults(&self) -> HashMap<String, SportConfig> {
        self.sports
            .values()
            .map(|s| {
                (
                    s.key.to_string(),
                    SportConfig::new(s.enabled, s.refresh_interval_seconds),
                )
            })
            .collect()
    }

    /// Stored override, then registry default, then a disabled fallback.
    pub fn resolve(&self, sport_id: &str, overrides: &HashMap<String, SportConfig>) -> SportConfig {
        overrides
            .get(sport_id)
            .cloned()
            .or_else(|| self.default_config(sport_id))
            .unwrap_or_else(SportConfig::disabled_fallback)
    }

    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.sports.keys().copied().collect();
        keys.sort_unstable();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefers_override() {
        let registry = SportRegistry::standard();
        let mut overrides = HashMap::new();
        overrides.insert("soccer_epl".to_string(), SportConfig::new(false, 15));

        let config = registry.resolve("soccer_epl", &overrides);
        assert!(!config.enabled);
        assert_eq!(config.refresh_interval_seconds, 15);
    }

    #[test]
    fn test_resolve_falls_back_to_registry_default() {
        let registry = SportRegistry::standard();
        let config = registry.resolve("soccer_italy_serie_a", &HashMap::new());
        assert!(config.enabled);
        assert_eq!(config.refresh_interval_seconds, DEFAULT_REFRESH_INTERVAL_SECS);
    }

    #[test]
    fn test_unknown_sport_is_disabled() {
        let registry = SportRegistry::standard();
        let config = registry.resolve("curling_world", &HashMap::new());
        assert!(!config.enabled);
        assert_eq!(config.refresh_interval_seconds, 30);
    }

    #[test]
    fn test_display_name() {
        let registry = SportRegistry::standard();
        assert_eq!(registry.display_name("soccer_epl"), "Premier League");
        assert_eq!(registry.display_name("cricket_test"), "cricket_test");
        assert_eq!(registry.keys().len(), 6);
    }
}
