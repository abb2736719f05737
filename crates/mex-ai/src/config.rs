use crate::strategy::Strategy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Metadata describing one known tactic (purely descriptive; the scoring
/// behavior itself lives in [`crate::tactic::TacticKind`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TacticDescription {
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

/// The full AI configuration document: known tactics, named strategies, and
/// a skill-level → strategy-id map. Loaded at startup and reloadable; on
/// parse failure this falls back to an embedded minimal configuration with
/// a single random-play strategy rather than failing server startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default)]
    pub tactics: HashMap<String, TacticDescription>,
    #[serde(default)]
    pub strategies: HashMap<String, Strategy>,
    #[serde(default)]
    pub level_mappings: HashMap<String, String>,
    #[serde(skip)]
    source: Option<PathBuf>,
}

impl AiConfig {
    /// Loads configuration from `path`. Missing file or malformed JSON both
    /// log and fall back to [`AiConfig::embedded_default`] rather than
    /// propagating an error — an AI misconfiguration must never prevent the
    /// server from starting.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                Ok(mut config) => {
                    config.source = Some(path.to_path_buf());
                    log::info!(
                        "loaded AI config: {} tactics, {} strategies from {}",
                        config.tactics.len(),
                        config.strategies.len(),
                        path.display()
                    );
                    config
                }
                Err(err) => {
                    log::warn!("error parsing AI config file {}: {err}", path.display());
                    Self::embedded_default()
                }
            },
            Err(_) => {
                log::warn!("AI config file not found: {}", path.display());
                Self::embedded_default()
            }
        }
    }

    /// Re-reads the configuration from its original path, if it was loaded
    /// from one; falls back to the embedded default on any failure. Intended
    /// to swap the active configuration out from under a running server
    /// without restarting it.
    pub fn reload(&self) -> Self {
        match &self.source {
            Some(path) => Self::load(path),
            None => Self::embedded_default(),
        }
    }

    /// A minimal configuration with one tactic (`random`) and one strategy
    /// (`sleepy_caboose`) mapped to skill level 1.
    pub fn embedded_default() -> Self {
        let mut tactics = HashMap::new();
        tactics.insert(
            "random".to_string(),
            TacticDescription {
                description: "random moves".to_string(),
                weight: 1.0,
            },
        );
        let mut strategies = HashMap::new();
        strategies.insert("sleepy_caboose".to_string(), Strategy::uniform_random());
        let mut level_mappings = HashMap::new();
        level_mappings.insert("1".to_string(), "sleepy_caboose".to_string());
        Self {
            tactics,
            strategies,
            level_mappings,
            source: None,
        }
    }

    /// Looks up the strategy mapped to an integer skill level. A level with
    /// no explicit mapping falls back to the sole configured strategy when
    /// there is exactly one — matching the embedded default's single
    /// `sleepy_caboose` strategy being mapped to every skill level, not just
    /// level 1. A config with several strategies and no mapping for `level`
    /// has no reasonable single fallback, so that case still reports `None`.
    pub fn strategy_for_level(&self, level: u32) -> Option<&Strategy> {
        if let Some(name) = self.level_mappings.get(&level.to_string()) {
            return self.strategies.get(name);
        }
        match self.strategies.len() {
            1 => self.strategies.values().next(),
            _ => None,
        }
    }

    /// Looks up a strategy by its configuration id.
    pub fn strategy_by_name(&self, name: &str) -> Option<&Strategy> {
        self.strategies.get(name)
    }

    pub fn list_strategies(&self) -> Vec<&str> {
        self.strategies.keys().map(String::as_str).collect()
    }

    pub fn list_tactics(&self) -> Vec<&str> {
        self.tactics.keys().map(String::as_str).collect()
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::embedded_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_embedded_default() {
        let config = AiConfig::load("/nonexistent/path/ai_strategies.json");
        assert_eq!(config.list_strategies(), vec!["sleepy_caboose"]);
        // the fallback strategy is mapped to every skill level, not just 1
        assert!(config.strategy_for_level(1).is_some());
        assert!(config.strategy_for_level(99).is_some());
    }

    #[test]
    fn malformed_json_falls_back_to_embedded_default() {
        let dir = std::env::temp_dir().join("mex_ai_config_test_malformed.json");
        std::fs::write(&dir, "{ not valid json").unwrap();
        let config = AiConfig::load(&dir);
        assert!(config.strategy_by_name("sleepy_caboose").is_some());
        let _ = std::fs::remove_file(&dir);
    }

    #[test]
    fn well_formed_config_round_trips_through_json() {
        let json = r#"{
            "tactics": { "random": { "description": "random", "weight": 1.0 } },
            "strategies": {
                "cautious": {
                    "name": "Cautious",
                    "description": "plays it safe",
                    "tactics": [
                        { "name": "minimize_pips", "weight": 2.0, "priority": 1 },
                        { "name": "preserve_doubles", "weight": 1.0, "priority": 2 }
                    ]
                }
            },
            "level_mappings": { "3": "cautious" }
        }"#;
        let dir = std::env::temp_dir().join("mex_ai_config_test_valid.json");
        std::fs::write(&dir, json).unwrap();
        let config = AiConfig::load(&dir);
        assert!(config.strategy_for_level(3).is_some());
        assert_eq!(config.strategy_for_level(3).unwrap().tactics.len(), 2);
        let _ = std::fs::remove_file(&dir);
    }
}
