use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tokens skipped during one recovery before a Missing token is forced.
pub const DEFAULT_RECOVERY_WINDOW: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IncrementalMode {
    #[default]
    Enable,
    Disable,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParserConfig {
    pub recovery_window: usize,
    pub incremental: IncrementalMode,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self { recovery_window: DEFAULT_RECOVERY_WINDOW, incremental: IncrementalMode::default() }
    }
}

impl ParserConfig {
    pub fn from_json(text: &str) -> anyhow::Result<ParserConfig> {
        let config: ParserConfig =
            serde_json::from_str(text).context("could not read parser configuration")?;
        if config.recovery_window == 0 {
            bail!("recoveryWindow must be at least 1");
        }
        Ok(config)
    }

    pub fn update(&mut self, update: &Value) -> anyhow::Result<()> {
        if let Value::Object(update) = update {
            self.update_by_map(update)
        } else {
            bail!("got invalid configuration object {update}")
        }
    }

    /// Applies the recognized keys of `update`, ignoring malformed values.
    pub fn update_by_map(&mut self, update: &Map<String, Value>) -> anyhow::Result<()> {
        let recovery_window = update
            .get("recoveryWindow")
            .map(usize::deserialize)
            .and_then(Result::ok);
        if let Some(recovery_window) = recovery_window {
            if recovery_window == 0 {
                bail!("recoveryWindow must be at least 1");
            }
            self.recovery_window = recovery_window;
        }

        let incremental = update
            .get("incremental")
            .map(IncrementalMode::deserialize)
            .and_then(Result::ok);
        if let Some(incremental) = incremental {
            self.incremental = incremental;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{IncrementalMode, ParserConfig, DEFAULT_RECOVERY_WINDOW};

    #[test]
    fn defaults() {
        let config = ParserConfig::from_json("{}").unwrap();
        assert_eq!(config, ParserConfig::default());
        assert_eq!(config.recovery_window, DEFAULT_RECOVERY_WINDOW);
        assert_eq!(config.incremental, IncrementalMode::Enable);
    }

    #[test]
    fn from_json() {
        let config =
            ParserConfig::from_json(r#"{ "recoveryWindow": 8, "incremental": "disable" }"#)
                .unwrap();
        assert_eq!(config.recovery_window, 8);
        assert_eq!(config.incremental, IncrementalMode::Disable);
        assert!(ParserConfig::from_json(r#"{ "recoveryWindow": 0 }"#).is_err());
        assert!(ParserConfig::from_json("3").is_err());
    }

    #[test]
    fn update_ignores_malformed_values() {
        let mut config = ParserConfig::default();
        config
            .update(&json!({ "recoveryWindow": "many", "incremental": "disable", "other": 1 }))
            .unwrap();
        assert_eq!(config.recovery_window, DEFAULT_RECOVERY_WINDOW);
        assert_eq!(config.incremental, IncrementalMode::Disable);

        assert!(config.update(&json!({ "recoveryWindow": 0 })).is_err());
        assert!(config.update(&json!(3)).is_err());
    }
}
