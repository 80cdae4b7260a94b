use anyhow::{Context, Result};
use chrono_tz::Tz;
use finavatar_ai::{LlmConfig, Provider};
use finavatar_core::time::parse_timezone;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_finavatar_home;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub profile: ProfileSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub provider: String,
    /// Empty means the provider's default model
    pub model: String,
    /// Empty means the provider's public endpoint
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: String::new(),
            base_url: String::new(),
            temperature: 0.4,
            max_tokens: 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSection {
    pub owner_id: String,
    pub timezone: String,
    pub currency: String,
}

impl Default for ProfileSection {
    fn default() -> Self {
        Self {
            owner_id: "local".to_string(),
            timezone: "America/Chicago".to_string(),
            currency: "$".to_string(),
        }
    }
}

impl Config {
    pub fn timezone(&self) -> Result<Tz> {
        parse_timezone(&self.profile.timezone)
    }

    pub fn provider(&self) -> Result<Provider> {
        self.llm.provider.parse()
    }

    /// Client settings for the configured provider, using `api_key`.
    pub fn llm_config(&self, api_key: String) -> Result<LlmConfig> {
        let mut cfg = LlmConfig::new(self.provider()?, api_key);
        if !self.llm.model.trim().is_empty() {
            cfg.model = self.llm.model.trim().to_string();
        }
        if !self.llm.base_url.trim().is_empty() {
            cfg.base_url = Some(self.llm.base_url.trim().to_string());
        }
        cfg.temperature = self.llm.temperature;
        cfg.max_tokens = self.llm.max_tokens;
        Ok(cfg)
    }

    pub fn money(&self, amount: f64) -> String {
        if amount < 0.0 {
            format!("-{}{:.2}", self.profile.currency, -amount)
        } else {
            format!("{}{:.2}", self.profile.currency, amount)
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_finavatar_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_fills_defaults() {
        let cfg: Config = toml::from_str("[profile]\ntimezone = \"Europe/Berlin\"\n").unwrap();
        assert_eq!(cfg.profile.timezone, "Europe/Berlin");
        assert_eq!(cfg.profile.owner_id, "local");
        assert_eq!(cfg.llm.provider, "gemini");
        assert_eq!(cfg.timezone().unwrap(), chrono_tz::Europe::Berlin);
    }

    #[test]
    fn test_llm_config_overrides() {
        let mut cfg = Config::default();
        let llm = cfg.llm_config("key".into()).unwrap();
        assert_eq!(llm.provider, Provider::Gemini);
        assert_eq!(llm.model, "gemini-1.5-pro");
        assert_eq!(llm.base_url, None);

        cfg.llm.provider = "openai".into();
        cfg.llm.model = "gpt-4o".into();
        let llm = cfg.llm_config("key".into()).unwrap();
        assert_eq!(llm.provider, Provider::OpenAI);
        assert_eq!(llm.model, "gpt-4o");

        cfg.llm.provider = "nope".into();
        assert!(cfg.llm_config("key".into()).is_err());
    }

    #[test]
    fn test_money_format() {
        let cfg = Config::default();
        assert_eq!(cfg.money(1234.5), "$1234.50");
        assert_eq!(cfg.money(-20.0), "-$20.00");
    }

    #[test]
    fn test_missing_file_is_default() {
        let cfg = load_config_from(Path::new("/nonexistent/finavatar/config.toml")).unwrap();
        assert_eq!(cfg.llm.max_tokens, 1024);
    }
}
