use anyhow::{bail, Context, Result};
use finavatar_ai::Provider;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};

use crate::state::ensure_finavatar_home;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthState {
    pub gemini_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
}

impl AuthState {
    fn stored(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::Gemini => self.gemini_api_key.as_deref(),
            Provider::Anthropic => self.anthropic_api_key.as_deref(),
            Provider::OpenAI => self.openai_api_key.as_deref(),
        }
    }
}

pub fn env_var(provider: Provider) -> &'static str {
    match provider {
        Provider::Gemini => "GEMINI_API_KEY",
        Provider::Anthropic => "ANTHROPIC_API_KEY",
        Provider::OpenAI => "OPENAI_API_KEY",
    }
}

/// Environment first, then auth.json.
pub fn resolve_key(auth: &AuthState, provider: Provider, env: Option<String>) -> Option<String> {
    env.filter(|k| !k.trim().is_empty())
        .or_else(|| auth.stored(provider).map(str::to_string))
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}

pub fn api_key(provider: Provider) -> Result<Option<String>> {
    let auth = load_auth()?;
    Ok(resolve_key(&auth, provider, std::env::var(env_var(provider)).ok()))
}

fn auth_path() -> Result<std::path::PathBuf> {
    Ok(ensure_finavatar_home()?.join("auth.json"))
}

pub fn load_auth() -> Result<AuthState> {
    let p = auth_path()?;
    if !p.exists() {
        return Ok(AuthState::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(serde_json::from_str(&s)?)
}

pub fn save_auth(auth: &AuthState) -> Result<()> {
    let p = auth_path()?;
    let s = serde_json::to_string_pretty(auth)?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

fn prompt_secret(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

/// Loose shape check so an obviously wrong paste is caught before saving.
pub fn check_key_shape(provider: Provider, key: &str) -> Result<()> {
    let (prefix, hint) = match provider {
        Provider::Gemini => ("AIza", "Gemini API keys start with AIza"),
        Provider::Anthropic => ("sk-ant-", "Anthropic keys start with sk-ant-"),
        Provider::OpenAI => ("sk-", "OpenAI keys start with sk-"),
    };
    if key.is_empty() {
        bail!("no key entered");
    }
    if !key.starts_with(prefix) {
        bail!("key didn't look right ({hint})");
    }
    Ok(())
}

pub fn paste_key(provider: Provider) -> Result<()> {
    let label = match provider {
        Provider::Gemini => "Paste Gemini API key",
        Provider::Anthropic => "Paste Anthropic API key",
        Provider::OpenAI => "Paste OpenAI API key",
    };
    let key = prompt_secret(label)?;
    check_key_shape(provider, &key)?;

    let mut auth = load_auth()?;
    match provider {
        Provider::Gemini => auth.gemini_api_key = Some(key),
        Provider::Anthropic => auth.anthropic_api_key = Some(key),
        Provider::OpenAI => auth.openai_api_key = Some(key),
    }
    save_auth(&auth)?;
    println!("Saved {} key to {}", provider.as_str(), auth_path()?.display());
    Ok(())
}

pub fn print_status() -> Result<()> {
    let auth = load_auth()?;
    for provider in [Provider::Gemini, Provider::Anthropic, Provider::OpenAI] {
        let source = if std::env::var(env_var(provider)).is_ok_and(|v| !v.trim().is_empty()) {
            env_var(provider)
        } else if auth.stored(provider).is_some() {
            "auth.json"
        } else {
            "not set"
        };
        println!("{:<10} {}", provider.as_str(), source);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_beats_file() {
        let auth = AuthState {
            gemini_api_key: Some("AIza-file".into()),
            ..Default::default()
        };
        assert_eq!(
            resolve_key(&auth, Provider::Gemini, Some("AIza-env".into())).as_deref(),
            Some("AIza-env")
        );
        assert_eq!(resolve_key(&auth, Provider::Gemini, Some("  ".into())).as_deref(), Some("AIza-file"));
        assert_eq!(resolve_key(&auth, Provider::OpenAI, None), None);
    }

    #[test]
    fn test_key_shapes() {
        assert!(check_key_shape(Provider::Anthropic, "sk-ant-abc").is_ok());
        assert!(check_key_shape(Provider::Anthropic, "sk-abc").is_err());
        assert!(check_key_shape(Provider::OpenAI, "sk-abc").is_ok());
        assert!(check_key_shape(Provider::Gemini, "").is_err());
    }
}
