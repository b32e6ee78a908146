use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable holding the Telegram bot token.
pub const TOKEN_ENV: &str = "BOT_TOKEN";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub content: ContentConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    /// Drop updates that queued up while the bot was offline
    #[serde(default = "default_true")]
    pub skip_pending: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            skip_pending: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ContentConfig {
    /// Menu file replacing the built-in phrase collections
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

/// Pick the bot token: a non-empty environment value wins over the file.
pub fn resolve_token(env_token: Option<&str>, file_token: &str) -> Result<String> {
    let env_token = env_token.map(str::trim).unwrap_or_default();
    if !env_token.is_empty() {
        return Ok(env_token.to_string());
    }

    let file_token = file_token.trim();
    if !file_token.is_empty() {
        return Ok(file_token.to_string());
    }

    bail!(
        "{} is not set: put it in the environment, in .env, or in [telegram] bot_token",
        TOKEN_ENV
    )
}

impl Config {
    /// Load the config file and resolve the bot token.
    ///
    /// `explicit` is true when the path came from the command line. A missing
    /// default `config.toml` falls back to defaults, a missing explicit path
    /// is an error.
    pub fn load(path: &Path, explicit: bool) -> Result<Self> {
        let env_token = std::env::var(TOKEN_ENV).ok();
        Self::load_with_token(path, explicit, env_token.as_deref())
    }

    /// [`Config::load`] with the environment token passed in
    pub fn load_with_token(path: &Path, explicit: bool, env_token: Option<&str>) -> Result<Self> {
        let mut config = if path.exists() || explicit {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Config::default()
        };

        config.telegram.bot_token = resolve_token(env_token, &config.telegram.bot_token)?;

        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert!(config.telegram.bot_token.is_empty());
        assert!(config.telegram.skip_pending);
        assert!(config.content.path.is_none());
    }

    #[test]
    fn test_sections_parsed() {
        let config = Config::parse(
            r#"
            [telegram]
            bot_token = "123:abc"
            skip_pending = false

            [content]
            path = "my-menu.toml"
            "#,
        )
        .unwrap();

        assert_eq!(config.telegram.bot_token, "123:abc");
        assert!(!config.telegram.skip_pending);
        assert_eq!(config.content.path, Some(PathBuf::from("my-menu.toml")));
    }

    #[test]
    fn test_bad_toml_rejected() {
        assert!(Config::parse("[telegram\nbot_token = 1").is_err());
    }

    #[test]
    fn test_env_token_wins() {
        let token = resolve_token(Some("from-env"), "from-file").unwrap();
        assert_eq!(token, "from-env");
    }

    #[test]
    fn test_blank_env_token_falls_back_to_file() {
        let token = resolve_token(Some("   "), " from-file ").unwrap();
        assert_eq!(token, "from-file");
    }

    #[test]
    fn test_missing_token_is_fatal() {
        let err = resolve_token(None, "").unwrap_err();
        assert!(err.to_string().contains("BOT_TOKEN"));
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = Config::load(&path, true).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read config file"));
    }

    #[test]
    fn test_missing_default_path_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load_with_token(&path, false, Some("env-token")).unwrap();
        assert_eq!(config.telegram.bot_token, "env-token");
        assert!(config.telegram.skip_pending);
        assert!(config.content.path.is_none());
    }

    #[test]
    fn test_missing_default_path_without_token_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let err = Config::load_with_token(&path, false, None).unwrap_err();
        assert!(err.to_string().contains("BOT_TOKEN"));
    }

    #[test]
    fn test_file_token_used_when_env_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[telegram]\nbot_token = \"file-token\"").unwrap();

        let config = Config::load_with_token(file.path(), true, None).unwrap();
        assert_eq!(config.telegram.bot_token, "file-token");
    }
}
