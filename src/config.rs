use crate::error::ConfigError;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = ".config/bale_report.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Served under `/static`; generated reports are written here.
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            static_dir: PathBuf::from("static"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    /// Hosted OpenAI-compatible API (Groq by default).
    #[default]
    Remote,
    /// Local Ollama server.
    Ollama,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub backend: LlmBackend,
    pub remote: RemoteConfig,
    pub ollama: OllamaConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_string(),
            model: "llama3.1".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:8000");
        assert_eq!(cfg.server.static_dir, PathBuf::from("static"));
        assert_eq!(cfg.llm.backend, LlmBackend::Remote);
        assert_eq!(cfg.llm.remote.model, "llama-3.1-8b-instant");
        assert_eq!(cfg.llm.remote.api_key_env, "GROQ_API_KEY");
    }

    #[test]
    fn test_partial_config() {
        let cfg: Config = toml::from_str(
            r#"
            [server]
            static_dir = "/var/lib/bale/static"

            [llm]
            backend = "ollama"

            [llm.ollama]
            model = "qwen3:8b"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.server.bind, "127.0.0.1:8000");
        assert_eq!(cfg.server.static_dir, PathBuf::from("/var/lib/bale/static"));
        assert_eq!(cfg.llm.backend, LlmBackend::Ollama);
        assert_eq!(cfg.llm.ollama.model, "qwen3:8b");
        assert_eq!(cfg.llm.ollama.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let result: Result<Config, _> = toml::from_str("[llm]\nbackend = \"bedrock\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nbind = \"0.0.0.0:9000\"").unwrap();

        let cfg = Config::load(file.path()).unwrap();
        assert_eq!(cfg.server.bind, "0.0.0.0:9000");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        assert!(matches!(Config::load(&path), Err(ConfigError::Io(_))));
        let cfg = Config::load_or_default(&path).unwrap();
        assert_eq!(cfg.llm.backend, LlmBackend::Remote);
    }
}
