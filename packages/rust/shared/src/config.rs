//! Application configuration for the question bank tools.
//!
//! User config lives at `~/.quizbank/quizbank.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{QuizBankError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "quizbank.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".quizbank";

// ---------------------------------------------------------------------------
// Config structs (matching quizbank.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Locations of the source document and the JSON files.
    #[serde(default)]
    pub data: DataConfig,

    /// Chat completion service settings.
    #[serde(default)]
    pub llm: LlmConfig,
}

/// `[data]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Exam document fed to the parser.
    #[serde(default = "default_source_document")]
    pub source_document: String,

    /// Where the parsed question bank is written and read.
    #[serde(default = "default_questions_path")]
    pub questions_path: String,

    /// Knowledge graph consulted by retrieval.
    #[serde(default = "default_knowledge_path")]
    pub knowledge_path: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source_document: default_source_document(),
            questions_path: default_questions_path(),
            knowledge_path: default_knowledge_path(),
        }
    }
}

fn default_source_document() -> String {
    "习题.md".into()
}
fn default_questions_path() -> String {
    "backend/questions.json".into()
}
fn default_knowledge_path() -> String {
    "backend/data.json".into()
}

/// `[llm]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model used for chat completions.
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.deepseek.com".into()
}
fn default_api_key_env() -> String {
    "DEEPSEEK_API_KEY".into()
}
fn default_model() -> String {
    "deepseek-chat".into()
}
fn default_timeout_secs() -> u64 {
    60
}

impl LlmConfig {
    /// Full URL of the `chat/completions` endpoint under `base_url`.
    pub fn completions_url(&self) -> Result<Url> {
        let mut base = Url::parse(&self.base_url).map_err(|e| {
            QuizBankError::config(format!("invalid llm.base_url '{}': {e}", self.base_url))
        })?;

        // Url::join replaces the last segment unless the path ends with '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        base.join("chat/completions")
            .map_err(|e| QuizBankError::config(format!("invalid completions URL: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.quizbank/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| QuizBankError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.quizbank/quizbank.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| QuizBankError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| QuizBankError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| QuizBankError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| QuizBankError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| QuizBankError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the API key env var is set and non-empty.
pub fn validate_api_key(config: &AppConfig) -> Result<()> {
    resolve_api_key(config).map(|_| ())
}

/// Read the API key from the env var named in `[llm].api_key_env`.
pub fn resolve_api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.llm.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(QuizBankError::config(format!(
            "API key not found. Set the {var_name} environment variable."
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("questions_path"));
        assert!(toml_str.contains("DEEPSEEK_API_KEY"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.data.questions_path, "backend/questions.json");
        assert_eq!(parsed.llm.timeout_secs, 60);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[data]
knowledge_path = "/srv/graph/data.json"

[llm]
model = "gpt-4o-mini"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.data.knowledge_path, "/srv/graph/data.json");
        assert_eq!(config.data.source_document, "习题.md");
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.api_key_env, "DEEPSEEK_API_KEY");
    }

    #[test]
    fn completions_url_keeps_base_path() {
        let mut llm = LlmConfig::default();
        assert_eq!(
            llm.completions_url().unwrap().as_str(),
            "https://api.deepseek.com/chat/completions"
        );

        llm.base_url = "https://openrouter.ai/api/v1".into();
        assert_eq!(
            llm.completions_url().unwrap().as_str(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[test]
    fn completions_url_rejects_garbage() {
        let llm = LlmConfig {
            base_url: "not a url".into(),
            ..LlmConfig::default()
        };
        assert!(llm.completions_url().is_err());
    }

    #[test]
    fn api_key_validation() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.llm.api_key_env = "QB_TEST_NONEXISTENT_KEY_12345".into();
        let result = validate_api_key(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key not found"));
    }
}
