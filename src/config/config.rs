//! TOML configuration parsing and management.

use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::EnvironmentLoader;
use crate::command::{Command, CommandOptions, CommandRun};
use crate::dispatch::{Dispatcher, DispatcherOptions, Prefix};
use crate::model::{ChatClient, Snowflake};
use crate::precondition::{AccessPolicy, PreconditionNode};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/bck.toml";

/// Prefix as written in configuration.
///
/// ```toml
/// default_prefix = "!"
/// default_prefix = ["!", "?"]
/// default_prefix = { pattern = "^(?i)hey bot,?\\s*" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefixConfig {
    /// A literal prefix.
    Text(String),
    /// Several literal prefixes.
    Many(Vec<String>),
    /// A regular expression anchored at the start of the message.
    Pattern {
        /// The expression.
        pattern: String,
    },
}

impl Default for PrefixConfig {
    fn default() -> Self {
        Self::Text("!".to_string())
    }
}

impl PrefixConfig {
    /// Build the runtime prefix.
    pub fn to_prefix(&self) -> Result<Prefix> {
        Ok(match self {
            Self::Text(prefix) if prefix.is_empty() => Prefix::MentionOnly,
            Self::Text(prefix) => Prefix::Text(prefix.clone()),
            Self::Many(prefixes) => Prefix::Many(prefixes.clone()),
            Self::Pattern { pattern } => Prefix::Pattern(
                Regex::new(pattern).with_context(|| format!("Invalid prefix pattern: {pattern}"))?,
            ),
        })
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Markdown audit log; no audit log when unset.
    #[serde(default)]
    pub log_file: Option<String>,
    /// Level handed to the application's subscriber.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "INFO".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: None,
            log_level: default_log_level(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkConfig {
    /// Prefix used when no per-message resolver overrides it.
    pub default_prefix: PrefixConfig,
    /// Fold command names to lowercase before lookup.
    pub case_insensitive_commands: bool,
    /// Compare literal prefixes ignoring case.
    pub case_insensitive_prefixes: bool,
    /// Accept a mention of the bot as a prefix.
    pub mention_prefix: bool,
    /// Users allowed through `OwnerOnly`.
    pub owners: Vec<Snowflake>,
    /// Events buffered per subscriber.
    pub event_capacity: usize,
    /// Commands switched off at startup.
    pub disabled_commands: Vec<String>,
    /// Logging configuration.
    pub logging: LoggingConfig,
    /// Declared command options, bound to bodies with [`FrameworkConfig::bind`].
    pub commands: Vec<CommandOptions>,
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            default_prefix: PrefixConfig::default(),
            case_insensitive_commands: false,
            case_insensitive_prefixes: false,
            mention_prefix: true,
            owners: Vec::new(),
            event_capacity: 256,
            disabled_commands: Vec::new(),
            logging: LoggingConfig::default(),
            commands: Vec::new(),
        }
    }
}

impl FrameworkConfig {
    /// Check values serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.event_capacity == 0 {
            bail!("event_capacity must be greater than zero");
        }
        self.default_prefix.to_prefix()?;

        let mut seen = HashSet::new();
        for command in &self.commands {
            let name = command.name.to_lowercase();
            if name.is_empty() || name.chars().any(char::is_whitespace) {
                bail!("Invalid command name in configuration: '{}'", command.name);
            }
            if !seen.insert(name) {
                bail!("Command '{}' is declared more than once", command.name);
            }
            for entry in &command.preconditions {
                PreconditionNode::from(entry).validate().map_err(|error| {
                    anyhow!("Command '{}' has an invalid precondition: {}", command.name, error)
                })?;
            }
        }
        Ok(())
    }

    /// Pipeline switches described by this configuration.
    pub fn dispatcher_options(&self) -> DispatcherOptions {
        DispatcherOptions {
            case_insensitive_commands: self.case_insensitive_commands,
            case_insensitive_prefixes: self.case_insensitive_prefixes,
            mention_prefix: self.mention_prefix,
            access: AccessPolicy {
                owners: self.owners.clone(),
                disabled_commands: self.disabled_commands.iter().map(|name| name.to_lowercase()).collect(),
            },
            event_capacity: self.event_capacity,
        }
    }

    /// The configured prefix.
    pub fn prefix(&self) -> Result<Prefix> {
        self.default_prefix.to_prefix()
    }

    /// Build a dispatcher from this configuration.
    pub fn dispatcher(&self, client: Arc<dyn ChatClient>) -> Result<Dispatcher> {
        self.validate()?;
        Ok(Dispatcher::with_options(client, self.prefix()?, self.dispatcher_options()))
    }

    /// Declared options for `name`.
    pub fn command(&self, name: &str) -> Option<&CommandOptions> {
        self.commands
            .iter()
            .find(|options| options.name.eq_ignore_ascii_case(name))
    }

    /// Build the declared command `name` around `body`.
    pub fn bind(&self, name: &str, body: Arc<dyn CommandRun>) -> Result<Command> {
        let options = self
            .command(name)
            .with_context(|| format!("Command '{name}' is not declared in the configuration"))?;
        Ok(Command::with_body(options.clone(), body))
    }
}

/// Loads and manages TOML configuration.
#[derive(Debug)]
pub struct ConfigurationLoader {
    /// File the configuration came from, if any.
    pub config_path: Option<PathBuf>,
    /// The loaded configuration.
    pub config: FrameworkConfig,
}

impl ConfigurationLoader {
    /// Initialize configuration loader.
    ///
    /// # Arguments
    /// * `config_path` - Path to TOML config file. If None, `$BCK_CONFIG` and
    ///   then `config/bck.toml` are tried; defaults are used when neither exists.
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let explicit = config_path.is_some();
        let config_path = config_path
            .map(Path::to_path_buf)
            .or_else(|| EnvironmentLoader::default().config_path())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        if config_path.exists() {
            let config = Self::load_config(&config_path)?;
            info!(path = %config_path.display(), "loaded configuration");
            return Ok(Self {
                config_path: Some(config_path),
                config,
            });
        }

        if explicit {
            bail!("Config file not found: {}", config_path.display());
        }
        debug!(path = %config_path.display(), "no configuration file, using defaults");
        Ok(Self::from_config(FrameworkConfig::default()))
    }

    /// Create a configuration loader from a pre-parsed configuration.
    pub fn from_config(config: FrameworkConfig) -> Self {
        Self {
            config_path: None,
            config,
        }
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: FrameworkConfig = toml::from_str(content).context("Failed to parse TOML config")?;
        config.validate()?;
        Ok(Self::from_config(config))
    }

    /// Load configuration from TOML file.
    fn load_config(path: &Path) -> Result<FrameworkConfig> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: FrameworkConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Override values with those set in the environment.
    pub fn apply_environment(&mut self, env: &EnvironmentLoader) {
        if let Some(prefix) = env.prefix() {
            self.config.default_prefix = PrefixConfig::Text(prefix);
        }
        if let Some(owners) = env.owners() {
            self.config.owners = owners;
        }
        if let Some(level) = env.log_level() {
            self.config.logging.log_level = level;
        }
    }

    /// Get configuration value by dot-notation key.
    pub fn get_string(&self, key: &str) -> Option<String> {
        match key {
            "default_prefix" => match &self.config.default_prefix {
                PrefixConfig::Text(prefix) => Some(prefix.clone()),
                PrefixConfig::Many(prefixes) => Some(prefixes.join(" ")),
                PrefixConfig::Pattern { pattern } => Some(pattern.clone()),
            },
            "logging.log_file" => self.config.logging.log_file.clone(),
            "logging.log_level" => Some(self.config.logging.log_level.clone()),
            _ => None,
        }
    }

    /// Get numeric configuration value.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        match key {
            "event_capacity" => Some(self.config.event_capacity as u64),
            _ => None,
        }
    }

    /// Get boolean configuration value.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match key {
            "case_insensitive_commands" => Some(self.config.case_insensitive_commands),
            "case_insensitive_prefixes" => Some(self.config.case_insensitive_prefixes),
            "mention_prefix" => Some(self.config.mention_prefix),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InMemoryClient;
    use crate::precondition::BucketScope;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let loader = ConfigurationLoader::from_config(FrameworkConfig::default());
        assert_eq!(loader.get_string("default_prefix"), Some("!".to_string()));
        assert_eq!(loader.get_string("logging.log_level"), Some("INFO".to_string()));
        assert_eq!(loader.get_string("logging.log_file"), None);
        assert_eq!(loader.get_u64("event_capacity"), Some(256));
        assert_eq!(loader.get_bool("mention_prefix"), Some(true));
        assert_eq!(loader.get_bool("unknown"), None);
        assert!(loader.config.validate().is_ok());
    }

    #[test]
    fn test_config_from_toml() {
        let loader = ConfigurationLoader::from_toml(
            r#"
default_prefix = ["!", "?"]
case_insensitive_commands = true
owners = [100000000000000001]
disabled_commands = ["Purge"]

[logging]
log_file = "/tmp/bck-audit.md"

[[commands]]
name = "ban"
run_in = ["guild"]
required_user_permissions = ["BAN_MEMBERS"]
cooldown = { delay = 5000, scope = "guild" }
"#,
        )
        .unwrap();
        let config = &loader.config;

        assert!(matches!(config.prefix().unwrap(), Prefix::Many(ref prefixes) if prefixes.len() == 2));
        assert_eq!(config.logging.log_level, "INFO");

        let options = config.dispatcher_options();
        assert!(options.case_insensitive_commands);
        assert!(options.mention_prefix);
        assert!(options.access.is_owner(100000000000000001));
        assert!(options.access.disabled_commands.contains("purge"));

        let ban = config.command("BAN").unwrap();
        assert_eq!(ban.cooldown.as_ref().unwrap().scope, BucketScope::Guild);
    }

    #[test]
    fn test_pattern_prefix() {
        let config: FrameworkConfig = toml::from_str(r#"default_prefix = { pattern = "^(?i)hey bot,?\\s*" }"#).unwrap();
        let prefix = config.prefix().unwrap();
        assert_eq!(prefix.find("Hey Bot, ping", false), Some("Hey Bot, "));

        let config: FrameworkConfig = toml::from_str(r#"default_prefix = { pattern = "(" }"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_errors() {
        let result = ConfigurationLoader::from_toml("event_capacity = 0");
        assert!(result.is_err());

        let result = ConfigurationLoader::from_toml(
            r#"
[[commands]]
name = "ping"

[[commands]]
name = "PING"
"#,
        );
        let message = result.unwrap_err().to_string();
        assert!(message.contains("declared more than once"));
    }

    #[test]
    fn test_malformed_precondition_payloads_are_rejected() {
        let cases = [
            r#"preconditions = [{ name = "HasPermission", context = { permissions = ["BAN_MEMBER"] } }]"#,
            r#"preconditions = [{ any = ["OwnerOnly", "HasPermission"] }]"#,
            r#"preconditions = [{ all = [{ name = "Cooldown", context = { delayy = 5000 } }] }]"#,
            r#"preconditions = ["ClientPermissions"]"#,
        ];
        for case in cases {
            let result = ConfigurationLoader::from_toml(&format!("[[commands]]\nname = \"ban\"\n{case}\n"));
            let message = result.unwrap_err().to_string();
            assert!(message.contains("Command 'ban' has an invalid precondition"), "{case}: {message}");
        }

        let loader = ConfigurationLoader::from_toml(
            r#"
[[commands]]
name = "ban"
preconditions = ["GuildOnly", { name = "HasPermission", context = { permissions = ["BAN_MEMBERS"] } }]
"#,
        );
        assert!(loader.is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "default_prefix = \"$\"\nmention_prefix = false").unwrap();

        let loader = ConfigurationLoader::new(Some(file.path())).unwrap();
        assert_eq!(loader.config_path.as_deref(), Some(file.path()));
        assert_eq!(loader.get_string("default_prefix"), Some("$".to_string()));
        assert_eq!(loader.get_bool("mention_prefix"), Some(false));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConfigurationLoader::new(Some(&dir.path().join("missing.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_bind_declared_command() {
        struct Noop;

        #[async_trait::async_trait]
        impl CommandRun for Noop {
            async fn run(
                &self,
                _message: &crate::model::Message,
                _args: &mut crate::args::Args,
                _context: &crate::model::RunContext,
            ) -> anyhow::Result<serde_json::Value> {
                Ok(serde_json::Value::Null)
            }
        }

        let loader = ConfigurationLoader::from_toml(
            r#"
[[commands]]
name = "Kick"
aliases = ["boot"]
"#,
        )
        .unwrap();

        let dispatcher = loader.config.dispatcher(Arc::new(InMemoryClient::new(1))).unwrap();
        let command = loader.config.bind("kick", Arc::new(Noop)).unwrap();
        assert_eq!(command.name(), "kick");
        dispatcher.commands().register(Arc::new(command)).unwrap();
        assert!(dispatcher.commands().contains("boot"));

        assert!(loader.config.bind("ban", Arc::new(Noop)).is_err());
    }
}
