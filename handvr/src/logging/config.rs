use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use tracing::Level;

/// Subsystems that can be filtered independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogScope {
    Hand,
    Teleport,
    Replication,
    Physics,
    Input,
}

impl LogScope {
    pub const fn as_str(self) -> &'static str {
        match self {
            LogScope::Hand => "hand",
            LogScope::Teleport => "teleport",
            LogScope::Replication => "replication",
            LogScope::Physics => "physics",
            LogScope::Input => "input",
        }
    }
}

impl fmt::Display for LogScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogScope {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hand" => Ok(LogScope::Hand),
            "teleport" => Ok(LogScope::Teleport),
            "replication" | "net" => Ok(LogScope::Replication),
            "physics" => Ok(LogScope::Physics),
            "input" => Ok(LogScope::Input),
            _ => Err(()),
        }
    }
}

/// Global level plus per-scope overrides, e.g. `warn,hand=debug,teleport=trace`.
///
/// Unknown scopes and unparseable levels are skipped rather than rejected so a
/// stale environment variable never prevents startup.
#[derive(Debug, Clone)]
pub struct LogConfig {
    global_level: Level,
    scope_levels: HashMap<LogScope, Level>,
}

impl LogConfig {
    pub fn new() -> Self {
        Self {
            global_level: Level::WARN,
            scope_levels: HashMap::new(),
        }
    }

    pub fn from_env(env_var_name: &str) -> Self {
        Self::from_env_or(env_var_name, "")
    }

    /// Like [`Self::from_env`], but parses `default` when the variable is unset.
    pub fn from_env_or(env_var_name: &str, default: &str) -> Self {
        match std::env::var(env_var_name) {
            Ok(value) => Self::parse(&value),
            Err(_) => Self::parse(default),
        }
    }

    pub fn parse(config_str: &str) -> Self {
        let mut config = Self::new();

        for part in config_str.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.split_once('=') {
                Some((scope, level)) => {
                    if let (Ok(scope), Some(level)) =
                        (scope.trim().parse::<LogScope>(), parse_level(level.trim()))
                    {
                        config.scope_levels.insert(scope, level);
                    }
                }
                None => {
                    if let Some(level) = parse_level(part) {
                        config.global_level = level;
                    }
                }
            }
        }

        config
    }

    pub fn should_log(&self, scope: LogScope, level: Level) -> bool {
        let threshold = self.scope_levels.get(&scope).unwrap_or(&self.global_level);
        level <= *threshold
    }

    pub fn global_level(&self) -> Level {
        self.global_level
    }

    pub fn scope_level(&self, scope: LogScope) -> Option<Level> {
        self.scope_levels.get(&scope).copied()
    }

    pub fn set_global_level(&mut self, level: Level) {
        self.global_level = level;
    }

    pub fn set_scope_level(&mut self, scope: LogScope, level: Level) {
        self.scope_levels.insert(scope, level);
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_level(level_str: &str) -> Option<Level> {
    match level_str.to_ascii_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

/// Install the fmt subscriber and the scope filter read from `env_var_name`.
///
/// Safe to call more than once; only the first subscriber and filter stick.
pub fn init_logging(env_var_name: &str) -> LogConfig {
    init_logging_or(env_var_name, "")
}

/// [`init_logging`] with a scope filter used when `env_var_name` is unset,
/// e.g. `warn,replication=debug`.
pub fn init_logging_or(env_var_name: &str, default: &str) -> LogConfig {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let config = LogConfig::from_env_or(env_var_name, default);
    super::set_log_config(config.clone());
    config
}
