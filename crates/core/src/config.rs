use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::Result;
use crate::markup::{Selector, SelectorError};
use crate::transcript::SelectorSet;

/// Display mode the player starts in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InitialMode {
    /// Every message visible (default)
    #[default]
    ShowAll,
    /// One message at a time under viewer control
    StepThrough,
}

impl InitialMode {
    pub const VALUES: &[InitialMode] = &[InitialMode::ShowAll, InitialMode::StepThrough];

    /// Query parameter carrying the display mode
    pub const QUERY_KEY: &'static str = "dm";

    pub fn as_str(&self) -> &'static str {
        match self {
            InitialMode::ShowAll => "show-all",
            InitialMode::StepThrough => "step-through",
        }
    }

    /// Read the mode from a page query string.
    ///
    /// Accepts a bare query (`dm=i`), a leading `?`, or a full URL. `dm=i`
    /// selects step-through, any other `dm` value show-all; `None` when the
    /// parameter is absent.
    pub fn from_query(query: &str) -> Option<Self> {
        let query = query.trim();
        let pairs = match url::Url::parse(query) {
            Ok(url) if url.has_host() || url.scheme() == "file" => url.query().unwrap_or("").to_string(),
            _ => query.trim_start_matches('?').to_string(),
        };

        url::form_urlencoded::parse(pairs.as_bytes())
            .find(|(key, _)| key == Self::QUERY_KEY)
            .map(|(_, value)| if value == "i" { InitialMode::StepThrough } else { InitialMode::ShowAll })
    }
}

impl std::fmt::Display for InitialMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for InitialMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "show-all" | "all" => Ok(InitialMode::ShowAll),
            "step-through" | "interactive" | "i" => Ok(InitialMode::StepThrough),
            _ => Err(ConfigError::InvalidMode(s.to_string())),
        }
    }
}

/// Built-in configurations for the page layouts chatreel knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Saved Doubao chat page; each matched message is typed as a whole
    #[default]
    Doubao,
    /// Doubao page published as docs; wrapper rows toggled, content region typed
    DoubaoDocs,
    /// Slide-style transcript: no typing, mouse advance, `r` restarts
    Slides,
}

impl Preset {
    pub const VALUES: &[Preset] = &[Preset::Doubao, Preset::DoubaoDocs, Preset::Slides];

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Doubao => "doubao",
            Preset::DoubaoDocs => "doubao-docs",
            Preset::Slides => "slides",
        }
    }

    /// Full configuration for this preset
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        match self {
            Preset::Doubao => {}
            Preset::DoubaoDocs => {
                config.selectors.wrapper_depth = 3;
                config.selectors.content = Some(r#"div[data-testid="message_content"]"#.to_string());
            }
            Preset::Slides => {
                config.player.initial_mode = InitialMode::StepThrough;
                config.player.reverse_layout = false;
                config.player.mouse_advance = true;
                config.player.restart_key_resets = true;
                config.player.typing = false;
                config.timing.reply_highlight_ms = 500;
                config.selectors.message_list = None;
                config.selectors.message = ".container-ncFTrL".to_string();
                config.selectors.sent_marker = None;
            }
        }
        config
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "doubao" => Ok(Preset::Doubao),
            "doubao-docs" => Ok(Preset::DoubaoDocs),
            "slides" => Ok(Preset::Slides),
            _ => Err(ConfigError::InvalidPreset(s.to_string())),
        }
    }
}

/// Player behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerConfig {
    /// Mode applied when the player starts
    pub initial_mode: InitialMode,

    /// Write `flex-direction: column-reverse` on the message list in step-through mode
    pub reverse_layout: bool,

    /// Primary mouse button advances
    pub mouse_advance: bool,

    /// `r` restarts step-through instead of switching to show-all
    pub restart_key_resets: bool,

    /// Type replies character by character; when false replies appear at once
    pub typing: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            initial_mode: InitialMode::default(),
            reverse_layout: true,
            mouse_advance: false,
            restart_key_resets: false,
            typing: true,
        }
    }
}

/// Animation delays, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    pub typing_delay_ms: u64,
    pub reply_highlight_ms: u64,
    pub retreat_highlight_ms: u64,
    pub send_animation_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self { typing_delay_ms: 10, reply_highlight_ms: 300, retreat_highlight_ms: 500, send_animation_ms: 1000 }
    }
}

impl TimingConfig {
    pub fn typing_delay(&self) -> Duration {
        Duration::from_millis(self.typing_delay_ms)
    }

    pub fn reply_highlight(&self) -> Duration {
        Duration::from_millis(self.reply_highlight_ms)
    }

    pub fn retreat_highlight(&self) -> Duration {
        Duration::from_millis(self.retreat_highlight_ms)
    }

    pub fn send_animation(&self) -> Duration {
        Duration::from_millis(self.send_animation_ms)
    }
}

/// CSS selectors locating the transcript in the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectorConfig {
    /// Container whose flex direction is switched
    pub message_list: Option<String>,

    /// One match per chat turn
    pub message: String,

    /// Ancestors to climb from a matched message to the element that is shown and hidden
    pub wrapper_depth: usize,

    /// Present inside user-sent messages
    pub sent_marker: Option<String>,

    /// Typing region inside a message; the message itself when unset
    pub content: Option<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            message_list: Some(r#"[data-testid="message-list"]"#.to_string()),
            message: r#"div[data-testid="union_message"]"#.to_string(),
            wrapper_depth: 0,
            sent_marker: Some(r#"div[data-testid="send_message"]"#.to_string()),
            content: None,
        }
    }
}

/// Class names toggled for visual pulses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassConfig {
    pub highlight: String,
    pub send_animation: String,
}

impl Default for ClassConfig {
    fn default() -> Self {
        Self { highlight: "highlight".to_string(), send_animation: "send-message-animation".to_string() }
    }
}

/// File logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileLoggingConfig {
    pub enabled: bool,
    pub level: String,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self { enabled: false, level: "debug".to_string() }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directive for stderr output
    pub level: String,
    /// `pretty`, `json` or `compact`
    pub format: String,
    pub file: FileLoggingConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "warn".to_string(), format: "pretty".to_string(), file: FileLoggingConfig::default() }
    }
}

/// Root configuration structure for chatreel.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub player: PlayerConfig,
    pub timing: TimingConfig,
    pub selectors: SelectorConfig,
    pub classes: ClassConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Default config file name looked up in the working directory
    pub const FILE_NAME: &'static str = "chatreel.toml";

    /// Load configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Override the initial mode from a page query string, if it names one
    pub fn apply_query(&mut self, query: &str) {
        if let Some(mode) = InitialMode::from_query(query) {
            self.player.initial_mode = mode;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.timing.typing_delay_ms == 0 {
            return Err(ConfigError::ZeroTypingDelay.into());
        }
        if self.classes.highlight.trim().is_empty() || self.classes.send_animation.trim().is_empty() {
            return Err(ConfigError::EmptyClassName.into());
        }

        SelectorSet::compile(&self.selectors)?;
        Ok(())
    }

    /// Get example configuration (as a string)
    pub fn example() -> &'static str {
        r#"# chatreel configuration
# Every key is optional; the values below are the defaults.

[player]
# "show-all" or "step-through" (a `dm=i` query parameter also selects step-through)
initial_mode = "show-all"
# Reverse the message list while stepping so the newest message stays anchored
reverse_layout = true
# Left mouse button advances
mouse_advance = false
# When true, `r` restarts step-through instead of showing everything
restart_key_resets = false
# Type replies character by character
typing = true

[timing]
typing_delay_ms = 10
reply_highlight_ms = 300
retreat_highlight_ms = 500
send_animation_ms = 1000

[selectors]
message_list = '[data-testid="message-list"]'
message = 'div[data-testid="union_message"]'
# Ancestors to climb from a matched message to the element shown and hidden
wrapper_depth = 0
sent_marker = 'div[data-testid="send_message"]'
# Typing region inside each message (defaults to the message itself)
# content = 'div[data-testid="message_content"]'

[classes]
highlight = "highlight"
send_animation = "send-message-animation"

[logging]
level = "warn"
# "pretty", "json" or "compact"
format = "pretty"

[logging.file]
enabled = false
level = "debug"
"#
    }
}

pub(crate) fn compile_field(field: &'static str, selector: &str) -> std::result::Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|source| ConfigError::InvalidSelector { field, source })
}

/// Configuration-specific errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid display mode
    #[error("invalid display mode: {0}")]
    InvalidMode(String),

    /// Unknown preset name
    #[error("invalid preset: {0}")]
    InvalidPreset(String),

    /// Selector that does not compile
    #[error("invalid selector in {field}: {source}")]
    InvalidSelector {
        field: &'static str,
        #[source]
        source: SelectorError,
    },

    #[error("typing_delay_ms must be greater than zero")]
    ZeroTypingDelay,

    #[error("class names must not be empty")]
    EmptyClassName,

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::TomlParse(err.to_string())
    }
}
