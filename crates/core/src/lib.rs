pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod markup;
pub mod navigator;
pub mod prepare;
pub mod scheduler;
pub mod transcript;
pub mod typer;

pub use config::{
    ClassConfig, Config, ConfigError, InitialMode, PlayerConfig, Preset, SelectorConfig, TimingConfig,
};
pub use error::{Error, Result};
pub use input::{InputMap, NavAction, PointerButton};
pub use logging::{LogFormat, init_logging};
pub use markup::{Document, ElementData, Namespace, NodeData, NodeId, Selector, SelectorError};
pub use navigator::{DisplayMode, Effect, Navigator, NavigatorOptions, NavigatorState};
pub use prepare::{PrepareOptions, PrepareReport, prepare_file, prepare_html};
pub use scheduler::{Scheduler, Task};
pub use transcript::{MessageElement, MessageKind, SelectorSet, TranscriptSequence};
pub use typer::{RevealProgress, RevealStep, RevealSteps, RevealToken, Typer};
