pub mod app;
pub mod components;
pub mod event_handler;
pub mod theme;

pub use app::App;
pub use event_handler::{EventHandler, KeyAction};
pub use theme::Theme;
