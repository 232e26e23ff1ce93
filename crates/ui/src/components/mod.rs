pub mod footer;
pub mod transcript;

pub use footer::Footer;
pub use transcript::{MessageSpan, SVG_PLACEHOLDER, TranscriptLayout, TranscriptView, message_paragraphs};
