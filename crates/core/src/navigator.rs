//! Message-reveal state machine.
//!
//! A [`Navigator`] owns the live document, the captured transcript and the
//! one [`Typer`] that may be running. Every operation is infallible: requests
//! outside the transcript are ignored. Deferred work (typing ticks, pulse
//! class removals) goes through the [`Scheduler`] and runs in [`Navigator::tick`].

use std::time::Duration;

use tracing::debug;

use crate::config::{Config, InitialMode};
use crate::error::Result;
use crate::input::NavAction;
use crate::markup::{Document, NodeId};
use crate::scheduler::{Scheduler, Task};
use crate::transcript::{MessageKind, SelectorSet, TranscriptSequence};
use crate::typer::{RevealProgress, Typer};

const DISPLAY_SHOWN: &str = "block";
const DISPLAY_HIDDEN: &str = "none";
const DIRECTION_NORMAL: &str = "column";
const DIRECTION_REVERSED: &str = "column-reverse";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    ShowAll,
    StepThrough,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::ShowAll => "show-all",
            DisplayMode::StepThrough => "step-through",
        }
    }
}

impl From<InitialMode> for DisplayMode {
    fn from(mode: InitialMode) -> Self {
        match mode {
            InitialMode::ShowAll => DisplayMode::ShowAll,
            InitialMode::StepThrough => DisplayMode::StepThrough,
        }
    }
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Position and mode of the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigatorState {
    /// `None` only for an empty transcript
    pub current_index: Option<usize>,
    pub mode: DisplayMode,
    /// A typing run is in flight for the current message
    pub is_typing: bool,
}

/// Request for the host, drained with [`Navigator::take_effects`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    ScrollIntoView(NodeId),
}

/// Behavior knobs, resolved from [`Config`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigatorOptions {
    pub initial_mode: InitialMode,
    pub reverse_layout: bool,
    pub typing: bool,
    pub typing_delay: Duration,
    pub reply_highlight: Duration,
    pub retreat_highlight: Duration,
    pub send_animation: Duration,
    pub highlight_class: String,
    pub send_animation_class: String,
}

impl Default for NavigatorOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl NavigatorOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            initial_mode: config.player.initial_mode,
            reverse_layout: config.player.reverse_layout,
            typing: config.player.typing,
            typing_delay: config.timing.typing_delay(),
            reply_highlight: config.timing.reply_highlight(),
            retreat_highlight: config.timing.retreat_highlight(),
            send_animation: config.timing.send_animation(),
            highlight_class: config.classes.highlight.clone(),
            send_animation_class: config.classes.send_animation.clone(),
        }
    }
}

#[derive(Debug)]
pub struct Navigator {
    document: Document,
    transcript: TranscriptSequence,
    state: NavigatorState,
    typer: Typer,
    scheduler: Scheduler,
    options: NavigatorOptions,
    clock: Duration,
    effects: Vec<Effect>,
}

impl Navigator {
    /// Build a navigator and apply the initial display mode to the document
    pub fn new(document: Document, transcript: TranscriptSequence, options: NavigatorOptions) -> Self {
        let initial = options.initial_mode;
        let state = NavigatorState {
            current_index: if transcript.is_empty() { None } else { Some(0) },
            mode: DisplayMode::ShowAll,
            is_typing: false,
        };
        let mut navigator = Self {
            document,
            transcript,
            state,
            typer: Typer::new(),
            scheduler: Scheduler::new(),
            options,
            clock: Duration::ZERO,
            effects: Vec::new(),
        };

        match initial {
            InitialMode::ShowAll => navigator.show_all(),
            InitialMode::StepThrough => navigator.initialize_step_through(),
        }
        navigator
    }

    /// Capture the transcript with the configured selectors and build a navigator
    pub fn from_config(document: Document, config: &Config) -> Result<Self> {
        let selectors = SelectorSet::compile(&config.selectors)?;
        let transcript = TranscriptSequence::capture(&document, &selectors);
        Ok(Self::new(document, transcript, NavigatorOptions::from_config(config)))
    }

    pub fn state(&self) -> NavigatorState {
        self.state
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn transcript(&self) -> &TranscriptSequence {
        &self.transcript
    }

    pub fn options(&self) -> &NavigatorOptions {
        &self.options
    }

    /// Virtual time of the last [`Navigator::tick`]
    pub fn clock(&self) -> Duration {
        self.clock
    }

    /// When the next deferred task is due
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    /// Scroll requests accumulated since the last call
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.transcript.get(index).is_some_and(|m| self.document.is_rendered(m.node))
    }

    pub fn visible_indices(&self) -> Vec<usize> {
        (0..self.transcript.len()).filter(|i| self.is_visible(*i)).collect()
    }

    /// The message list is laid out bottom-up
    pub fn is_reversed(&self) -> bool {
        self.transcript
            .list()
            .and_then(|list| self.document.style_property(list, "flex-direction"))
            .is_some_and(|direction| direction == DIRECTION_REVERSED)
    }

    pub fn dispatch(&mut self, action: NavAction) {
        debug!(%action, "dispatch");
        match action {
            NavAction::Advance => self.advance(),
            NavAction::Retreat => self.retreat(),
            NavAction::StepThrough | NavAction::Restart => self.initialize_step_through(),
            NavAction::ShowAll => self.show_all(),
        }
    }

    /// Enter step-through with only the first message visible
    pub fn initialize_step_through(&mut self) {
        self.fast_forward();

        self.state.mode = DisplayMode::StepThrough;
        if self.options.reverse_layout
            && let Some(list) = self.transcript.list()
        {
            self.document.set_style_property(list, "flex-direction", DIRECTION_REVERSED);
        }
        for index in 0..self.transcript.len() {
            self.set_visible(index, index == 0);
        }

        self.state.current_index = if self.transcript.is_empty() { None } else { Some(0) };
        self.state.is_typing = false;
        if let Some(first) = self.transcript.get(0) {
            self.effects.push(Effect::ScrollIntoView(first.node));
        }
        debug!(messages = self.transcript.len(), "step-through initialized");
    }

    /// Show every message. The current index is kept.
    pub fn show_all(&mut self) {
        self.fast_forward();

        self.state.mode = DisplayMode::ShowAll;
        for index in 0..self.transcript.len() {
            self.set_visible(index, true);
        }
        if let Some(list) = self.transcript.list() {
            self.document.set_style_property(list, "flex-direction", DIRECTION_NORMAL);
        }
        debug!("showing all messages");
    }

    /// Finish the running reveal, or reveal the next message
    pub fn advance(&mut self) {
        if self.state.mode != DisplayMode::StepThrough {
            return;
        }
        if self.state.is_typing {
            self.fast_forward();
            return;
        }

        let Some(current) = self.state.current_index else {
            return;
        };
        let next = current + 1;
        let Some(message) = self.transcript.get(next) else {
            return;
        };
        let (node, pulse, content, kind) = (message.node, message.pulse_target(), message.content, message.kind);

        self.state.current_index = Some(next);
        self.set_visible(next, true);
        debug!(index = next, %kind, "advance");

        match kind {
            MessageKind::Sent => {
                let class = self.options.send_animation_class.clone();
                self.pulse(pulse, class, self.options.send_animation);
                self.effects.push(Effect::ScrollIntoView(node));
            }
            MessageKind::Reply => {
                self.document.add_class(pulse, &self.options.highlight_class);
                match content.filter(|_| self.options.typing) {
                    Some(content) => self.start_typing(next, content),
                    None => self.reply_revealed(next),
                }
            }
        }
    }

    /// Step back one message. A reveal in flight is finalized first.
    pub fn retreat(&mut self) {
        if self.state.mode != DisplayMode::StepThrough {
            return;
        }
        let Some(current) = self.state.current_index.filter(|index| *index > 0) else {
            return;
        };

        self.fast_forward();
        self.set_visible(current, false);
        let previous = current - 1;
        self.state.current_index = Some(previous);
        self.set_visible(previous, true);
        debug!(index = previous, "retreat");

        if let Some(message) = self.transcript.get(previous) {
            let (node, pulse) = (message.node, message.pulse_target());
            let class = self.options.highlight_class.clone();
            self.pulse(pulse, class, self.options.retreat_highlight);
            self.effects.push(Effect::ScrollIntoView(node));
        }
    }

    /// Run every deferred task due at or before `now`.
    ///
    /// Tasks run at their own deadline, so follow-up ticks keep the typing
    /// pace even when the host calls late.
    pub fn tick(&mut self, now: Duration) {
        while let Some((due, task)) = self.scheduler.pop_due(now) {
            self.clock = self.clock.max(due);
            match task {
                Task::Type { token } => match self.typer.tick(&mut self.document, token) {
                    RevealProgress::Pending(token) => {
                        self.scheduler.schedule(self.clock, self.options.typing_delay, Task::Type { token });
                    }
                    RevealProgress::Complete => {
                        self.state.is_typing = false;
                        if let Some(index) = self.state.current_index {
                            self.reply_revealed(index);
                        }
                    }
                    RevealProgress::Stale => {}
                },
                Task::RemoveClass { node, class } => self.document.remove_class(node, &class),
            }
        }
        self.clock = self.clock.max(now);
    }

    fn start_typing(&mut self, index: usize, content: NodeId) {
        let Some(markup) = self
            .transcript
            .get_mut(index)
            .and_then(|m| m.capture_markup(&self.document))
            .map(str::to_string)
        else {
            return;
        };

        match self.typer.start(&mut self.document, content, &markup) {
            RevealProgress::Pending(token) => {
                self.state.is_typing = true;
                self.scheduler.schedule(self.clock, self.options.typing_delay, Task::Type { token });
            }
            RevealProgress::Complete | RevealProgress::Stale => self.reply_revealed(index),
        }
    }

    /// Replace the in-flight reveal with the full markup. Returns false when
    /// nothing was typing.
    fn fast_forward(&mut self) -> bool {
        self.state.is_typing = false;
        if !self.typer.finish(&mut self.document) {
            return false;
        }
        if let Some(index) = self.state.current_index {
            debug!(index, "reveal fast-forwarded");
            self.reply_revealed(index);
        }
        true
    }

    /// Schedule the end of the reply highlight and scroll to the message
    fn reply_revealed(&mut self, index: usize) {
        let Some(message) = self.transcript.get(index) else {
            return;
        };
        let (node, pulse) = (message.node, message.pulse_target());
        let class = self.options.highlight_class.clone();
        self.scheduler.schedule(self.clock, self.options.reply_highlight, Task::RemoveClass { node: pulse, class });
        self.effects.push(Effect::ScrollIntoView(node));
    }

    /// Add `class` now and remove it after `duration`
    fn pulse(&mut self, node: NodeId, class: String, duration: Duration) {
        self.document.add_class(node, &class);
        self.scheduler.schedule(self.clock, duration, Task::RemoveClass { node, class });
    }

    fn set_visible(&mut self, index: usize, visible: bool) {
        if let Some(message) = self.transcript.get(index) {
            let display = if visible { DISPLAY_SHOWN } else { DISPLAY_HIDDEN };
            self.document.set_style_property(message.node, "display", display);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;

    const SCENARIO: &str = concat!(
        r#"<div data-testid="message-list">"#,
        r#"<div data-testid="union_message"><div data-testid="send_message">Hi</div></div>"#,
        r#"<div data-testid="union_message"><p>Hello</p></div>"#,
        r#"<div data-testid="union_message"><div data-testid="send_message">Bye</div></div>"#,
        r#"</div>"#,
    );

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn navigator(html: &str, mode: InitialMode) -> Navigator {
        let mut config = Config::default();
        config.player.initial_mode = mode;
        Navigator::from_config(Document::parse(html), &config).unwrap()
    }

    /// `n` messages alternating sent / reply
    fn chat(n: usize) -> String {
        let mut html = String::from(r#"<div data-testid="message-list">"#);
        for i in 0..n {
            if i % 2 == 0 {
                html.push_str(&format!(
                    r#"<div data-testid="union_message"><div data-testid="send_message">q{i}</div></div>"#
                ));
            } else {
                html.push_str(&format!(r#"<div data-testid="union_message"><p>answer {i}</p></div>"#));
            }
        }
        html.push_str("</div>");
        html
    }

    fn settle(nav: &mut Navigator) {
        let later = nav.clock() + Duration::from_secs(60);
        nav.tick(later);
    }

    fn message_html(nav: &Navigator, index: usize) -> String {
        let node = nav.transcript().get(index).unwrap().node;
        nav.document().inner_html(node)
    }

    #[test]
    fn test_initialize_shows_only_first() {
        for n in 0..6 {
            let mut nav = navigator(&chat(n), InitialMode::ShowAll);
            nav.initialize_step_through();
            let state = nav.state();
            assert_eq!(state.mode, DisplayMode::StepThrough);
            assert!(!state.is_typing);
            if n == 0 {
                assert_eq!(state.current_index, None);
                assert!(nav.visible_indices().is_empty());
            } else {
                assert_eq!(state.current_index, Some(0));
                assert_eq!(nav.visible_indices(), vec![0]);
            }
        }
    }

    #[test]
    fn test_advance_k_times() {
        let n = 5;
        for k in 0..=n + 2 {
            let mut nav = navigator(&chat(n), InitialMode::StepThrough);
            for _ in 0..k {
                nav.advance();
                settle(&mut nav);
            }
            let expected = k.min(n - 1);
            assert_eq!(nav.state().current_index, Some(expected));
            assert_eq!(nav.visible_indices(), (0..=expected).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_retreat_at_first_is_noop() {
        let mut nav = navigator(&chat(3), InitialMode::StepThrough);
        let before = nav.document().to_html();
        nav.retreat();
        assert_eq!(nav.state().current_index, Some(0));
        assert_eq!(nav.document().to_html(), before);
    }

    #[test]
    fn test_show_all_round_trip() {
        let mut nav = navigator(&chat(4), InitialMode::ShowAll);
        nav.show_all();
        nav.initialize_step_through();
        nav.advance();
        settle(&mut nav);
        nav.advance();
        nav.show_all();
        assert_eq!(nav.visible_indices(), vec![0, 1, 2, 3]);
        assert_eq!(nav.state().mode, DisplayMode::ShowAll);
        assert_eq!(nav.state().current_index, Some(2));
    }

    #[test]
    fn test_scenario_typing_and_fast_forward() {
        let mut nav = navigator(SCENARIO, InitialMode::ShowAll);
        nav.initialize_step_through();
        assert_eq!(nav.visible_indices(), vec![0]);
        assert_eq!(nav.document().text_content(nav.transcript().get(0).unwrap().node), "Hi");

        nav.advance();
        assert!(nav.state().is_typing);
        assert_eq!(nav.state().current_index, Some(1));
        assert_eq!(message_html(&nav, 1), "<p></p>");

        let mut frames = Vec::new();
        for step in 1..=3 {
            nav.tick(ms(10 * step));
            frames.push(message_html(&nav, 1));
        }
        assert_eq!(frames, vec!["<p>H</p>", "<p>He</p>", "<p>Hel</p>"]);

        nav.advance();
        assert!(!nav.state().is_typing);
        assert_eq!(nav.state().current_index, Some(1));
        assert_eq!(message_html(&nav, 1), "<p>Hello</p>");

        nav.tick(ms(1_000));
        assert_eq!(message_html(&nav, 1), "<p>Hello</p>");

        nav.advance();
        assert_eq!(nav.state().current_index, Some(2));
        assert!(!nav.state().is_typing);
        assert!(nav.is_visible(2));
        assert_eq!(message_html(&nav, 2), r#"<div data-testid="send_message">Bye</div>"#);

        nav.advance();
        assert_eq!(nav.state().current_index, Some(2));
        assert_eq!(nav.visible_indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_uninterrupted_typing_reaches_full_markup() {
        let mut nav = navigator(SCENARIO, InitialMode::StepThrough);
        nav.advance();
        let mut frames = vec![message_html(&nav, 1)];
        for step in 1..=5 {
            nav.tick(ms(10 * step));
            frames.push(message_html(&nav, 1));
        }
        assert_eq!(frames, vec!["<p></p>", "<p>H</p>", "<p>He</p>", "<p>Hel</p>", "<p>Hell</p>", "<p>Hello</p>"]);
        assert!(!nav.state().is_typing);
    }

    #[test]
    fn test_late_tick_catches_up() {
        let mut nav = navigator(SCENARIO, InitialMode::StepThrough);
        nav.advance();
        nav.tick(ms(35));
        assert_eq!(message_html(&nav, 1), "<p>Hel</p>");
        assert_eq!(nav.next_deadline(), Some(ms(40)));
    }

    #[test]
    fn test_reply_highlight_pulse() {
        let mut nav = navigator(SCENARIO, InitialMode::StepThrough);
        let reply = nav.transcript().get(1).unwrap().node;
        nav.advance();
        assert!(nav.document().has_class(reply, "highlight"));

        nav.tick(ms(50));
        assert!(!nav.state().is_typing);
        assert!(nav.document().has_class(reply, "highlight"));

        nav.tick(ms(349));
        assert!(nav.document().has_class(reply, "highlight"));
        nav.tick(ms(350));
        assert!(!nav.document().has_class(reply, "highlight"));
    }

    #[test]
    fn test_sent_message_pulse_and_scroll() {
        let mut nav = navigator(&chat(3), InitialMode::StepThrough);
        assert_eq!(nav.take_effects(), vec![Effect::ScrollIntoView(nav.transcript().get(0).unwrap().node)]);

        nav.advance();
        settle(&mut nav);
        nav.take_effects();

        let sent = nav.transcript().get(2).unwrap().node;
        let clock = nav.clock();
        nav.advance();
        assert!(!nav.state().is_typing);
        assert!(nav.document().has_class(sent, "send-message-animation"));
        assert_eq!(nav.take_effects(), vec![Effect::ScrollIntoView(sent)]);

        nav.tick(clock + ms(999));
        assert!(nav.document().has_class(sent, "send-message-animation"));
        nav.tick(clock + ms(1000));
        assert!(!nav.document().has_class(sent, "send-message-animation"));
    }

    #[test]
    fn test_advance_ignored_in_show_all() {
        let mut nav = navigator(&chat(3), InitialMode::ShowAll);
        nav.advance();
        nav.retreat();
        assert_eq!(nav.state().current_index, Some(0));
        assert_eq!(nav.state().mode, DisplayMode::ShowAll);
        assert_eq!(nav.visible_indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_retreat_while_typing_finalizes_reveal() {
        let mut nav = navigator(SCENARIO, InitialMode::StepThrough);
        nav.advance();
        nav.tick(ms(20));
        nav.retreat();

        let state = nav.state();
        assert!(!state.is_typing);
        assert_eq!(state.current_index, Some(0));
        assert_eq!(nav.visible_indices(), vec![0]);
        assert_eq!(message_html(&nav, 1), "<p>Hello</p>");

        settle(&mut nav);
        assert_eq!(message_html(&nav, 1), "<p>Hello</p>");
        let first = nav.transcript().get(0).unwrap().node;
        assert!(!nav.document().has_class(first, "highlight"));
    }

    #[test]
    fn test_retreat_highlights_previous() {
        let mut nav = navigator(&chat(3), InitialMode::StepThrough);
        nav.advance();
        settle(&mut nav);
        let clock = nav.clock();
        nav.retreat();

        let first = nav.transcript().get(0).unwrap().node;
        assert!(nav.document().has_class(first, "highlight"));
        assert!(!nav.is_visible(1));
        nav.tick(clock + ms(500));
        assert!(!nav.document().has_class(first, "highlight"));
    }

    #[test]
    fn test_mode_switch_while_typing_finalizes_reveal() {
        let mut nav = navigator(SCENARIO, InitialMode::StepThrough);
        nav.advance();
        nav.tick(ms(10));
        nav.show_all();
        assert!(!nav.state().is_typing);
        assert_eq!(message_html(&nav, 1), "<p>Hello</p>");

        nav.initialize_step_through();
        nav.advance();
        nav.tick(ms(30));
        nav.initialize_step_through();
        assert_eq!(message_html(&nav, 1), "<p>Hello</p>");
        assert_eq!(nav.visible_indices(), vec![0]);
        settle(&mut nav);
        assert_eq!(message_html(&nav, 1), "<p>Hello</p>");
    }

    #[test]
    fn test_retype_uses_cached_markup() {
        let mut nav = navigator(SCENARIO, InitialMode::StepThrough);
        nav.advance();
        nav.tick(ms(20));
        nav.initialize_step_through();
        nav.advance();
        assert_eq!(message_html(&nav, 1), "<p></p>");
        settle(&mut nav);
        assert_eq!(message_html(&nav, 1), "<p>Hello</p>");
    }

    #[test]
    fn test_list_direction() {
        let mut nav = navigator(SCENARIO, InitialMode::ShowAll);
        let list = nav.transcript().list().unwrap();
        assert_eq!(nav.document().style_property(list, "flex-direction").as_deref(), Some("column"));
        assert!(!nav.is_reversed());

        nav.initialize_step_through();
        assert!(nav.is_reversed());
        nav.show_all();
        assert!(!nav.is_reversed());
    }

    #[test]
    fn test_no_reverse_layout() {
        let mut config = Config::default();
        config.player.reverse_layout = false;
        config.player.initial_mode = InitialMode::StepThrough;
        let nav = Navigator::from_config(Document::parse(SCENARIO), &config).unwrap();
        let list = nav.transcript().list().unwrap();
        assert_eq!(nav.document().style_property(list, "flex-direction"), None);
    }

    #[test]
    fn test_reply_without_content_region_is_instant() {
        let html = concat!(
            r#"<div data-testid="message-list"><section><div><div>"#,
            r#"<div data-testid="union_message"><div data-testid="send_message"><div data-testid="message_content">Q</div></div></div>"#,
            r#"</div></div></section><section><div><div>"#,
            r#"<div data-testid="union_message"><p>no region</p></div>"#,
            r#"</div></div></section></div>"#,
        );
        let mut config = Preset::DoubaoDocs.config();
        config.player.initial_mode = InitialMode::StepThrough;
        let mut nav = Navigator::from_config(Document::parse(html), &config).unwrap();

        nav.advance();
        assert_eq!(nav.state().current_index, Some(1));
        assert!(!nav.state().is_typing);
        assert!(nav.document().text_content(nav.transcript().get(1).unwrap().node).contains("no region"));
    }

    #[test]
    fn test_content_region_is_typed_and_pulsed() {
        let html = concat!(
            r#"<div data-testid="message-list"><section><div><div>"#,
            r#"<div data-testid="union_message"><div data-testid="send_message"><div data-testid="message_content">Q</div></div></div>"#,
            r#"</div></div></section><section><div><div>"#,
            r#"<div data-testid="union_message"><div data-testid="message_content"><p>OK</p></div></div>"#,
            r#"</div></div></section></div>"#,
        );
        let mut config = Preset::DoubaoDocs.config();
        config.player.initial_mode = InitialMode::StepThrough;
        let mut nav = Navigator::from_config(Document::parse(html), &config).unwrap();
        let message = nav.transcript().get(1).unwrap().clone();
        let content = message.content.unwrap();

        nav.advance();
        assert!(nav.state().is_typing);
        assert!(nav.document().has_class(content, "highlight"));
        assert!(!nav.document().has_class(message.node, "highlight"));
        assert_eq!(nav.document().inner_html(content), "<p></p>");
        settle(&mut nav);
        assert_eq!(nav.document().inner_html(content), "<p>OK</p>");
        assert!(!nav.document().has_class(content, "highlight"));
    }

    #[test]
    fn test_slides_preset_reveals_instantly() {
        let html = r#"<main><div class="container-ncFTrL">one</div><div class="container-ncFTrL">two</div></main>"#;
        let mut nav = Navigator::from_config(Document::parse(html), &Preset::Slides.config()).unwrap();
        assert_eq!(nav.state().mode, DisplayMode::StepThrough);
        assert_eq!(nav.visible_indices(), vec![0]);

        nav.dispatch(NavAction::Advance);
        let second = nav.transcript().get(1).unwrap().node;
        assert!(!nav.state().is_typing);
        assert_eq!(nav.document().text_content(second), "two");
        assert!(nav.document().has_class(second, "highlight"));

        nav.tick(ms(499));
        assert!(nav.document().has_class(second, "highlight"));
        nav.tick(ms(500));
        assert!(!nav.document().has_class(second, "highlight"));

        nav.dispatch(NavAction::Restart);
        assert_eq!(nav.state().current_index, Some(0));
        assert_eq!(nav.visible_indices(), vec![0]);
    }

    #[test]
    fn test_empty_transcript_is_inert() {
        let mut nav = navigator("<p>nothing here</p>", InitialMode::StepThrough);
        for action in [NavAction::Advance, NavAction::Retreat, NavAction::ShowAll, NavAction::StepThrough] {
            nav.dispatch(action);
        }
        assert_eq!(nav.state().current_index, None);
        assert!(nav.transcript().is_empty());
        assert!(nav.next_deadline().is_none());
    }
}
