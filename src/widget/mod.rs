mod control;
mod pipeline;
mod session;
mod upload;

pub use control::{ControlSignal, PanelState, WidgetControl, WidgetEvent};

use crate::api::ChatBackend;
use crate::models::{Message, MessageContent, Session};
use crate::storage::{transcript_key, KeyValueStore, SESSION_ID_KEY};
use crate::ui::output::{log_error, log_verbose};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

pub const WIDGET_TITLE: &str = "Scout";
pub const WIDGET_SUBTITLE: &str = "AI Pest Assistant";

pub const GREETING: &str = "Hi there! I'm Scout 👋 What pest issue can I help you with today?";
pub const GREETING_ID: &str = "1";

/// User-visible text when a message carries only an image
pub const IMAGE_ONLY_TEXT: &str = "Here's an image of the pest";
/// What the backend is asked when a message carries only an image
pub const IMAGE_ONLY_PROMPT: &str = "Can you identify this pest from the image?";

pub const CHAT_APOLOGY: &str =
    "I apologize, but I'm having trouble responding right now. Please try again.";
pub const SESSION_APOLOGY: &str =
    "Sorry, I'm having trouble starting the conversation. Please try again.";
pub const UPLOAD_APOLOGY: &str = "Sorry, I had trouble uploading that image. Please try again.";

pub const DEFAULT_OPEN_DELAY: Duration = Duration::from_millis(3500);

#[derive(Debug, Clone)]
pub struct WidgetSettings {
    pub verbose: bool,
    pub auto_open: bool,
    pub open_delay: Duration,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            verbose: false,
            auto_open: true,
            open_delay: DEFAULT_OPEN_DELAY,
        }
    }
}

pub fn greeting() -> Message {
    let mut message = Message::bot(GREETING);
    message.id = GREETING_ID.to_string();
    message
}

/// The chat widget: panel state, session, transcript and the pending request.
pub struct ChatWidget {
    backend: Arc<dyn ChatBackend>,
    durable: Arc<dyn KeyValueStore>,
    session_store: Arc<dyn KeyValueStore>,
    settings: WidgetSettings,

    panel: PanelState,
    session: Session,
    messages: Vec<Message>,
    input: String,
    staged_image: Option<String>,
    loading: bool,
    uploading: bool,
    loading_history: bool,

    control_tx: UnboundedSender<ControlSignal>,
    control_rx: UnboundedReceiver<ControlSignal>,
    subscribers: Vec<UnboundedSender<WidgetEvent>>,
}

impl ChatWidget {
    /// Build a widget. `durable` keeps the session id across restarts,
    /// `session_store` holds the transcript cache for this run.
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        durable: Arc<dyn KeyValueStore>,
        session_store: Arc<dyn KeyValueStore>,
        settings: WidgetSettings,
    ) -> Self {
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        Self {
            backend,
            durable,
            session_store,
            settings,
            panel: PanelState::Hidden,
            session: Session::default(),
            messages: vec![greeting()],
            input: String::new(),
            staged_image: None,
            loading: false,
            uploading: false,
            loading_history: true,
            control_tx,
            control_rx,
            subscribers: Vec::new(),
        }
    }

    pub fn panel(&self) -> PanelState {
        self.panel
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn staged_image(&self) -> Option<&str> {
        self.staged_image.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn is_loading_history(&self) -> bool {
        self.loading_history
    }

    pub fn settings(&self) -> &WidgetSettings {
        &self.settings
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn can_send(&self) -> bool {
        !self.loading && (!self.input.trim().is_empty() || self.staged_image.is_some())
    }

    pub fn can_upload(&self) -> bool {
        !self.loading && !self.uploading
    }

    pub fn can_reset(&self) -> bool {
        !self.loading
    }

    /// Handle for raising open/reset signals from elsewhere.
    pub fn control(&self) -> WidgetControl {
        WidgetControl::new(self.control_tx.clone())
    }

    /// Stream of changes made to this widget.
    pub fn subscribe(&mut self) -> UnboundedReceiver<WidgetEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Show the floating button and restore any stored session.
    pub async fn mount(&mut self) {
        if self.panel == PanelState::Hidden {
            self.set_panel(PanelState::Closed);
        }
        self.restore_session().await;
    }

    /// Start the auto-open timer if enabled.
    pub fn schedule_auto_open(&self) -> Option<JoinHandle<()>> {
        if !self.settings.auto_open {
            return None;
        }
        Some(self.control().schedule_open(self.settings.open_delay))
    }

    /// Open the panel expanded. No effect before mount.
    pub fn open(&mut self) {
        if self.panel != PanelState::Hidden {
            self.set_panel(PanelState::Expanded);
        }
    }

    pub fn close(&mut self) {
        if self.panel != PanelState::Hidden {
            self.set_panel(PanelState::Closed);
        }
    }

    /// Floating button: close an open panel, open a closed one.
    pub fn toggle(&mut self) {
        if self.panel.is_open() {
            self.close();
        } else {
            self.open();
        }
    }

    pub fn toggle_minimize(&mut self) {
        match self.panel {
            PanelState::Expanded => self.set_panel(PanelState::Minimized),
            PanelState::Minimized => self.set_panel(PanelState::Expanded),
            PanelState::Hidden | PanelState::Closed => {}
        }
    }

    /// Forget the session and start over with the greeting.
    ///
    /// Clears the stored session id and this session's cached transcript.
    pub fn reset(&mut self) {
        if let Err(e) = self.durable.remove(SESSION_ID_KEY) {
            log_error(&format!("Error clearing stored session: {}", e));
        }
        if !self.session.is_empty() {
            let key = transcript_key(&self.session.session_id);
            if let Err(e) = self.session_store.remove(&key) {
                log_error(&format!("Error clearing cached transcript: {}", e));
            }
        }
        log_verbose(self.settings.verbose, "Conversation reset");

        self.session = Session::default();
        self.input.clear();
        self.staged_image = None;
        self.loading = false;
        self.uploading = false;
        self.messages = vec![greeting()];

        self.emit(WidgetEvent::Reset);
        self.emit(WidgetEvent::TranscriptReplaced(self.messages.clone()));
    }

    pub fn apply_signal(&mut self, signal: ControlSignal) {
        log_verbose(self.settings.verbose, &format!("Signal: {:?}", signal));
        match signal {
            ControlSignal::Open => self.open(),
            ControlSignal::Reset => self.reset(),
        }
    }

    /// Apply every queued signal, returning how many were handled.
    pub fn apply_pending_signals(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(signal) = self.control_rx.try_recv() {
            self.apply_signal(signal);
            applied += 1;
        }
        applied
    }

    /// Wait for the next queued signal.
    pub async fn next_signal(&mut self) -> Option<ControlSignal> {
        self.control_rx.recv().await
    }

    fn set_panel(&mut self, panel: PanelState) {
        if self.panel != panel {
            self.panel = panel;
            self.emit(WidgetEvent::PanelChanged(panel));
        }
    }

    fn set_loading(&mut self, loading: bool) {
        if self.loading != loading {
            self.loading = loading;
            self.emit(WidgetEvent::LoadingChanged(loading));
        }
    }

    fn set_uploading(&mut self, uploading: bool) {
        if self.uploading != uploading {
            self.uploading = uploading;
            self.emit(WidgetEvent::UploadingChanged(uploading));
        }
    }

    fn push_message(&mut self, message: Message) {
        self.messages.push(message.clone());
        self.persist_transcript();
        self.emit(WidgetEvent::MessageAppended(message));
    }

    fn resolve_message(&mut self, id: &str, content: impl Into<MessageContent>) {
        let Some(message) = self.messages.iter_mut().find(|m| m.id == id) else {
            return;
        };
        message.resolve(content);
        let resolved = message.clone();
        self.persist_transcript();
        self.emit(WidgetEvent::MessageResolved(resolved));
    }

    fn remove_message(&mut self, id: &str) {
        let before = self.messages.len();
        self.messages.retain(|m| m.id != id);
        if self.messages.len() != before {
            self.persist_transcript();
            self.emit(WidgetEvent::MessageRemoved(id.to_string()));
        }
    }

    fn replace_transcript(&mut self, messages: Vec<Message>) {
        self.messages = messages;
        self.persist_transcript();
        self.emit(WidgetEvent::TranscriptReplaced(self.messages.clone()));
    }

    /// Mirror the transcript into the session-scoped store.
    fn persist_transcript(&self) {
        if self.session.is_empty() || self.messages.is_empty() {
            return;
        }
        let key = transcript_key(&self.session.session_id);
        let result = serde_json::to_string(&self.messages)
            .map_err(crate::error::ScoutError::from)
            .and_then(|json| self.session_store.set(&key, &json));
        if let Err(e) = result {
            log_error(&format!("Error caching transcript: {}", e));
        }
    }

    fn emit(&mut self, event: WidgetEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}

/// Read a transcript previously cached for `session_id`.
pub fn load_cached_transcript(
    store: &dyn KeyValueStore,
    session_id: &str,
) -> crate::error::Result<Option<Vec<Message>>> {
    match store.get(&transcript_key(session_id))? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}
