use crate::models::Message;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Where the panel is in its open/close lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    /// Not mounted yet; nothing is shown.
    Hidden,
    /// Only the floating button is shown.
    Closed,
    Expanded,
    /// Header bar only.
    Minimized,
}

impl PanelState {
    pub fn is_open(&self) -> bool {
        matches!(self, PanelState::Expanded | PanelState::Minimized)
    }
}

/// Requests other parts of an application can raise against a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    Open,
    Reset,
}

/// Cloneable handle for opening or resetting a widget without a reference to it.
///
/// Signals are queued and applied by the widget owner through
/// [`ChatWidget::apply_signal`](crate::widget::ChatWidget::apply_signal) or
/// [`ChatWidget::apply_pending_signals`](crate::widget::ChatWidget::apply_pending_signals).
#[derive(Debug, Clone)]
pub struct WidgetControl {
    tx: UnboundedSender<ControlSignal>,
}

impl WidgetControl {
    pub(crate) fn new(tx: UnboundedSender<ControlSignal>) -> Self {
        Self { tx }
    }

    /// Ask the widget to open its panel. Returns false if the widget is gone.
    pub fn open(&self) -> bool {
        self.tx.send(ControlSignal::Open).is_ok()
    }

    /// Ask the widget to drop its session and start over.
    pub fn reset(&self) -> bool {
        self.tx.send(ControlSignal::Reset).is_ok()
    }

    /// Raise an open signal after `delay`.
    pub fn schedule_open(&self, delay: Duration) -> JoinHandle<()> {
        let control = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            control.open();
        })
    }
}

/// Changes a widget reports to its subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    PanelChanged(PanelState),
    MessageAppended(Message),
    MessageResolved(Message),
    MessageRemoved(String),
    TranscriptReplaced(Vec<Message>),
    StagedImageChanged(Option<String>),
    LoadingChanged(bool),
    UploadingChanged(bool),
    Reset,
}
