use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    Info,
    Warning,
    Error,
    Success,
}

/// One line of the ordered event stream the front end observes.
#[derive(Debug, Clone)]
pub struct RunEvent {
    pub message: String,
    pub level: EventLevel,
}

/// Sending half of the run's event stream. Dropping the last sender closes
/// the stream, which is the run's completion signal.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<RunEvent>,
}

pub fn channel() -> (EventSender, mpsc::UnboundedReceiver<RunEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, rx)
}

impl EventSender {
    pub fn emit(&self, level: EventLevel, message: impl Into<String>) {
        // A closed receiver only means the front end went away; the run
        // carries on regardless.
        let _ = self.tx.send(RunEvent {
            message: message.into(),
            level,
        });
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(EventLevel::Info, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.emit(EventLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(EventLevel::Error, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.emit(EventLevel::Success, message);
    }
}
