//! Out-of-band operation feedback, drained by the embedding UI

/// Severity determines how the embedding UI presents a notice
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

/// A single pending notification
#[derive(Clone, Debug)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

/// Collects notices from the popup layer and its workers. Worker failures
/// always land here - a closed dialog is not the failure channel.
#[derive(Default)]
pub struct Notifier {
    pending: Vec<Notice>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, severity: Severity, message: impl Into<String>) {
        self.pending.push(Notice { severity, message: message.into() });
    }

    /// Take all pending notices, oldest first.
    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_drain() {
        let mut notifier = Notifier::new();
        assert!(notifier.is_empty());

        notifier.push(Severity::Info, "working...");
        notifier.push(Severity::Error, "nope");

        let notices = notifier.drain();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].severity, Severity::Info);
        assert_eq!(notices[1].message, "nope");
        assert!(notifier.is_empty());
    }
}
