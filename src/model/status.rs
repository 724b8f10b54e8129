/// Severity of a status line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusLevel {
    Success,
    Warn,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self { level: StatusLevel::Success, text: text.into() }
    }

    pub fn warn(text: impl Into<String>) -> Self {
        Self { level: StatusLevel::Warn, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { level: StatusLevel::Error, text: text.into() }
    }
}

/// Holds the single most recent status message.
///
/// A message survives the loop turn it was set in and is cleared at the end
/// of the next turn that does not replace it.
#[derive(Clone, Debug, Default)]
pub struct StatusSlot {
    message: Option<StatusMessage>,
    fresh: bool,
}

impl StatusSlot {
    pub fn set(&mut self, message: StatusMessage) {
        self.message = Some(message);
        self.fresh = true;
    }

    pub fn clear(&mut self) {
        self.message = None;
        self.fresh = false;
    }

    pub fn get(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    /// End of a loop turn: drop the message unless it was set during the turn.
    pub fn end_turn(&mut self) {
        if !self.fresh {
            self.message = None;
        }
        self.fresh = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_survives_the_turn_it_was_set_in() {
        let mut slot = StatusSlot::default();
        slot.set(StatusMessage::success("Started web"));
        slot.end_turn();
        assert_eq!(slot.get().map(|m| m.text.as_str()), Some("Started web"));
        slot.end_turn();
        assert!(slot.get().is_none());
    }

    #[test]
    fn newer_message_replaces_older() {
        let mut slot = StatusSlot::default();
        slot.set(StatusMessage::warn("Cancelled"));
        slot.set(StatusMessage::error("not found: web"));
        assert_eq!(slot.get().map(|m| m.level), Some(StatusLevel::Error));
    }
}
