use crate::session::metrics::{MetricsEngine, Snapshot};

/// Feed a full input snapshot to the engine.
///
/// When the input grew by exactly one character over the last observed input
/// and that character falls inside the target, the pair is scored for the
/// streak first. Deletions, pastes and characters past the target end leave
/// the streak alone.
pub fn apply_input(engine: &mut MetricsEngine, input: &str) -> Snapshot {
    let previous_len = engine.input().len();
    let mut chars = input.chars();
    let new_len = chars.clone().count();

    if new_len == previous_len + 1 {
        let appended = chars.nth(previous_len);
        let expected = engine.target().get(previous_len).copied();
        if let (Some(typed), Some(expected)) = (appended, expected) {
            engine.record_streak(typed, expected);
        }
    }

    engine.update(input)
}

/// Text typed so far for the running drill.
#[derive(Clone, Debug, Default)]
pub struct TypingBuffer {
    text: String,
}

impl TypingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn push(&mut self, ch: char) {
        self.text.push(ch);
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }
}

/// Type `ch` into `buffer` and rescore.
pub fn process_char(engine: &mut MetricsEngine, buffer: &mut TypingBuffer, ch: char) -> Snapshot {
    if engine.is_complete() {
        return engine.snapshot();
    }
    buffer.push(ch);
    apply_input(engine, buffer.as_str())
}

pub fn process_backspace(engine: &mut MetricsEngine, buffer: &mut TypingBuffer) -> Snapshot {
    if engine.is_complete() {
        return engine.snapshot();
    }
    buffer.backspace();
    apply_input(engine, buffer.as_str())
}
