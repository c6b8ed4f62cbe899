/// Why a chat message was refused before reaching the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The message exceeds the per-message character limit.
    TooLong,
    /// After stripping control characters nothing readable remains.
    NoReadableText,
}

impl RejectReason {
    /// Wording shown on the chat surface for a refused message.
    pub fn chat_message(self) -> &'static str {
        match self {
            RejectReason::TooLong => {
                "That message is too long for me to read. Could you shorten it and try again?"
            }
            RejectReason::NoReadableText => {
                "I couldn't find any readable text in that message. Please try rephrasing it."
            }
        }
    }
}

/// Outcome of sanitizing one chat message.
#[derive(Debug, PartialEq)]
pub enum SanitizeResult {
    /// Usable text, with any control characters already stripped.
    Accepted(String),
    /// The message was refused outright.
    Rejected(RejectReason),
}

impl SanitizeResult {
    /// Whether the message was refused.
    pub fn is_rejected(&self) -> bool {
        matches!(self, SanitizeResult::Rejected(_))
    }

    /// The usable text, or the reason it was refused.
    pub fn into_text(self) -> Result<String, RejectReason> {
        match self {
            SanitizeResult::Accepted(text) => Ok(text),
            SanitizeResult::Rejected(reason) => Err(reason),
        }
    }
}

/// Gatekeeper for untrusted chat text.
///
/// Runs before anything reaches the pipeline or the logs: drops control
/// characters (keeping ordinary whitespace) and refuses messages past the
/// character limit, since no legitimate counseling question approaches it.
pub struct Sanitizer {
    max_message_chars: usize,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self {
            max_message_chars: 10_000,
        }
    }
}

impl Sanitizer {
    /// Create a sanitizer with a custom per-message character limit.
    pub fn new(max_message_chars: usize) -> Self {
        Self { max_message_chars }
    }

    /// Clean one chat message, or refuse it.
    pub fn sanitize(&self, input: &str) -> SanitizeResult {
        let mut chars = 0usize;
        let mut cleaned = String::with_capacity(input.len());
        for c in input.chars() {
            chars += 1;
            if chars > self.max_message_chars {
                return SanitizeResult::Rejected(RejectReason::TooLong);
            }
            if !c.is_control() || matches!(c, '\n' | '\t' | '\r') {
                cleaned.push(c);
            }
        }

        if cleaned.trim().is_empty() && !input.is_empty() {
            return SanitizeResult::Rejected(RejectReason::NoReadableText);
        }

        SanitizeResult::Accepted(cleaned)
    }
}
