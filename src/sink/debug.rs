use std::borrow::Cow;

use super::{Error, LogRecord, LogSink, Result};

/// Longest message echoed verbatim before truncation kicks in.
const MAX_MESSAGE_CHARS: usize = 300;

const TRUNCATION_MARKER: &str = "...[truncated]";

/// Prints each record as one JSON line on stdout, for local inspection
/// without a live backend. Long messages are truncated to keep the output
/// readable.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugSink;

impl LogSink for DebugSink {
    async fn accept(&self, record: &LogRecord) -> Result<()> {
        let mut doc = record.clone();
        doc.message = truncate_message(&doc.message).into_owned();
        let line = serde_json::to_string(&doc).map_err(Error::Serialize)?;
        println!("{line}");
        Ok(())
    }
}

/// Caps `message` at [`MAX_MESSAGE_CHARS`] characters, appending a marker to
/// anything cut. Counts characters, not bytes, so a multi-byte code point is
/// never split.
fn truncate_message(message: &str) -> Cow<'_, str> {
    match message.char_indices().nth(MAX_MESSAGE_CHARS) {
        None => Cow::Borrowed(message),
        Some((cut, _)) => Cow::Owned(format!("{}{}", &message[..cut], TRUNCATION_MARKER)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_message_is_truncated_with_marker() {
        let message = "a".repeat(310);
        let expected = format!("{}{}", "a".repeat(300), TRUNCATION_MARKER);
        assert_eq!(truncate_message(&message), expected);
    }

    #[test]
    fn test_message_at_limit_is_unchanged() {
        let message = "a".repeat(300);
        assert_eq!(truncate_message(&message), message);
    }

    #[test]
    fn test_short_message_is_unchanged() {
        assert_eq!(truncate_message("hello"), "hello");
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let message = "ü".repeat(301);
        let expected = format!("{}{}", "ü".repeat(300), TRUNCATION_MARKER);
        assert_eq!(truncate_message(&message), expected);
    }
}
