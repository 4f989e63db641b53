//! Incremental message decoder.
//!
//! The decoder is fed one character at a time and assembles at most one
//! message. A completed message stays in the decoder's slot until the caller
//! takes it; until then every further character is rejected.
//!
//! Field positions ("segments") of an incoming line:
//!
//! ```text
//! \t <device_id> \t <TOKEN> \t <id> \t <payload1> \t <payload2> [\t ...] \n
//!         0             1         2          3             4          5+
//! ```
//!
//! An empty field where the control kind does not allow one discards the
//! message in progress. When that happens on a separator, decoding restarts
//! at the device id with the next field, so the rest of the damaged line is
//! read as a fresh message. Its device id is whatever field followed the
//! empty one and its token is rarely valid, so callers should expect
//! [`ControlType::Unknown`] messages with odd device ids after a resync:
//!
//! ```text
//! \tDEV\tSLDR\t\tS1\t5\n  ->  device "S1", Unknown
//! ```
//!
//! A resync on the terminator waits for the next message start instead.

use crate::control::ControlType;
use crate::{FIELD_SEPARATOR, TERMINATOR, UNKNOWN_DEVICE_ID};
use std::fmt;

/// Fields past the second payload all land in this segment and are ignored.
const OVERFLOW_SEGMENT: usize = 5;

/// A decoded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    pub device_id: String,
    pub control_type: ControlType,
    pub id: String,
    pub payload1: String,
    pub payload2: String,
}

impl Default for ParsedMessage {
    fn default() -> Self {
        Self {
            device_id: String::new(),
            control_type: ControlType::Unknown,
            id: String::new(),
            payload1: String::new(),
            payload2: String::new(),
        }
    }
}

impl ParsedMessage {
    fn clear(&mut self) {
        self.device_id.clear();
        self.control_type = ControlType::Unknown;
        self.id.clear();
        self.payload1.clear();
        self.payload2.clear();
    }
}

impl fmt::Display for ParsedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {}  {}  {}  {}",
            self.device_id, self.control_type, self.id, self.payload1, self.payload2
        )
    }
}

/// Outcome of feeding one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    /// Character consumed, message still in progress.
    Incomplete,
    /// A message was completed and is waiting in the slot.
    Complete,
    /// An empty field appeared where none is allowed. The in-progress
    /// message was discarded and the decoder restarted at the device id.
    Resynced,
    /// A completed message has not been taken yet; the input was rejected.
    Dropped,
    /// The field was consumed but not stored.
    FieldIgnored,
}

/// Incremental decoder with a single message slot.
#[derive(Debug)]
pub struct Decoder {
    buffer: String,
    /// `None` while waiting for the start of the next message.
    segment: Option<usize>,
    current: ParsedMessage,
    pending: bool,
    /// Trailing bytes of a character split across byte chunks.
    utf8_tail: Vec<u8>,
    resyncs: u64,
}

impl Decoder {
    pub fn new() -> Self {
        Self {
            buffer: String::with_capacity(crate::MAX_STRING_LEN),
            segment: None,
            current: ParsedMessage::default(),
            pending: false,
            utf8_tail: Vec::new(),
            resyncs: 0,
        }
    }

    /// Feeds one character. Returns `true` when it completed a message.
    pub fn feed(&mut self, ch: char) -> bool {
        self.push(ch) == DecodeStatus::Complete
    }

    /// Feeds one character and reports what happened to it.
    pub fn push(&mut self, ch: char) -> DecodeStatus {
        if self.pending {
            tracing::trace!(?ch, "message pending, character dropped");
            return DecodeStatus::Dropped;
        }

        if ch != FIELD_SEPARATOR && ch != TERMINATOR {
            self.buffer.push(ch);
            return DecodeStatus::Incomplete;
        }

        let status = match self.segment {
            None if self.buffer.is_empty() => {
                // Start marker. A blank line keeps waiting.
                if ch == FIELD_SEPARATOR {
                    self.segment = Some(0);
                }
                return DecodeStatus::Incomplete;
            }
            // Start marker omitted: the token is the device id.
            None => self.store(0),
            Some(segment) => self.store(segment),
        };

        if status == DecodeStatus::Resynced {
            // A resync on the terminator leaves the decoder awaiting the
            // next message's start marker.
            if ch == TERMINATOR {
                self.segment = None;
            }
            return status;
        }

        if ch == TERMINATOR {
            self.pending = true;
            self.segment = None;
            tracing::trace!(message = %self.current, "message complete");
            return DecodeStatus::Complete;
        }

        status
    }

    /// Stores the buffered field at `segment` and advances to the next one.
    fn store(&mut self, segment: usize) -> DecodeStatus {
        let field = std::mem::take(&mut self.buffer);
        self.segment = Some((segment + 1).min(OVERFLOW_SEGMENT));

        if segment >= OVERFLOW_SEGMENT {
            return DecodeStatus::FieldIgnored;
        }

        // The remainder of a message with an unknown token is skipped.
        if segment >= 2 && self.current.control_type == ControlType::Unknown {
            return DecodeStatus::FieldIgnored;
        }

        if field.is_empty() && !self.current.control_type.allows_empty_field(segment) {
            tracing::debug!(
                segment,
                control = ?self.current.control_type,
                "empty field, resynchronizing"
            );
            self.current.clear();
            self.segment = Some(0);
            self.resyncs += 1;
            return DecodeStatus::Resynced;
        }

        match segment {
            0 => {
                self.current.clear();
                if field == ControlType::Who.token() {
                    self.current.device_id.push_str(UNKNOWN_DEVICE_ID);
                    self.current.control_type = ControlType::Who;
                } else {
                    self.current.device_id = field;
                }
            }
            1 => {
                self.current.control_type = ControlType::from_token(&field);
                if self.current.control_type == ControlType::Unknown {
                    tracing::debug!(token = %field, "unknown control token");
                }
            }
            2 => self.current.id = field,
            3 => self.current.payload1 = field,
            _ => self.current.payload2 = field,
        }
        DecodeStatus::Incomplete
    }

    /// Feeds a chunk. A chunk arriving while a message is pending is dropped
    /// whole. Characters following a completed message in the same chunk are
    /// dropped like any other input while the message is pending, so a chunk
    /// should carry at most one message; use [`Decoder::feed_str`] for
    /// streams.
    pub fn process(&mut self, chunk: &str) -> DecodeStatus {
        if self.pending {
            tracing::debug!(len = chunk.len(), "message pending, chunk dropped");
            return DecodeStatus::Dropped;
        }

        let mut last = DecodeStatus::Incomplete;
        let mut completed = false;
        for ch in chunk.chars() {
            last = self.push(ch);
            if last == DecodeStatus::Complete {
                completed = true;
            }
        }

        if completed {
            DecodeStatus::Complete
        } else {
            last
        }
    }

    /// Feeds a chunk, taking each message out of the slot as it completes.
    pub fn feed_str(&mut self, chunk: &str) -> Vec<ParsedMessage> {
        let mut messages = Vec::new();
        for ch in chunk.chars() {
            if self.feed(ch) {
                if let Some(message) = self.take_message() {
                    messages.push(message);
                }
            }
        }
        messages
    }

    /// Feeds raw bytes from a byte transport, taking each message as it
    /// completes. A character split across calls is held back until its
    /// remaining bytes arrive; invalid sequences become U+FFFD.
    pub fn feed_bytes(&mut self, data: &[u8]) -> Vec<ParsedMessage> {
        self.utf8_tail.extend_from_slice(data);
        let mut bytes = std::mem::take(&mut self.utf8_tail);
        let mut messages = Vec::new();

        loop {
            match std::str::from_utf8(&bytes) {
                Ok(text) => {
                    messages.extend(self.feed_str(text));
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    if let Ok(text) = std::str::from_utf8(&bytes[..valid]) {
                        messages.extend(self.feed_str(text));
                    }
                    match e.error_len() {
                        None => {
                            self.utf8_tail = bytes.split_off(valid);
                            break;
                        }
                        Some(len) => {
                            tracing::debug!(len, "invalid UTF-8 in input");
                            messages.extend(self.feed_str("\u{FFFD}"));
                            bytes.drain(..valid + len);
                        }
                    }
                }
            }
        }
        messages
    }

    /// Takes the completed message, freeing the slot.
    pub fn take_message(&mut self) -> Option<ParsedMessage> {
        if !self.pending {
            return None;
        }
        self.pending = false;
        Some(std::mem::take(&mut self.current))
    }

    /// The completed message, if one is pending.
    pub fn message(&self) -> Option<&ParsedMessage> {
        self.pending.then_some(&self.current)
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Number of resynchronizations since the decoder was created.
    pub fn resync_count(&self) -> u64 {
        self.resyncs
    }

    /// Length in bytes of the field currently being accumulated.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Discards all state, including a pending message.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.segment = None;
        self.current.clear();
        self.pending = false;
        self.utf8_tail.clear();
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}
