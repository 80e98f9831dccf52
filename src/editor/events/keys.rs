//! # Input Keys and Escape-Sequence Decoding
//!
//! The interpreter works on [`Key`]s: single bytes as typed, plus pseudo keys
//! for cursor and function keys. Keys come from two places:
//!
//! - crossterm key events from the live terminal ([`keys_from_event`])
//! - raw byte streams ([`KeyDecoder`]), which recognise the usual VT100/xterm
//!   escape sequences within a bounded lookahead window and fall back to a
//!   bare Escape when nothing completes

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub const ESC: u8 = 0x1b;
pub const BACKSPACE: u8 = 0x08;
pub const DEL: u8 = 0x7f;
pub const CR: u8 = b'\r';
pub const LF: u8 = b'\n';

/// Control byte for a letter, e.g. `ctrl(b'f')` is `^F`
pub const fn ctrl(letter: u8) -> u8 {
    letter & 0x1f
}

/// One unit of editor input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A byte as typed, including control bytes and ESC
    Byte(u8),
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    /// Function key F1-F12
    Function(u8),
}

impl Key {
    pub fn is_escape(self) -> bool {
        self == Key::Byte(ESC)
    }

    /// The byte behind a plain key
    pub fn byte(self) -> Option<u8> {
        match self {
            Key::Byte(b) => Some(b),
            _ => None,
        }
    }
}

/// Escape sequences (without the leading ESC) and the keys they stand for
const ESCAPE_SEQUENCES: &[(&[u8], Key)] = &[
    (b"OA", Key::Up),
    (b"OB", Key::Down),
    (b"OC", Key::Right),
    (b"OD", Key::Left),
    (b"OH", Key::Home),
    (b"OF", Key::End),
    (b"[A", Key::Up),
    (b"[B", Key::Down),
    (b"[C", Key::Right),
    (b"[D", Key::Left),
    (b"[H", Key::Home),
    (b"[F", Key::End),
    (b"[1~", Key::Home),
    (b"[2~", Key::Insert),
    (b"[3~", Key::Delete),
    (b"[4~", Key::End),
    (b"[5~", Key::PageUp),
    (b"[6~", Key::PageDown),
    (b"[7~", Key::Home),
    (b"[8~", Key::End),
    (b"OP", Key::Function(1)),
    (b"OQ", Key::Function(2)),
    (b"OR", Key::Function(3)),
    (b"OS", Key::Function(4)),
    (b"[11~", Key::Function(1)),
    (b"[12~", Key::Function(2)),
    (b"[13~", Key::Function(3)),
    (b"[14~", Key::Function(4)),
    (b"[15~", Key::Function(5)),
    (b"[17~", Key::Function(6)),
    (b"[18~", Key::Function(7)),
    (b"[19~", Key::Function(8)),
    (b"[20~", Key::Function(9)),
    (b"[21~", Key::Function(10)),
    (b"[23~", Key::Function(11)),
    (b"[24~", Key::Function(12)),
];

/// Longest sequence body; the lookahead never holds more than this after ESC
const MAX_SEQUENCE_LEN: usize = 4;

/// Incremental decoder from raw terminal bytes to keys
#[derive(Debug, Default, Clone)]
pub struct KeyDecoder {
    pending: Vec<u8>,
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an incomplete escape sequence is being held back
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Feed one byte, returning every key it completes
    pub fn push(&mut self, byte: u8) -> Vec<Key> {
        let mut keys = Vec::new();
        self.push_into(byte, &mut keys);
        keys
    }

    /// The lookahead window ran out: release held bytes as plain keys
    pub fn timeout(&mut self) -> Vec<Key> {
        self.pending.drain(..).map(Key::Byte).collect()
    }

    /// Decode a complete byte string, treating its end as a timeout
    pub fn decode_all(bytes: &[u8]) -> Vec<Key> {
        let mut decoder = Self::new();
        let mut keys = Vec::new();
        for &byte in bytes {
            decoder.push_into(byte, &mut keys);
        }
        keys.extend(decoder.timeout());
        keys
    }

    fn push_into(&mut self, byte: u8, keys: &mut Vec<Key>) {
        if self.pending.is_empty() {
            if byte == ESC {
                self.pending.push(byte);
            } else {
                keys.push(Key::Byte(byte));
            }
            return;
        }

        self.pending.push(byte);
        let body = &self.pending[1..];

        if let Some((_, key)) = ESCAPE_SEQUENCES.iter().find(|(seq, _)| *seq == body) {
            keys.push(*key);
            self.pending.clear();
            return;
        }

        let is_prefix = body.len() < MAX_SEQUENCE_LEN
            && ESCAPE_SEQUENCES.iter().any(|(seq, _)| seq.starts_with(body));
        if is_prefix {
            return;
        }

        // Not a sequence after all: the ESC was typed on its own.
        let rest = self.pending.split_off(1);
        self.pending.clear();
        keys.push(Key::Byte(ESC));
        for byte in rest {
            self.push_into(byte, keys);
        }
    }
}

/// Convenience for scripted input: decode a string of typed bytes
pub fn keys(text: &str) -> Vec<Key> {
    KeyDecoder::decode_all(text.as_bytes())
}

/// Translate a crossterm key event into editor keys
///
/// Non-ASCII characters become their UTF-8 bytes; key releases and keys the
/// editor has no use for produce nothing.
pub fn keys_from_event(event: KeyEvent) -> Vec<Key> {
    if event.kind == KeyEventKind::Release {
        return Vec::new();
    }

    match event.code {
        KeyCode::Char(c) if event.modifiers.contains(KeyModifiers::CONTROL) => {
            if c.is_ascii() {
                vec![Key::Byte(ctrl(c.to_ascii_lowercase() as u8))]
            } else {
                Vec::new()
            }
        }
        KeyCode::Char(c) => {
            let mut utf8 = [0u8; 4];
            c.encode_utf8(&mut utf8)
                .bytes()
                .map(Key::Byte)
                .collect()
        }
        KeyCode::Enter => vec![Key::Byte(CR)],
        KeyCode::Tab => vec![Key::Byte(b'\t')],
        KeyCode::Backspace => vec![Key::Byte(DEL)],
        KeyCode::Esc => vec![Key::Byte(ESC)],
        KeyCode::Up => vec![Key::Up],
        KeyCode::Down => vec![Key::Down],
        KeyCode::Left => vec![Key::Left],
        KeyCode::Right => vec![Key::Right],
        KeyCode::Home => vec![Key::Home],
        KeyCode::End => vec![Key::End],
        KeyCode::PageUp => vec![Key::PageUp],
        KeyCode::PageDown => vec![Key::PageDown],
        KeyCode::Insert => vec![Key::Insert],
        KeyCode::Delete => vec![Key::Delete],
        KeyCode::F(n) if (1..=12).contains(&n) => vec![Key::Function(n)],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_bytes_should_pass_straight_through() {
        assert_eq!(
            keys("dw"),
            vec![Key::Byte(b'd'), Key::Byte(b'w')]
        );
    }

    #[test]
    fn cursor_sequences_should_decode_in_both_forms() {
        assert_eq!(KeyDecoder::decode_all(b"\x1b[A"), vec![Key::Up]);
        assert_eq!(KeyDecoder::decode_all(b"\x1bOD"), vec![Key::Left]);
        assert_eq!(KeyDecoder::decode_all(b"\x1b[5~"), vec![Key::PageUp]);
        assert_eq!(KeyDecoder::decode_all(b"\x1b[24~"), vec![Key::Function(12)]);
    }

    #[test]
    fn decoder_should_hold_prefix_until_complete() {
        let mut decoder = KeyDecoder::new();
        assert!(decoder.push(ESC).is_empty());
        assert!(decoder.push(b'[').is_empty());
        assert!(decoder.push(b'1').is_empty());
        assert!(decoder.has_pending());
        assert_eq!(decoder.push(b'~'), vec![Key::Home]);
        assert!(!decoder.has_pending());
    }

    #[test]
    fn unrecognised_sequence_should_fall_back_to_bare_escape() {
        assert_eq!(
            KeyDecoder::decode_all(b"ihi\x1bj"),
            vec![
                Key::Byte(b'i'),
                Key::Byte(b'h'),
                Key::Byte(b'i'),
                Key::Byte(ESC),
                Key::Byte(b'j')
            ]
        );
    }

    #[test]
    fn timeout_should_release_held_bytes() {
        let mut decoder = KeyDecoder::new();
        decoder.push(ESC);
        decoder.push(b'[');
        assert_eq!(decoder.timeout(), vec![Key::Byte(ESC), Key::Byte(b'[')]);
        assert_eq!(keys("\x1b"), vec![Key::Byte(ESC)]);
    }

    #[test]
    fn double_escape_should_yield_two_escapes() {
        assert_eq!(
            KeyDecoder::decode_all(b"\x1b\x1b"),
            vec![Key::Byte(ESC), Key::Byte(ESC)]
        );
    }

    #[test]
    fn crossterm_events_should_map_to_keys() {
        let ctrl_f = KeyEvent::new(KeyCode::Char('f'), KeyModifiers::CONTROL);
        assert_eq!(keys_from_event(ctrl_f), vec![Key::Byte(0x06)]);

        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(keys_from_event(enter), vec![Key::Byte(CR)]);

        let up = KeyEvent::new(KeyCode::Up, KeyModifiers::NONE);
        assert_eq!(keys_from_event(up), vec![Key::Up]);

        let accented = KeyEvent::new(KeyCode::Char('é'), KeyModifiers::NONE);
        assert_eq!(keys_from_event(accented), vec![Key::Byte(0xc3), Key::Byte(0xa9)]);
    }
}
