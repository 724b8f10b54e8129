use std::io::{self, Read};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

const ESC: u8 = 0x1b;
const CTRL_C: u8 = 0x03;

/// One decoded unit of keyboard input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Up,
    Down,
    Left,
    Right,
    Unrecognized,
    /// Ctrl-C, a termination signal, or the input closing.
    Interrupted,
}

/// Anything that yields keys one at a time, blocking until one is available.
pub trait KeySource {
    fn next_key(&mut self) -> io::Result<Key>;
}

/// Byte-level decoder over any reader.
///
/// An ESC byte is followed by exactly two more reads that classify the
/// navigation sequence. If the input ends before those two bytes arrive the
/// escape decodes as `Unrecognized` instead of waiting forever.
pub struct ByteKeys<R> {
    reader: R,
}

impl<R: Read> ByteKeys<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn decode_escape(&mut self) -> io::Result<Key> {
        let Some(first) = self.read_byte()? else { return Ok(Key::Unrecognized) };
        let Some(second) = self.read_byte()? else { return Ok(Key::Unrecognized) };
        Ok(classify_escape(first, second))
    }

    fn decode_utf8(&mut self, lead: u8) -> io::Result<Key> {
        let len = match lead {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return Ok(Key::Unrecognized),
        };
        let mut buf = vec![lead];
        for _ in 1..len {
            match self.read_byte()? {
                Some(b) => buf.push(b),
                None => return Ok(Key::Unrecognized),
            }
        }
        Ok(std::str::from_utf8(&buf)
            .ok()
            .and_then(|s| s.chars().next())
            .map_or(Key::Unrecognized, Key::Char))
    }
}

impl<R: Read> KeySource for ByteKeys<R> {
    fn next_key(&mut self) -> io::Result<Key> {
        let Some(byte) = self.read_byte()? else { return Ok(Key::Interrupted) };
        match byte {
            ESC => self.decode_escape(),
            CTRL_C => Ok(Key::Interrupted),
            b if b.is_ascii() => Ok(Key::Char(b as char)),
            b => self.decode_utf8(b),
        }
    }
}

/// Classify the two bytes that followed an ESC.
pub fn classify_escape(first: u8, second: u8) -> Key {
    match (first, second) {
        (b'[' | b'O', b'A') => Key::Up,
        (b'[' | b'O', b'B') => Key::Down,
        (b'[' | b'O', b'C') => Key::Right,
        (b'[' | b'O', b'D') => Key::Left,
        _ => Key::Unrecognized,
    }
}

/// Map a terminal key event. Returns `None` for events that are not key
/// presses (releases, repeats on some platforms).
pub fn from_key_event(event: KeyEvent) -> Option<Key> {
    if event.kind != KeyEventKind::Press {
        return None;
    }
    if event.code == KeyCode::Char('c') && event.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Key::Interrupted);
    }
    let key = match event.code {
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left | KeyCode::BackTab => Key::Left,
        KeyCode::Right | KeyCode::Tab => Key::Right,
        KeyCode::Enter => Key::Char('\r'),
        KeyCode::Char(c) => Key::Char(c),
        // crossterm resolves a lone Escape without blocking
        _ => Key::Unrecognized,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn decode_all(bytes: &[u8]) -> Vec<Key> {
        let mut keys = ByteKeys::new(Cursor::new(bytes.to_vec()));
        let mut out = Vec::new();
        loop {
            let k = keys.next_key().unwrap();
            if k == Key::Interrupted {
                break;
            }
            out.push(k);
        }
        out
    }

    #[test]
    fn arrows_and_literals() {
        let keys = decode_all(b"j\x1b[A\x1b[B\x1b[C\x1b[Dq");
        assert_eq!(
            keys,
            vec![Key::Char('j'), Key::Up, Key::Down, Key::Right, Key::Left, Key::Char('q')]
        );
    }

    #[test]
    fn application_mode_arrows() {
        assert_eq!(decode_all(b"\x1bOA\x1bOD"), vec![Key::Up, Key::Left]);
    }

    #[test]
    fn unknown_escape_sequence_is_unrecognized() {
        assert_eq!(decode_all(b"\x1b[Zx"), vec![Key::Unrecognized, Key::Char('x')]);
    }

    #[test]
    fn lone_escape_at_end_of_input_does_not_hang() {
        assert_eq!(decode_all(b"\x1b"), vec![Key::Unrecognized]);
        assert_eq!(decode_all(b"\x1b["), vec![Key::Unrecognized]);
    }

    #[test]
    fn multibyte_characters_are_collected() {
        assert_eq!(decode_all("é".as_bytes()), vec![Key::Char('é')]);
        assert_eq!(decode_all(&[0xC3]), vec![Key::Unrecognized]);
        assert_eq!(decode_all(&[0xFF]), vec![Key::Unrecognized]);
    }

    #[test]
    fn ctrl_c_byte_interrupts() {
        let mut keys = ByteKeys::new(Cursor::new(vec![b'a', CTRL_C, b'b']));
        assert_eq!(keys.next_key().unwrap(), Key::Char('a'));
        assert_eq!(keys.next_key().unwrap(), Key::Interrupted);
    }

    #[test]
    fn key_events_map_onto_keys() {
        let press = |code, modifiers| KeyEvent::new(code, modifiers);
        assert_eq!(from_key_event(press(KeyCode::Up, KeyModifiers::NONE)), Some(Key::Up));
        assert_eq!(from_key_event(press(KeyCode::Tab, KeyModifiers::NONE)), Some(Key::Right));
        assert_eq!(from_key_event(press(KeyCode::Enter, KeyModifiers::NONE)), Some(Key::Char('\r')));
        assert_eq!(
            from_key_event(press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Key::Interrupted)
        );
        assert_eq!(from_key_event(press(KeyCode::Esc, KeyModifiers::NONE)), Some(Key::Unrecognized));
    }
}
