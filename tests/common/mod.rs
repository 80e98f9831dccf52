//! Helpers shared by the integration tests

#![allow(dead_code)]

use vedit::editor::events::keys;
use vedit::editor::{EditorSession, MemoryHost};

/// A 40x10 session over `text`
pub fn session(text: &str) -> EditorSession {
    EditorSession::open(40, 10, Some(text.as_bytes().to_vec()))
}

/// Feed `input` as typed keys
pub fn type_keys(session: &mut EditorSession, host: &mut MemoryHost, input: &str) {
    for key in keys(input) {
        session.handle_input(key, host);
    }
}

/// Run `input` against a fresh session over `text`
pub fn edit(text: &str, input: &str) -> EditorSession {
    let mut session = session(text);
    let mut host = MemoryHost::new();
    type_keys(&mut session, &mut host, input);
    session
}

pub fn text(session: &EditorSession) -> String {
    String::from_utf8_lossy(session.text()).into_owned()
}
