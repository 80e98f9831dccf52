mod common;

use common::{edit, session, text, type_keys};
use vedit::editor::events::Mode;
use vedit::editor::models::RegisterName;
use vedit::editor::MemoryHost;

#[test]
fn test_delete_word_fills_default_register() {
    let session = edit("abc\ndef\n", "dw");
    assert_eq!(text(&session), "\ndef\n");
    assert_eq!(session.register(RegisterName::Default), Some(&b"abc"[..]));
}

#[test]
fn test_line_delete_by_number() {
    let mut session = session("line1\nline2\nline3\n");
    let mut host = MemoryHost::new();
    session.run_line_command("2d", &mut host);
    assert_eq!(text(&session), "line1\nline3\n");
}

#[test]
fn test_substitute_all_on_current_line() {
    let session = edit("foo bar foo\n", ":s/foo/baz/g\r");
    assert_eq!(text(&session), "baz bar baz\n");
}

#[test]
fn test_insert_into_empty_buffer() {
    let session = edit("", "ihi\x1b");
    assert_eq!(text(&session), "hi\n");
    assert_eq!(session.mode(), Mode::Command);
    assert_eq!(session.dot(), 1);
}

#[test]
fn test_search_for_missing_pattern_leaves_cursor() {
    let mut session = session("abc def\nghi\n");
    session.set_cursor(4);
    let mut host = MemoryHost::new();
    type_keys(&mut session, &mut host, "/xyz\r");
    assert_eq!(session.dot(), 4);
    assert_eq!(session.status_text(), "Pattern not found: xyz");
}

#[test]
fn test_marks_follow_and_die_with_their_text() {
    let mut session = session("\n\n\nabcdef\nlast\n");
    let mut host = MemoryHost::new();
    session.set_cursor(5);
    type_keys(&mut session, &mut host, "ma");
    assert_eq!(session.mark(b'a'), Some(5));

    session.run_line_command("1,3d", &mut host);
    assert_eq!(text(&session), "abcdef\nlast\n");
    let mark = session.mark(b'a').unwrap();
    assert_eq!(session.text()[mark], b'c');

    session.run_line_command("1d", &mut host);
    assert_eq!(text(&session), "last\n");
    assert_eq!(session.mark(b'a'), None);
}

#[test]
fn test_yank_then_put_reproduces_text() {
    // charwise
    let mut session = session("one two three\n");
    let mut host = MemoryHost::new();
    session.set_cursor(4);
    type_keys(&mut session, &mut host, "\"ryw\"rP");
    assert_eq!(text(&session), "one two two three\n");

    // linewise
    let mut session = self::session("a\nb\n");
    type_keys(&mut session, &mut host, "\"qyyj\"qp");
    assert_eq!(text(&session), "a\nb\na\n");
    assert_eq!(session.register(RegisterName::Named(b'q')), Some(&b"a\n"[..]));
}

#[test]
fn test_dot_repeats_last_change() {
    let session = edit("a b c d\n", "dw..");
    assert_eq!(text(&session), "d\n");
}

#[test]
fn test_line_undo_restores_line() {
    let session = edit("hello world\n", "dwxU");
    assert_eq!(text(&session), "hello world\n");
}

#[test]
fn test_change_word_then_escape() {
    let session = edit("foo bar\n", "cwbaz\x1b");
    assert_eq!(text(&session), "baz bar\n");
    assert_eq!(session.mode(), Mode::Command);
    assert!(session.is_modified());
}

#[test]
fn test_errors_keep_session_running() {
    let mut session = session("x\n");
    let mut host = MemoryHost::new();
    type_keys(&mut session, &mut host, ":frobnicate\r");
    assert_eq!(session.status_text(), "Not an editor command: frobnicate");
    type_keys(&mut session, &mut host, "ay\x1b");
    assert_eq!(text(&session), "xy\n");
    assert!(!session.should_quit());
}

const HUGE_COUNT: &str = "99999999999999999999";

fn at_offset_one(input: &str) -> vedit::editor::EditorSession {
    let mut session = session("hello\n");
    let mut host = MemoryHost::new();
    session.set_cursor(1);
    type_keys(&mut session, &mut host, input);
    session
}

#[test]
fn test_huge_counts_stop_at_line_end() {
    let session = at_offset_one(&format!("{HUGE_COUNT}x"));
    assert_eq!(text(&session), "h\n");

    let session = at_offset_one(&format!("{HUGE_COUNT}~"));
    assert_eq!(text(&session), "hELLO\n");

    let session = at_offset_one(&format!("{HUGE_COUNT}rz"));
    assert_eq!(text(&session), "hello\n");
    assert!(!session.should_quit());
}

#[test]
fn test_huge_put_count_is_refused_without_touching_buffer() {
    let session = at_offset_one(&format!("yl{HUGE_COUNT}p"));
    assert_eq!(text(&session), "hello\n");
    assert_eq!(session.status_text(), "Count too large");
    assert!(!session.should_quit());
}

#[test]
fn test_huge_counts_on_motions_and_repeat() {
    let session = edit("hello\n", &format!("x{HUGE_COUNT}."));
    assert_eq!(text(&session), "\n");
    assert!(!session.should_quit());

    let body = "one two\nthree four\nfive\n";
    for input in [
        format!("{HUGE_COUNT}w"),
        format!("{HUGE_COUNT}e"),
        format!("{HUGE_COUNT}j"),
        format!("{HUGE_COUNT}l"),
        format!("{HUGE_COUNT}\x06"),
        format!("{HUGE_COUNT}\x02"),
        format!("2c{HUGE_COUNT}w\x1b"),
    ] {
        let session = edit(body, &input);
        assert!(!session.should_quit(), "after {input:?}");
        assert!(session.dot() < session.text().len(), "after {input:?}");
    }
}

#[test]
fn test_repeated_search_wraps_with_huge_count() {
    let mut session = session("ab\nab\nab\n");
    let mut host = MemoryHost::new();
    type_keys(&mut session, &mut host, "/ab\r");
    assert_eq!(session.dot(), 3);
    // The count saturates to a multiple of the three hits.
    type_keys(&mut session, &mut host, &format!("{HUGE_COUNT}n"));
    assert!(!session.should_quit());
    assert_eq!(session.dot(), 3);
}
