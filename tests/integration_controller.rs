use std::fs;

use vedit::cmd_args::CommandLineArgs;
use vedit::editor::io::{MockEventStream, MockRenderStream, RenderCommand};
use vedit::editor::AppController;

fn run_with_file(contents: &str, input: &str, extra_args: &[&str]) -> (String, MockRenderStream) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("file.txt");
    fs::write(&path, contents).unwrap();
    let path_arg = path.to_str().unwrap().to_string();

    let mut args = vec!["vedit".to_string()];
    args.extend(extra_args.iter().map(|a| a.to_string()));
    args.push(path_arg);
    let cmd_args = CommandLineArgs::parse_from(args);

    let stream = MockRenderStream::with_size((160, 10));
    let mut controller =
        AppController::with_io_streams(cmd_args, MockEventStream::typing(input), stream.clone())
            .unwrap();
    controller.run().unwrap();

    (fs::read_to_string(&path).unwrap(), stream)
}

#[test]
fn test_edit_and_save_file() {
    let (saved, _) = run_with_file("first\nsecond\n", "ddGp:wq\r", &[]);
    assert_eq!(saved, "second\nfirst\n");
}

#[test]
fn test_zz_writes_only_when_modified() {
    let (saved, _) = run_with_file("keep\n", "ZZ", &[]);
    assert_eq!(saved, "keep\n");
    let (saved, _) = run_with_file("keep\n", "AX\x1bZZ", &[]);
    assert_eq!(saved, "keepX\n");
}

#[test]
fn test_startup_commands_run_after_load() {
    let (saved, _) = run_with_file("a\nb\nc\n", ":wq\r", &["-c", "2d"]);
    assert_eq!(saved, "a\nc\n");
}

#[test]
fn test_read_only_blocks_write() {
    let (saved, stream) = run_with_file("orig\n", "x:w\r:q!\r", &["-R"]);
    assert_eq!(saved, "orig\n");
    assert!(stream.get_buffer_string().contains("is read only"));
}

#[test]
fn test_screen_shows_file_and_terminal_is_restored() {
    let (_, stream) = run_with_file("visible line\n", ":q\r", &[]);
    let output = stream.get_buffer_string();
    assert!(output.contains("visible line"));
    assert!(output.contains("1L, 13C"));
    assert!(!stream.is_raw_mode());
    assert!(stream.has_command(&RenderCommand::LeaveAlternateScreen));
}
