use anyhow::Result;
use core_buffer::{
    Buffer, BufferError, BufferOptions, Clipboard, ErrorKind, LineEnding, LineEndingPolicy,
    Position,
};
use core_config::Config;
use pretty_assertions::assert_eq;
use std::fs;

#[test]
fn missing_file_loads_as_single_empty_line() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("new.txt");
    let mut b = Buffer::new();
    b.load_file(&path)?;
    assert_eq!(b.line_count(), 1);
    assert_eq!(b.line(0)?, "");
    assert_eq!(b.path(), Some(path.as_path()));
    assert!(!b.is_modified());
    assert!(!path.exists());
    Ok(())
}

#[test]
fn lf_round_trip_is_byte_exact() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("a.txt");
    for content in ["", "one", "one\ntwo", "one\ntwo\n", "\n\n", "héllo\n漢字\n"] {
        fs::write(&path, content)?;
        let mut b = Buffer::new();
        b.load_file(&path)?;
        b.save()?;
        assert_eq!(fs::read_to_string(&path)?, content);
    }
    Ok(())
}

#[test]
fn crlf_round_trip_keeps_style() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("dos.txt");
    fs::write(&path, "one\r\ntwo\r\n")?;
    let mut b = Buffer::new();
    b.load_file(&path)?;
    assert_eq!(b.line_ending(), LineEnding::Crlf);
    assert_eq!(b.lines().collect::<Vec<_>>(), vec!["one", "two", ""]);
    b.insert_text(Position::new(1, 3), "!")?;
    b.save()?;
    assert_eq!(fs::read_to_string(&path)?, "one\r\ntwo!\r\n");
    Ok(())
}

#[test]
fn mixed_endings_load_as_lf_with_carriage_returns_kept() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("mixed.txt");
    fs::write(&path, "a\r\nb\nc")?;
    let mut b = Buffer::new();
    b.load_file(&path)?;
    assert_eq!(b.line_ending(), LineEnding::Lf);
    assert_eq!(b.line(0)?, "a\r");
    b.save()?;
    assert_eq!(fs::read_to_string(&path)?, "a\r\nb\nc");
    Ok(())
}

#[test]
fn configured_policy_rewrites_terminators() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("unix.txt");
    fs::write(&path, "x\ny")?;
    let mut config = Config::default();
    config.file.io.line_ending = LineEndingPolicy::Crlf;
    let mut b = Buffer::with_options(BufferOptions::from_config(&config, Clipboard::new()));
    b.load_file(&path)?;
    b.save()?;
    assert_eq!(fs::read_to_string(&path)?, "x\r\ny");
    Ok(())
}

#[test]
fn save_clears_modified_only_for_own_path() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let own = dir.path().join("own.txt");
    let other = dir.path().join("copy.txt");
    let mut b = Buffer::new();
    b.load_file(&own)?;
    b.insert_text(Position::origin(), "data")?;
    assert!(b.is_modified());

    b.save_file(&other)?;
    assert_eq!(fs::read_to_string(&other)?, "data");
    assert!(b.is_modified());
    assert_eq!(b.path(), Some(own.as_path()));

    b.save_file(&own)?;
    assert!(!b.is_modified());
    b.undo()?;
    assert!(b.is_modified());
    Ok(())
}

#[test]
fn save_as_retargets_and_picks_language() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("main.rs");
    let mut b = Buffer::new();
    b.insert_text(Position::origin(), "fn main() {}")?;
    b.save_as(&path)?;
    assert_eq!(b.path(), Some(path.as_path()));
    assert!(!b.is_modified());
    assert_eq!(b.language().name(), "rust");
    assert_eq!(fs::read_to_string(&path)?, "fn main() {}");
    Ok(())
}

#[test]
fn load_picks_language_by_extension() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("script.PY");
    fs::write(&path, "def f():\n    return 1\n")?;
    let mut b = Buffer::new();
    b.load_file(&path)?;
    assert_eq!(b.language().name(), "python");
    let toks = b.highlight(1)?.to_vec();
    assert_eq!((toks[0].start, toks[0].end), (4, 10));
    Ok(())
}

#[test]
fn load_discards_history() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("h.txt");
    fs::write(&path, "disk")?;
    let mut b = Buffer::new();
    b.insert_text(Position::origin(), "memory")?;
    b.load_file(&path)?;
    assert!(!b.can_undo());
    assert_eq!(b.undo()?, None);
    assert_eq!(b.line(0)?, "disk");
    Ok(())
}

#[test]
fn invalid_utf8_leaves_buffer_untouched() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("bin.dat");
    fs::write(&path, [b'o', b'k', 0xc3, 0x28])?;
    let mut b = Buffer::new();
    b.insert_text(Position::origin(), "keep")?;
    let err = b.load_file(&path).unwrap_err();
    assert!(matches!(err, BufferError::InvalidEncoding { .. }));
    assert_eq!(b.line(0)?, "keep");
    assert!(b.path().is_none());
    assert!(b.can_undo());
    Ok(())
}

#[test]
fn write_failure_is_io_error() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut b = Buffer::new();
    b.insert_text(Position::origin(), "x")?;
    let err = b.save_file(dir.path().join("no_such_dir").join("f.txt")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    let err = b.save_file(dir.path()).unwrap_err();
    assert!(matches!(err, BufferError::Io { .. }));
    assert!(b.is_modified());
    Ok(())
}

#[test]
fn undo_past_trimmed_history_stays_modified() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("trim.txt");
    fs::write(&path, "")?;
    let mut config = Config::default();
    config.file.history.max_depth = 2;
    config.file.history.coalesce = false;
    let mut b = Buffer::with_options(BufferOptions::from_config(&config, Clipboard::new()));
    b.load_file(&path)?;
    for column in 0..3 {
        b.insert_text(Position::new(0, column), "x")?;
    }
    while b.undo()?.is_some() {}

    // The oldest insert fell off the stack and is still in the text.
    assert_eq!(b.line(0)?, "x");
    assert_eq!(fs::read_to_string(&path)?, "");
    assert!(b.is_modified());

    b.save()?;
    assert!(!b.is_modified());
    b.redo()?;
    assert!(b.is_modified());
    Ok(())
}

#[test]
fn reload_after_trim_is_clean() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("reload.txt");
    fs::write(&path, "base")?;
    let mut config = Config::default();
    config.file.history.max_depth = 1;
    let mut b = Buffer::with_options(BufferOptions::from_config(&config, Clipboard::new()));
    b.load_file(&path)?;
    b.insert_text(Position::origin(), "ab")?;
    b.insert_text(Position::origin(), "cd")?;
    b.undo()?;
    assert!(b.is_modified());
    b.load_file(&path)?;
    assert!(!b.is_modified());
    assert_eq!(b.line(0)?, "base");
    Ok(())
}
