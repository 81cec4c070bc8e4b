use anyhow::Result;
use core_buffer::{BufferError, BufferId, EditorContext, Position, Token, TokenKind};
use core_config::Config;
use pretty_assertions::assert_eq;

#[test]
fn buffers_in_one_context_share_the_clipboard() -> Result<()> {
    let mut ctx = EditorContext::default();
    let a = ctx.create_buffer();
    let b = ctx.create_buffer();
    assert_ne!(a, b);

    ctx.buffer_mut(a)?.insert_text(Position::origin(), "shared é")?;
    ctx.buffer_mut(a)?.copy_text(Position::new(0, 7), 1)?;
    ctx.buffer_mut(b)?.paste_text(Position::origin())?;
    assert_eq!(ctx.buffer(b)?.line(0)?, "é");
    assert_eq!(ctx.clipboard().get().as_deref(), Some("é"));
    Ok(())
}

#[test]
fn separate_contexts_are_isolated() -> Result<()> {
    let mut one = EditorContext::default();
    let mut two = EditorContext::default();
    let a = one.create_buffer();
    let b = two.create_buffer();
    one.buffer_mut(a)?.insert_text(Position::origin(), "x")?;
    one.buffer_mut(a)?.copy_text(Position::origin(), 1)?;
    assert!(two.clipboard().is_empty());
    assert_eq!(two.buffer_mut(b)?.paste_text(Position::origin())?, None);
    Ok(())
}

#[test]
fn destroyed_handle_is_rejected() -> Result<()> {
    let mut ctx = EditorContext::default();
    let id = ctx.create_buffer();
    ctx.destroy_buffer(id)?;
    assert!(ctx.is_empty());
    assert!(matches!(ctx.buffer(id), Err(BufferError::UnknownHandle(x)) if x == id));
    assert!(matches!(
        ctx.destroy_buffer(id),
        Err(BufferError::UnknownHandle(_))
    ));
    assert!(ctx.buffer_mut(BufferId(999)).is_err());
    // ids are not reused
    let next = ctx.create_buffer();
    assert_ne!(next, id);
    Ok(())
}

#[test]
fn opening_the_same_file_twice_reuses_the_buffer() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "first\nsecond")?;
    let mut ctx = EditorContext::default();
    let a = ctx.open(&path)?;
    let b = ctx.open(dir.path().join(".").join("notes.txt"))?;
    assert_eq!(a, b);
    assert_eq!(ctx.len(), 1);
    assert_eq!(ctx.buffer(a)?.line_count(), 2);
    assert_eq!(ctx.find_by_path(&path), Some(a));
    Ok(())
}

#[test]
fn config_flows_into_new_buffers() -> Result<()> {
    let mut config = Config::default();
    config.file.history.max_depth = 2;
    config.file.history.coalesce = false;
    config.file.syntax.default_language = "c".to_string();
    let mut ctx = EditorContext::new(config);
    let id = ctx.create_buffer();
    let buf = ctx.buffer_mut(id)?;
    assert_eq!(buf.language().name(), "c");
    for (i, c) in "abcd".chars().enumerate() {
        buf.insert_text(Position::new(0, i), &c.to_string())?;
    }
    assert_eq!(buf.undo_depth(), 2);
    buf.undo()?;
    buf.undo()?;
    assert_eq!(buf.undo()?, None);
    assert_eq!(buf.line(0)?, "ab");
    Ok(())
}

#[test]
fn open_error_registers_nothing() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("bad.txt");
    std::fs::write(&path, [0xff])?;
    let mut ctx = EditorContext::default();
    assert!(ctx.open(&path).is_err());
    assert!(ctx.is_empty());
    Ok(())
}

#[test]
fn configured_language_with_prefixed_block_marker() -> Result<()> {
    let config = core_config::Config {
        file: core_config::parse(
            "[[syntax.languages]]\nname = \"lua\"\nextensions = [\"lua\"]\n\
             keywords = [\"local\"]\nline_comment = \"--\"\nblock_comment = [\"--[[\", \"]]\"]\n",
        )?,
        ..Config::default()
    };
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("init.lua");
    std::fs::write(&path, "--[[ header\nlocal x\n]] local y -- tail")?;
    let mut ctx = EditorContext::new(config);
    let id = ctx.open(&path)?;
    let buf = ctx.buffer_mut(id)?;
    assert_eq!(buf.language().name(), "lua");

    let row1 = buf.highlight(1)?.to_vec();
    assert_eq!(row1, vec![Token::new(0, 7, TokenKind::Comment)]);
    let row2 = buf.highlight(2)?.to_vec();
    assert_eq!(
        row2,
        vec![
            Token::new(0, 2, TokenKind::Comment),
            Token::new(3, 8, TokenKind::Keyword),
            Token::new(11, 18, TokenKind::Comment),
        ]
    );
    Ok(())
}
