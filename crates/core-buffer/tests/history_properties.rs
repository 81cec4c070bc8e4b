use core_buffer::{Buffer, Position};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Type(usize, usize, char),
    Insert(usize, usize, String),
    Delete(usize, usize, usize),
    Split(usize, usize),
    Join(usize),
    Replace(String, String),
    Pause,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<usize>(), any::<usize>(), prop::char::range('a', 'e')).prop_map(|(r, c, ch)| Op::Type(r, c, ch)),
        (any::<usize>(), any::<usize>(), "[a-cé漢]{1,4}").prop_map(|(r, c, s)| Op::Insert(r, c, s)),
        (any::<usize>(), any::<usize>(), 1usize..4).prop_map(|(r, c, n)| Op::Delete(r, c, n)),
        (any::<usize>(), any::<usize>()).prop_map(|(r, c)| Op::Split(r, c)),
        any::<usize>().prop_map(Op::Join),
        ("[a-c]{1,2}", "[a-cé]{0,2}").prop_map(|(a, b)| Op::Replace(a, b)),
        Just(Op::Pause),
    ]
}

fn snapshot(b: &Buffer) -> Vec<String> {
    b.lines().map(String::from).collect()
}

/// Map arbitrary numbers onto a position that exists in the buffer.
fn clamp(b: &Buffer, r: usize, c: usize) -> Position {
    let row = r % b.line_count();
    let len = b.unicode_len(row).unwrap();
    Position::new(row, c % (len + 1))
}

fn apply(b: &mut Buffer, op: &Op) {
    match op {
        Op::Type(r, c, ch) => {
            let pos = clamp(b, *r, *c);
            b.insert_text(pos, &ch.to_string()).unwrap();
        }
        Op::Insert(r, c, s) => {
            let pos = clamp(b, *r, *c);
            b.insert_text(pos, s).unwrap();
        }
        Op::Delete(r, c, n) => {
            let pos = clamp(b, *r, *c);
            b.delete_text(pos, *n).unwrap();
        }
        Op::Split(r, c) => {
            let pos = clamp(b, *r, *c);
            b.split_line(pos).unwrap();
        }
        Op::Join(r) => {
            if b.line_count() > 1 {
                b.join_lines(1 + r % (b.line_count() - 1)).unwrap();
            }
        }
        Op::Replace(old, new) => {
            b.replace_all(old, new).unwrap();
        }
        Op::Pause => b.break_coalescing(),
    }
}

proptest! {
    #[test]
    fn undo_everything_restores_start(ops in prop::collection::vec(op(), 1..40)) {
        let mut b = Buffer::new();
        b.insert_text(Position::origin(), "abc").unwrap();
        b.split_line(Position::new(0, 1)).unwrap();
        let start = snapshot(&b);
        let start_depth = b.undo_depth();

        for op in &ops {
            apply(&mut b, op);
        }
        let edited = snapshot(&b);
        let steps = b.undo_depth() - start_depth;

        for _ in 0..steps {
            prop_assert!(b.undo().unwrap().is_some());
        }
        prop_assert_eq!(snapshot(&b), start);

        for _ in 0..steps {
            prop_assert!(b.redo().unwrap().is_some());
        }
        prop_assert_eq!(snapshot(&b), edited);
        prop_assert!(b.redo().unwrap().is_none());
    }

    #[test]
    fn highlight_matches_fresh_lex_after_edits(ops in prop::collection::vec(op(), 1..25)) {
        let mut b = Buffer::new();
        b.set_language("c").unwrap();
        b.insert_text(Position::origin(), "/*a*/ b \"c\" // d").unwrap();
        for op in &ops {
            apply(&mut b, op);
            let last = b.line_count() - 1;
            b.highlight(last).unwrap();
        }
        let mut fresh = Buffer::new();
        fresh.set_language("c").unwrap();
        for (row, line) in snapshot(&b).iter().enumerate() {
            if row > 0 {
                let prev = fresh.unicode_len(row - 1).unwrap();
                fresh.split_line(Position::new(row - 1, prev)).unwrap();
            }
            fresh.insert_text(Position::new(row, 0), line).unwrap();
        }
        for row in 0..b.line_count() {
            let cached = b.highlight(row).unwrap().to_vec();
            let expected = fresh.highlight(row).unwrap().to_vec();
            prop_assert_eq!(cached, expected);
        }
    }
}
