// Delayed-wrap latch behavior

use crate::screen::Screen;

#[test]
fn test_write_to_last_column_sets_latch() {
    let mut screen = Screen::new(3, 4);
    screen.process(b"abcd");
    assert!(screen.pending_wrap());
    // Cursor stays on the last column, never at col == cols
    assert_eq!(screen.cursor().col, 3);
    assert_eq!(screen.row_text(0), "abcd");
}

#[test]
fn test_next_printable_wraps() {
    let mut screen = Screen::new(3, 4);
    screen.process(b"abcde");
    assert_eq!(screen.row_text(0), "abcd");
    assert_eq!(screen.row_text(1), "e   ");
    assert_eq!(screen.cursor().col, 1);
    assert!(!screen.pending_wrap());
}

#[test]
fn test_cr_clears_latch() {
    let mut screen = Screen::new(3, 4);
    screen.process(b"abcd\rx");
    assert_eq!(screen.row_text(0), "xbcd");
    assert_eq!(screen.row_text(1), "    ");
}

#[test]
fn test_cursor_move_clears_latch() {
    let mut screen = Screen::new(3, 4);
    screen.process(b"abcd\x1b[1;2Hz");
    assert_eq!(screen.row_text(0), "azcd");
    assert_eq!(screen.row_text(1), "    ");
}

#[test]
fn test_wrap_at_scroll_bottom_scrolls() {
    let mut screen = Screen::new(2, 3);
    screen.process(b"abc\r\ndef");
    assert!(screen.pending_wrap());
    screen.process(b"g");
    assert_eq!(screen.row_text(0), "def");
    assert_eq!(screen.row_text(1), "g  ");
}

#[test]
fn test_wrap_applies_pending_style() {
    let mut screen = Screen::new(2, 2);
    screen.process(b"ab\x1b[31mc");
    let cell = screen.cell(0, 1).unwrap();
    assert_eq!(cell.c, 'c');
    assert_eq!(cell.fg, crate::color::Color::Named(crate::color::NamedColor::Red));
}

#[test]
fn test_chunked_input_equivalent_to_whole() {
    let input: &[u8] = b"hello world\x1b[2;1Hsecond\x1b[31mred";
    let mut whole = Screen::new(4, 12);
    whole.process(input);

    for split in 1..input.len() {
        let mut chunked = Screen::new(4, 12);
        chunked.process(&input[..split]);
        chunked.process(&input[split..]);
        for row in 0..4 {
            assert_eq!(chunked.row_text(row), whole.row_text(row), "split at {split}");
        }
        assert_eq!(chunked.cursor(), whole.cursor(), "split at {split}");
    }
}
