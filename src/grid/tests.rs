// Grid unit tests

use crate::cell::Cell;
use crate::grid::Grid;

fn write_text(grid: &mut Grid, row: usize, text: &str) {
    for (i, c) in text.chars().enumerate() {
        let mut cell = Cell::default();
        cell.c = c;
        grid.set(i, row, cell);
    }
}

#[test]
fn test_new_grid_dimensions() {
    let grid = Grid::new(80, 24);
    assert_eq!(grid.cols(), 80);
    assert_eq!(grid.rows(), 24);
    assert!(grid.get(0, 0).unwrap().is_blank());
    assert!(grid.get(79, 23).is_some());
    assert!(grid.get(80, 0).is_none());
    assert!(grid.get(0, 24).is_none());
}

#[test]
fn test_zero_dimensions_clamped() {
    let grid = Grid::new(0, 0);
    assert_eq!(grid.cols(), 1);
    assert_eq!(grid.rows(), 1);
}

#[test]
fn test_set_and_row_text() {
    let mut grid = Grid::new(10, 4);
    write_text(&mut grid, 1, "hello");
    assert_eq!(grid.row_text(1), "hello     ");
    assert_eq!(grid.row_text(0), "          ");
}

#[test]
fn test_out_of_range_set_dropped() {
    let mut grid = Grid::new(4, 2);
    let mut cell = Cell::default();
    cell.c = 'x';
    grid.set(4, 0, cell.clone());
    grid.set(0, 2, cell);
    assert_eq!(grid.row_text(0), "    ");
    assert_eq!(grid.row_text(1), "    ");
}

#[test]
fn test_resize_preserves_top_left() {
    let mut grid = Grid::new(10, 4);
    write_text(&mut grid, 0, "abcdefghij");
    write_text(&mut grid, 3, "last");

    grid.resize(5, 2);
    assert_eq!(grid.row_text(0), "abcde");
    assert_eq!(grid.rows(), 2);

    grid.resize(8, 3);
    assert_eq!(grid.row_text(0), "abcde   ");
    assert_eq!(grid.row_text(2), "        ");
}

#[test]
fn test_clear_operations() {
    let mut grid = Grid::new(6, 3);
    for r in 0..3 {
        write_text(&mut grid, r, "xxxxxx");
    }

    grid.clear_line_right(3, 0);
    assert_eq!(grid.row_text(0), "xxx   ");

    grid.clear_line_left(2, 1);
    assert_eq!(grid.row_text(1), "   xxx");

    grid.clear_row(2);
    assert_eq!(grid.row_text(2), "      ");
}

#[test]
fn test_clear_screen_below_and_above() {
    let mut grid = Grid::new(4, 4);
    for r in 0..4 {
        write_text(&mut grid, r, "aaaa");
    }

    grid.clear_screen_below(2, 1);
    assert_eq!(grid.row_text(0), "aaaa");
    assert_eq!(grid.row_text(1), "aa  ");
    assert_eq!(grid.row_text(2), "    ");
    assert_eq!(grid.row_text(3), "    ");

    let mut grid = Grid::new(4, 4);
    for r in 0..4 {
        write_text(&mut grid, r, "bbbb");
    }
    grid.clear_screen_above(1, 2);
    assert_eq!(grid.row_text(0), "    ");
    assert_eq!(grid.row_text(1), "    ");
    assert_eq!(grid.row_text(2), "  bb");
    assert_eq!(grid.row_text(3), "bbbb");
}

#[test]
fn test_scroll_region_up() {
    let mut grid = Grid::new(3, 5);
    for r in 0..5 {
        write_text(&mut grid, r, &format!("{0}{0}{0}", r));
    }

    grid.scroll_region_up(1, 1, 3);
    assert_eq!(grid.row_text(0), "000");
    assert_eq!(grid.row_text(1), "222");
    assert_eq!(grid.row_text(2), "333");
    assert_eq!(grid.row_text(3), "   ");
    assert_eq!(grid.row_text(4), "444");
}

#[test]
fn test_scroll_region_down() {
    let mut grid = Grid::new(3, 5);
    for r in 0..5 {
        write_text(&mut grid, r, &format!("{0}{0}{0}", r));
    }

    grid.scroll_region_down(1, 1, 3);
    assert_eq!(grid.row_text(0), "000");
    assert_eq!(grid.row_text(1), "   ");
    assert_eq!(grid.row_text(2), "111");
    assert_eq!(grid.row_text(3), "222");
    assert_eq!(grid.row_text(4), "444");
}

#[test]
fn test_scroll_full_region_clears() {
    let mut grid = Grid::new(2, 3);
    for r in 0..3 {
        write_text(&mut grid, r, "zz");
    }
    grid.scroll_region_up(5, 0, 2);
    for r in 0..3 {
        assert_eq!(grid.row_text(r), "  ");
    }
}

#[test]
fn test_scroll_invalid_region_ignored() {
    let mut grid = Grid::new(2, 3);
    write_text(&mut grid, 0, "ab");
    grid.scroll_region_up(1, 2, 1);
    grid.scroll_region_up(1, 0, 3);
    assert_eq!(grid.row_text(0), "ab");
}

#[test]
fn test_insert_lines() {
    let mut grid = Grid::new(3, 4);
    for r in 0..4 {
        write_text(&mut grid, r, &format!("{0}{0}{0}", r));
    }

    grid.insert_lines(1, 1, 3);
    assert_eq!(grid.row_text(0), "000");
    assert_eq!(grid.row_text(1), "   ");
    assert_eq!(grid.row_text(2), "111");
    assert_eq!(grid.row_text(3), "222");
}

#[test]
fn test_delete_lines() {
    let mut grid = Grid::new(3, 4);
    for r in 0..4 {
        write_text(&mut grid, r, &format!("{0}{0}{0}", r));
    }

    grid.delete_lines(1, 1, 3);
    assert_eq!(grid.row_text(0), "000");
    assert_eq!(grid.row_text(1), "222");
    assert_eq!(grid.row_text(2), "333");
    assert_eq!(grid.row_text(3), "   ");
}

#[test]
fn test_insert_chars_truncates_at_last_column() {
    let mut grid = Grid::new(6, 1);
    write_text(&mut grid, 0, "abcdef");

    grid.insert_chars(2, 0, 2);
    assert_eq!(grid.row_text(0), "ab  cd");
}

#[test]
fn test_delete_chars_fills_with_blanks() {
    let mut grid = Grid::new(6, 1);
    write_text(&mut grid, 0, "abcdef");

    grid.delete_chars(1, 0, 2);
    assert_eq!(grid.row_text(0), "adef  ");
}

#[test]
fn test_erase_characters_in_place() {
    let mut grid = Grid::new(6, 1);
    write_text(&mut grid, 0, "abcdef");

    grid.erase_characters(2, 0, 3);
    assert_eq!(grid.row_text(0), "ab   f");

    grid.erase_characters(4, 0, 10);
    assert_eq!(grid.row_text(0), "ab    ");
}
