//! End-to-end scenarios over the public scrollback API.
//!
//! Lines go in through `integration::feed_lines` the way the front end feeds
//! them, and pages come out through the ratatui `BufferSink`.

use chatscroll::integration::feed_lines;
use chatscroll::view::{BufferSink, ColorConfig};
use chatscroll::view_state::{CellMeasurer, Scrollback, ScrollbackOptions, TextPosition};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

// ===== Test Helpers =====

fn scrollback(width: u32, rows: usize, options: ScrollbackOptions) -> Scrollback<CellMeasurer> {
    let mut sb = Scrollback::new(CellMeasurer::new(), width, options);
    sb.set_page_rows(rows);
    sb
}

fn feed(sb: &mut Scrollback<CellMeasurer>, lines: &[&str]) {
    feed_lines(sb, lines.iter().map(|l| l.as_bytes()));
}

/// Paint the current page and return it with every row prefixed by `|`.
fn screen(sb: &mut Scrollback<CellMeasurer>, width: u16) -> String {
    let area = Rect::new(0, 0, width, sb.page_rows() as u16);
    let mut buf = Buffer::empty(area);
    let mut sink = BufferSink::new(&mut buf, area, CellMeasurer::new(), ColorConfig::with_colors(false));
    sb.render_page(&mut sink);

    let mut lines = Vec::new();
    for y in area.top()..area.bottom() {
        let mut line = String::new();
        for x in area.left()..area.right() {
            line.push_str(buf[(x, y)].symbol());
        }
        lines.push(format!("|{}", line.trim_end()));
    }
    lines.join("\n")
}

fn texts(sb: &Scrollback<CellMeasurer>) -> Vec<String> {
    let mut out = Vec::new();
    sb.for_each(|bytes| out.push(String::from_utf8_lossy(bytes).into_owned()));
    out
}

// ===== Layout =====

#[test]
fn chat_page_aligns_nicks_and_wraps_replies() {
    let mut sb = scrollback(24, 6, ScrollbackOptions::default());
    feed(
        &mut sb,
        &[
            "* joined #rust",
            "<alice>\thello there",
            "<bob>\tthis reply is long enough to wrap",
        ],
    );

    // "<alice>" pushed the separator to column 10
    assert_eq!(sb.indent(), 10);
    assert_eq!(sb.total_visual_lines(), 6);
    insta::assert_snapshot!(screen(&mut sb, 24), @r"
|  * joined #rust
|  <alice> hello there
|    <bob> this reply
|          is long
|          enough to
|          wrap
");
}

#[test]
fn longer_nick_moves_every_reply() {
    let mut sb = scrollback(40, 4, ScrollbackOptions::default());
    feed(&mut sb, &["<bob>\tone", "<charlie_>\ttwo"]);

    assert_eq!(sb.indent(), 13);
    insta::assert_snapshot!(screen(&mut sb, 40), @r"
|       <bob> one
|  <charlie_> two
|
|
");
}

// ===== Scrolled-up reading while output arrives =====

#[test]
fn reader_keeps_place_while_old_lines_are_evicted() {
    let options = ScrollbackOptions {
        capacity: 4,
        ..ScrollbackOptions::default()
    };
    let mut sb = scrollback(24, 2, options);
    feed(&mut sb, &["one", "two", "three", "four"]);
    sb.scroll_to(1);
    assert!(!sb.stick_to_bottom());

    let two = sb.locate(1).unwrap().entry;
    sb.set_selection(TextPosition::new(two, 0), TextPosition::new(two, 3));
    assert_eq!(sb.selection_text().as_deref(), Some("two"));

    feed(&mut sb, &["five"]);
    assert_eq!(texts(&sb), ["two", "three", "four", "five"]);
    assert_eq!(sb.scroll(), 0, "page still starts at \"two\"");
    assert_eq!(sb.selection_text().as_deref(), Some("two"));

    feed(&mut sb, &["six"]);
    assert_eq!(texts(&sb), ["three", "four", "five", "six"]);
    assert!(sb.selection().is_none(), "selection went with its entry");
    assert!(!sb.stick_to_bottom());
}

#[test]
fn following_reader_sees_newest_lines() {
    let mut sb = scrollback(24, 2, ScrollbackOptions::default());
    feed(&mut sb, &["one", "two", "three"]);
    assert_eq!(sb.scroll(), 1);

    feed(&mut sb, &["four"]);
    assert_eq!(sb.scroll(), 2);
    insta::assert_snapshot!(screen(&mut sb, 24), @r"
|  three
|  four
");
}

// ===== Search =====

#[test]
fn search_scrolls_to_match_and_wraps_around_after_a_miss() {
    let mut lines: Vec<String> = (0..30).map(|i| format!("message {}", i)).collect();
    lines[20] = "a needle in here".to_string();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();

    let mut sb = scrollback(40, 5, ScrollbackOptions::default());
    feed(&mut sb, &refs);
    sb.scroll_to(0);

    let hit = sb.find_next(b"NEEDLE").unwrap();
    assert_eq!(sb.scroll(), 20);
    assert_eq!(sb.line_of(hit.entry), Some(20));
    assert_eq!(sb.selection_text().as_deref(), Some("needle"));

    // the mark survives a reflow
    sb.resize(12);
    assert_eq!(sb.selection_text().as_deref(), Some("needle"));

    assert!(sb.find_next(b"needle").is_none());
    assert!(sb.selection().is_none());
    let again = sb.find_next(b"needle").unwrap();
    assert_eq!(again.entry, hit.entry);
}

// ===== Selection =====

#[test]
fn selection_across_entries_strips_codes() {
    let mut sb = scrollback(40, 4, ScrollbackOptions::default());
    feed(&mut sb, &["\x0304red\x03 plain", "\x02bold\x02 end"]);
    let first = sb.store().first().unwrap();
    let (first_id, last) = (first.id(), sb.store().last().unwrap());
    let (last_id, last_len) = (last.id(), last.len());

    sb.set_selection(TextPosition::new(first_id, 0), TextPosition::new(last_id, last_len));
    assert_eq!(sb.selection_text().as_deref(), Some("red plain\nbold end"));

    sb.clear_selection();
    assert!(sb.selection_text().is_none());
}

#[test]
fn double_click_word_after_render() {
    let mut sb = scrollback(40, 2, ScrollbackOptions::default());
    feed(&mut sb, &["hello (world) again"]);
    screen(&mut sb, 40);

    // column 9 is inside "world"
    let word = sb.word_at(9, 0).unwrap();
    assert_eq!(word.text, "world");
    assert_eq!(word.bytes, 7..12);
}

// ===== Export =====

#[test]
fn export_writes_what_the_reader_saw() {
    let mut sb = scrollback(24, 4, ScrollbackOptions::default());
    feed(&mut sb, &["\x1funder\x1f line", "<bob>\thi"]);

    let mut plain = Vec::new();
    sb.export_plain(&mut plain).unwrap();
    assert_eq!(String::from_utf8(plain).unwrap(), "under line\n<bob> hi\n");

    let mut jsonl = Vec::new();
    sb.export_jsonl(&mut jsonl).unwrap();
    let records: Vec<serde_json::Value> = String::from_utf8(jsonl)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["text"], "<bob> hi");
    assert!(records[0]["timestamp"].is_string());
}
