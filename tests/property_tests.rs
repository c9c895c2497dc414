//! Property-based tests for scrollback invariants.
//!
//! Tests validate, over random sequences of appends, resizes, scrolls and
//! page renders:
//! 1. Every visual line resolves, and resolves back to itself
//! 2. The store stays within capacity unless a single entry exceeds it
//! 3. The scroll value stays within bounds
//! 4. Selections never outlive their entries
//! 5. Plain export writes one line per entry

use chatscroll::model::attr::TextStyle;
use chatscroll::view_state::{
    CellMeasurer, PaintSink, Scrollback, ScrollbackOptions, TextPosition,
};
use proptest::prelude::*;

// ===== Helpers =====

struct NullSink;

impl PaintSink for NullSink {
    fn draw_run(&mut self, _x: u32, _row: usize, text: &[u8], _selected: bool, _style: &TextStyle) -> u32 {
        text.len() as u32
    }
}

#[derive(Debug, Clone)]
enum Op {
    Append(String),
    AppendIndent(String, String),
    Resize(u32),
    Scroll(isize),
    Render,
    Select(usize, usize),
}

fn text() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z ()<>0-9,\u{2}\u{3}\u{f}\u{1f}\u{e9}\u{65e5}]{0,60}")
        .expect("valid regex")
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => text().prop_map(Op::Append),
        2 => ("[a-z<>]{0,10}", text()).prop_map(|(l, r)| Op::AppendIndent(l, r)),
        1 => (0u32..60).prop_map(Op::Resize),
        1 => (-10isize..10).prop_map(Op::Scroll),
        1 => Just(Op::Render),
        1 => (0usize..40, 0usize..40).prop_map(|(a, b)| Op::Select(a, b)),
    ]
}

fn apply(sb: &mut Scrollback<CellMeasurer>, op: &Op) {
    match op {
        Op::Append(t) => {
            sb.append(t.as_bytes());
        }
        Op::AppendIndent(l, r) => {
            sb.append_indent(l.as_bytes(), r.as_bytes());
        }
        Op::Resize(w) => {
            sb.resize(*w);
        }
        Op::Scroll(d) => sb.scroll_by(*d),
        Op::Render => {
            sb.render_page(&mut NullSink);
        }
        Op::Select(a, b) => {
            let (Some(first), Some(last)) = (sb.store().first(), sb.store().last()) else {
                return;
            };
            let (first, last) = (first.id(), last.id());
            sb.set_selection(TextPosition::new(first, *a), TextPosition::new(last, *b));
        }
    }
}

fn scrollback(capacity: usize) -> Scrollback<CellMeasurer> {
    let options = ScrollbackOptions {
        capacity,
        ..ScrollbackOptions::default()
    };
    let mut sb = Scrollback::new(CellMeasurer::new(), 24, options);
    sb.set_page_rows(5);
    sb
}

// ===== Properties =====

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_visual_line_round_trips(ops in prop::collection::vec(op(), 0..40)) {
        let mut sb = scrollback(0);
        for op in &ops {
            apply(&mut sb, op);
        }

        let total = sb.total_visual_lines();
        let mut expected = 0;
        for line in sb.store().iter() {
            expected += line.sub_lines();
        }
        prop_assert_eq!(total, expected);

        for line in 0..total {
            let loc = sb.locate(line);
            prop_assert!(loc.is_some(), "line {} of {} did not resolve", line, total);
            let loc = loc.unwrap();
            let start = sb.line_of(loc.entry).unwrap();
            prop_assert_eq!(start + loc.sub_line, line);
        }
        prop_assert!(sb.locate(total).is_none());
    }

    #[test]
    fn capacity_is_respected(
        capacity in 1usize..30,
        ops in prop::collection::vec(op(), 0..60),
    ) {
        let mut sb = scrollback(capacity);
        for op in &ops {
            apply(&mut sb, op);
            let within = sb.total_visual_lines() <= capacity || sb.len() == 1;
            prop_assert!(within, "total {} over capacity {}", sb.total_visual_lines(), capacity);
        }
    }

    #[test]
    fn scroll_stays_in_bounds(ops in prop::collection::vec(op(), 0..60)) {
        let mut sb = scrollback(20);
        for op in &ops {
            apply(&mut sb, op);
            prop_assert!(sb.scroll() <= sb.max_scroll());
            prop_assert_eq!(
                sb.max_scroll(),
                sb.total_visual_lines().saturating_sub(sb.page_rows())
            );
        }
    }

    #[test]
    fn selection_never_outlives_entries(ops in prop::collection::vec(op(), 0..60)) {
        let mut sb = scrollback(12);
        for op in &ops {
            apply(&mut sb, op);
            if let Some(range) = sb.selection() {
                prop_assert!(sb.store().contains(range.start.entry));
                prop_assert!(sb.store().contains(range.end.entry));
                prop_assert!(range.start <= range.end);
            }
        }
    }

    #[test]
    fn plain_export_has_one_line_per_entry(lines in prop::collection::vec(text(), 0..20)) {
        let mut sb = scrollback(0);
        for line in &lines {
            sb.append(line.as_bytes());
        }
        let mut out = Vec::new();
        sb.export_plain(&mut out).unwrap();
        prop_assert_eq!(out.iter().filter(|&&b| b == b'\n').count(), lines.len());
    }
}
