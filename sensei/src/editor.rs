//! Line-buffer editing surface for the left panel.
//!
//! `EditorBuffer` holds the source as lines plus a cursor and scroll offset,
//! and implements `EditorSurface` so the session's decoration plan can be
//! pushed into it. Decorations are kept per handle; `set_decorations` uses
//! `reconcile` so only the changed marks are replaced.

use std::collections::BTreeMap;

use sensei_core::annotations::{
    reconcile, Decoration, DecorationHandle, DecorationKind, EditorSurface,
};

#[derive(Debug, Clone)]
pub struct EditorBuffer {
    lines: Vec<String>,
    /// (row, column), both 0-based; column counts chars.
    cursor: (usize, usize),
    /// First visible row (0-based).
    scroll: usize,
    /// Inner height of the editor panel, cached after each render.
    viewport_height: u16,
    decorations: BTreeMap<DecorationHandle, Decoration>,
    next_handle: u64,
}

impl EditorBuffer {
    /// Splits on `\n`; a trailing `\r` from CRLF files is dropped.
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text
                .split('\n')
                .map(|l| l.strip_suffix('\r').unwrap_or(l).to_owned())
                .collect(),
            cursor: (0, 0),
            scroll: 0,
            viewport_height: 0,
            decorations: BTreeMap::new(),
            next_handle: 0,
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn set_viewport_height(&mut self, height: u16) {
        self.viewport_height = height;
    }

    // -- decorations as seen by the renderer ---------------------------------

    /// Gutter marker for 1-based `line`. Critical wins over warning.
    pub fn line_marker(&self, line: usize) -> Option<DecorationKind> {
        let mut marker = None;
        for deco in self.decorations.values().filter(|d| d.covers(line)) {
            match deco.kind {
                DecorationKind::Critical => return Some(DecorationKind::Critical),
                DecorationKind::Warning => marker = Some(DecorationKind::Warning),
                DecorationKind::ActiveHighlight => {}
            }
        }
        marker
    }

    /// `true` if 1-based `line` is inside the active-block highlight.
    pub fn is_highlighted(&self, line: usize) -> bool {
        self.decorations
            .values()
            .any(|d| d.kind == DecorationKind::ActiveHighlight && d.covers(line))
    }

    #[cfg(test)]
    pub fn decoration_count(&self) -> usize {
        self.decorations.len()
    }

    // -- scrolling ------------------------------------------------------------

    fn max_scroll(&self) -> usize {
        self.lines.len().saturating_sub(1)
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.scroll = (self.scroll + rows).min(self.max_scroll());
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.scroll = self.scroll.saturating_sub(rows);
    }

    pub fn scroll_top(&mut self) {
        self.scroll = 0;
    }

    pub fn scroll_bottom(&mut self) {
        let height = self.viewport_height.max(1) as usize;
        self.scroll = self.lines.len().saturating_sub(height);
    }

    pub fn half_page(&self) -> usize {
        (self.viewport_height / 2).max(1) as usize
    }

    /// Keeps the cursor row inside the viewport.
    fn follow_cursor(&mut self) {
        let height = self.viewport_height.max(1) as usize;
        let row = self.cursor.0;
        if row < self.scroll {
            self.scroll = row;
        } else if row >= self.scroll + height {
            self.scroll = row + 1 - height;
        }
    }

    // -- cursor movement --------------------------------------------------------

    fn line_len(&self, row: usize) -> usize {
        self.lines.get(row).map_or(0, |l| l.chars().count())
    }

    fn clamp_column(&mut self) {
        self.cursor.1 = self.cursor.1.min(self.line_len(self.cursor.0));
    }

    pub fn move_left(&mut self) {
        if self.cursor.1 > 0 {
            self.cursor.1 -= 1;
        } else if self.cursor.0 > 0 {
            self.cursor.0 -= 1;
            self.cursor.1 = self.line_len(self.cursor.0);
        }
        self.follow_cursor();
    }

    pub fn move_right(&mut self) {
        if self.cursor.1 < self.line_len(self.cursor.0) {
            self.cursor.1 += 1;
        } else if self.cursor.0 + 1 < self.lines.len() {
            self.cursor.0 += 1;
            self.cursor.1 = 0;
        }
        self.follow_cursor();
    }

    pub fn move_up(&mut self) {
        self.cursor.0 = self.cursor.0.saturating_sub(1);
        self.clamp_column();
        self.follow_cursor();
    }

    pub fn move_down(&mut self) {
        if self.cursor.0 + 1 < self.lines.len() {
            self.cursor.0 += 1;
        }
        self.clamp_column();
        self.follow_cursor();
    }

    pub fn move_home(&mut self) {
        self.cursor.1 = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor.1 = self.line_len(self.cursor.0);
    }

    // -- editing ------------------------------------------------------------------

    fn byte_index(line: &str, col: usize) -> usize {
        line.char_indices().nth(col).map_or(line.len(), |(i, _)| i)
    }

    pub fn insert_char(&mut self, c: char) {
        let (row, col) = self.cursor;
        let line = &mut self.lines[row];
        let at = Self::byte_index(line, col);
        line.insert(at, c);
        self.cursor.1 += 1;
        self.follow_cursor();
    }

    /// Inserts spaces up to the next multiple of four columns.
    pub fn insert_tab(&mut self) {
        let pad = 4 - self.cursor.1 % 4;
        for _ in 0..pad {
            self.insert_char(' ');
        }
    }

    /// Splits the line at the cursor, carrying the current indentation over.
    pub fn insert_newline(&mut self) {
        let (row, col) = self.cursor;
        let line = &mut self.lines[row];
        let at = Self::byte_index(line, col);
        let rest = line.split_off(at);
        let indent: String = line.chars().take_while(|c| *c == ' ' || *c == '\t').collect();
        let indent_len = indent.chars().count();
        self.lines.insert(row + 1, format!("{indent}{rest}"));
        self.cursor = (row + 1, indent_len);
        self.follow_cursor();
    }

    pub fn backspace(&mut self) {
        let (row, col) = self.cursor;
        if col > 0 {
            let line = &mut self.lines[row];
            let at = Self::byte_index(line, col - 1);
            line.remove(at);
            self.cursor.1 -= 1;
        } else if row > 0 {
            let current = self.lines.remove(row);
            let prev_len = self.line_len(row - 1);
            self.lines[row - 1].push_str(&current);
            self.cursor = (row - 1, prev_len);
        } else {
            return;
        }
        self.follow_cursor();
    }

    pub fn delete(&mut self) {
        let (row, col) = self.cursor;
        if col < self.line_len(row) {
            let line = &mut self.lines[row];
            let at = Self::byte_index(line, col);
            line.remove(at);
        } else if row + 1 < self.lines.len() {
            let next = self.lines.remove(row + 1);
            self.lines[row].push_str(&next);
        } else {
            return;
        }
        self.follow_cursor();
    }
}

impl EditorSurface for EditorBuffer {
    fn set_decorations(
        &mut self,
        previous: &[DecorationHandle],
        decorations: &[Decoration],
    ) -> Vec<DecorationHandle> {
        let applied: Vec<(DecorationHandle, Decoration)> = previous
            .iter()
            .filter_map(|h| self.decorations.get(h).map(|d| (*h, *d)))
            .collect();

        let mut next = self.next_handle;
        let out = reconcile(&applied, decorations, || {
            next += 1;
            DecorationHandle(next)
        });
        self.next_handle = next;

        for handle in &out.removed {
            self.decorations.remove(handle);
        }
        for (handle, deco) in &out.added {
            self.decorations.insert(*handle, *deco);
        }
        out.handles
    }

    fn reveal_line(&mut self, line: usize) {
        let height = self.viewport_height.max(1) as usize;
        let target = line.saturating_sub(1).min(self.max_scroll());
        self.scroll = target.saturating_sub(height / 2);
    }

    fn current_text(&self) -> String {
        self.text()
    }

    fn line_count(&self) -> usize {
        self.lines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn editing_round_trips_through_text() {
        let mut ed = EditorBuffer::from_text("def f():\n    return 1");
        ed.move_down();
        ed.move_end();
        ed.insert_newline();
        for c in "pass".chars() {
            ed.insert_char(c);
        }
        assert_eq!(ed.text(), "def f():\n    return 1\n    pass");
        assert_eq!(ed.cursor(), (2, 8));

        ed.move_home();
        ed.backspace();
        assert_eq!(ed.text(), "def f():\n    return 1    pass");
        assert_eq!(ed.line_count(), 2);
    }

    #[test]
    fn multibyte_characters_are_edited_by_char() {
        let mut ed = EditorBuffer::from_text("π = 3");
        ed.move_right();
        ed.insert_char('!');
        assert_eq!(ed.text(), "π! = 3");
        ed.delete();
        ed.move_left();
        ed.backspace();
        assert_eq!(ed.text(), "!= 3");
    }

    #[test]
    fn crlf_input_loses_its_carriage_returns() {
        let mut ed = EditorBuffer::from_text("def f():\r\n    return 1\r\n");
        assert_eq!(ed.lines(), &["def f():", "    return 1", ""]);
        ed.move_end();
        assert_eq!(ed.cursor(), (0, 8));
        assert_eq!(ed.text(), "def f():\n    return 1\n");
    }

    #[test]
    fn decorations_reuse_handles_and_drive_markers() {
        let mut ed = EditorBuffer::from_text(&"x\n".repeat(30));
        let crit = Decoration { start_line: 2, end_line: 4, kind: DecorationKind::Critical };
        let warn = Decoration { start_line: 4, end_line: 6, kind: DecorationKind::Warning };
        let hl = Decoration { start_line: 5, end_line: 6, kind: DecorationKind::ActiveHighlight };

        let first = ed.set_decorations(&[], &[crit, warn]);
        let second = ed.set_decorations(&first, &[crit, warn, hl]);
        assert_eq!(&second[..2], &first[..]);
        assert_eq!(ed.decoration_count(), 3);

        assert_eq!(ed.line_marker(4), Some(DecorationKind::Critical));
        assert_eq!(ed.line_marker(6), Some(DecorationKind::Warning));
        assert_eq!(ed.line_marker(7), None);
        assert!(ed.is_highlighted(5));

        let third = ed.set_decorations(&second, &[crit, warn]);
        assert_eq!(third, first);
        assert!(!ed.is_highlighted(5));
        assert_eq!(ed.decoration_count(), 2);
    }

    #[test]
    fn reveal_centres_the_line() {
        let mut ed = EditorBuffer::from_text(&"x\n".repeat(100));
        ed.set_viewport_height(20);
        ed.reveal_line(50);
        assert_eq!(ed.scroll(), 39);
        ed.reveal_line(3);
        assert_eq!(ed.scroll(), 0);
        ed.reveal_line(10_000);
        assert_eq!(ed.scroll(), 90);
    }
}
