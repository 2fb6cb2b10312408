//! Box-drawing tables and panels for console output.
//!
//! Widths are measured in characters, and colour is applied after padding so
//! escape codes never disturb the layout.

use colored::Colorize;

/// Colour of a cell, panel border or title.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Plain,
    Green,
    Yellow,
    Red,
    Cyan,
    Blue,
    Magenta,
}

impl Tone {
    pub fn paint(self, text: &str) -> String {
        match self {
            Tone::Plain => text.to_string(),
            Tone::Green => text.green().to_string(),
            Tone::Yellow => text.yellow().to_string(),
            Tone::Red => text.red().to_string(),
            Tone::Cyan => text.cyan().to_string(),
            Tone::Blue => text.blue().to_string(),
            Tone::Magenta => text.magenta().to_string(),
        }
    }
}

/// A cell value with its colour.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    text: String,
    tone: Tone,
}

impl Cell {
    pub fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::new(text, Tone::Plain)
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Cell::new(text, Tone::Plain)
    }
}

/// Collects headers and rows, then renders with Unicode borders.
pub struct Table {
    headers: Vec<String>,
    column_tones: Vec<Tone>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|header| header.to_string()).collect(),
            column_tones: vec![Tone::Plain; headers.len()],
            rows: Vec::new(),
        }
    }

    /// Default tone of a column. Out-of-range columns are ignored.
    pub fn tone(mut self, column: usize, tone: Tone) -> Self {
        if let Some(slot) = self.column_tones.get_mut(column) {
            *slot = tone;
        }
        self
    }

    /// Add a row. Extra cells are dropped; missing cells are empty.
    ///
    /// Plain cells take the column tone.
    pub fn add_row(&mut self, cells: Vec<Cell>) {
        let mut cells = cells.into_iter();
        let row = self
            .column_tones
            .iter()
            .map(|column_tone| match cells.next() {
                Some(cell) if cell.tone == Tone::Plain => Cell::new(cell.text, *column_tone),
                Some(cell) => cell,
                None => Cell::new("", Tone::Plain),
            })
            .collect();
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| display_width(h)).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(display_width(&cell.text));
            }
        }
        widths
    }

    fn border(widths: &[usize], left: &str, mid: &str, right: &str) -> String {
        let segments: Vec<String> = widths.iter().map(|w| "\u{2500}".repeat(w + 2)).collect();
        format!("{left}{}{right}", segments.join(mid))
    }

    /// Render to a string.
    ///
    /// ```text
    /// ┌────┬────────┐
    /// │ ID │ Memory │
    /// ├────┼────────┤
    /// │ k1 │ hello  │
    /// └────┴────────┘
    /// ```
    pub fn render(&self) -> String {
        let widths = self.column_widths();
        let mut lines = vec![Self::border(&widths, "\u{250c}", "\u{252c}", "\u{2510}")];

        let header: Vec<String> = self
            .headers
            .iter()
            .zip(&widths)
            .map(|(text, width)| format!(" {} ", pad(text, *width).bold().magenta()))
            .collect();
        lines.push(format!("\u{2502}{}\u{2502}", header.join("\u{2502}")));
        lines.push(Self::border(&widths, "\u{251c}", "\u{253c}", "\u{2524}"));

        for row in &self.rows {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!(" {} ", cell.tone.paint(&pad(&cell.text, *width))))
                .collect();
            lines.push(format!("\u{2502}{}\u{2502}", cells.join("\u{2502}")));
        }

        lines.push(Self::border(&widths, "\u{2514}", "\u{2534}", "\u{2518}"));
        lines.join("\n")
    }
}

/// Frame `body` with a titled border.
pub fn panel(title: &str, body: &str, tone: Tone) -> String {
    let body_lines: Vec<&str> = body.lines().collect();
    let inner = body_lines
        .iter()
        .map(|line| display_width(&strip_ansi(line)))
        .chain(std::iter::once(display_width(title) + 2))
        .max()
        .unwrap_or(0);

    let title_fill = inner - display_width(title) - 2;
    let mut lines = vec![tone.paint(&format!(
        "\u{256d}\u{2500} {} {}\u{2500}\u{256e}",
        title.bold(),
        "\u{2500}".repeat(title_fill)
    ))];
    for line in body_lines {
        let fill = inner - display_width(&strip_ansi(line));
        lines.push(format!(
            "{} {line}{} {}",
            tone.paint("\u{2502}"),
            " ".repeat(fill),
            tone.paint("\u{2502}")
        ));
    }
    lines.push(tone.paint(&format!(
        "\u{2570}{}\u{256f}",
        "\u{2500}".repeat(inner + 2)
    )));
    lines.join("\n")
}

/// Cut `text` to `max` characters, marking the cut with "...".
pub fn preview(text: &str, max: usize) -> String {
    if display_width(text) > max {
        let head: String = text.chars().take(max).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

fn display_width(text: &str) -> usize {
    text.chars().count()
}

fn pad(text: &str, width: usize) -> String {
    let len = display_width(text);
    if len >= width {
        return text.to_string();
    }
    format!("{text}{}", " ".repeat(width - len))
}

/// Drop ANSI escape sequences so nested tables measure correctly.
fn strip_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            for next in chars.by_ref() {
                if next.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{Cell, Table, Tone, panel, preview, strip_ansi};
    use pretty_assertions::assert_eq;

    #[test]
    fn table_borders_and_rows() {
        colored::control::set_override(false);
        let mut table = Table::new(&["ID", "Memory"]);
        table.add_row(vec!["k1".into(), "prefers tea".into()]);
        table.add_row(vec!["k2".into()]);

        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "┌────┬─────────────┐");
        assert_eq!(lines[1], "│ ID │ Memory      │");
        assert_eq!(lines[3], "│ k1 │ prefers tea │");
        assert_eq!(lines[4], "│ k2 │             │");
        assert_eq!(lines[5], "└────┴─────────────┘");
    }

    #[test]
    fn widths_count_characters_not_bytes() {
        colored::control::set_override(false);
        let mut table = Table::new(&["Memory"]);
        table.add_row(vec![Cell::new("café", Tone::Green)]);
        let rendered = table.render();
        assert!(rendered.contains("│ café   │"));
    }

    #[test]
    fn panel_frames_body() {
        colored::control::set_override(false);
        let rendered = panel("Memory Deleted", "✅ done\nkey: k1", Tone::Green);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("╭─ Memory Deleted "));
        assert_eq!(lines[2], "│ key: k1          │");
        assert!(lines[3].starts_with('╰'));
    }

    #[test]
    fn preview_marks_cut() {
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("abc", 3), "abc");
    }

    #[test]
    fn strip_ansi_removes_sgr_codes() {
        assert_eq!(strip_ansi("\u{1b}[32mok\u{1b}[0m"), "ok");
    }
}
