/// Box-drawn table sized to its content.
pub struct TableFormatter {
    headers: Vec<&'static str>,
    widths: Vec<usize>,
}

const MAX_COLUMN_WIDTH: usize = 60;

impl TableFormatter {
    pub fn new(headers: &[&'static str], rows: &[Vec<String>]) -> Self {
        let widths = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                rows.iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
                    .min(MAX_COLUMN_WIDTH)
            })
            .collect();
        Self {
            headers: headers.to_vec(),
            widths,
        }
    }

    pub fn render(&self, rows: &[Vec<String>]) -> String {
        let mut lines = vec![
            self.border('┌', '┬', '┐'),
            self.row(self.headers.iter().copied()),
            self.border('├', '┼', '┤'),
        ];
        for row in rows {
            lines.push(self.row(row.iter().map(String::as_str)));
        }
        lines.push(self.border('└', '┴', '┘'));
        lines.join("\n")
    }

    fn border(&self, left: char, middle: char, right: char) -> String {
        let segments: Vec<String> = self.widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{left}{}{right}", segments.join(&middle.to_string()))
    }

    fn row<'a>(&self, cells: impl Iterator<Item = &'a str>) -> String {
        let cells: Vec<String> = cells
            .zip(&self.widths)
            .map(|(cell, width)| format!(" {} ", truncate(cell, *width)))
            .collect();
        format!("│{}│", cells.join("│"))
    }
}

/// Pad or cut `s` to exactly `max_len` characters.
pub fn truncate(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        format!("{:<width$}", s, width = max_len)
    } else {
        // Cut on character boundaries, not bytes
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{:<width$}", format!("{}...", truncated), width = max_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short     ");
        assert_eq!(truncate("exactly-10", 10), "exactly-10");
        assert_eq!(truncate("this-is-too-long", 10), "this-is...");
    }

    #[test]
    fn test_truncate_utf8_safety() {
        let result = truncate("héllo wörld ünïcode", 10);
        assert_eq!(result.chars().count(), 10);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_render_sizes_columns_to_content() {
        let rows = vec![vec!["bob".to_string(), "false".to_string()]];
        let table = TableFormatter::new(&["ID", "Admin"], &rows);
        let rendered = table.render(&rows);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "┌─────┬───────┐");
        assert_eq!(lines[1], "│ ID  │ Admin │");
        assert_eq!(lines[3], "│ bob │ false │");
        assert_eq!(lines[4], "└─────┴───────┘");
    }
}
