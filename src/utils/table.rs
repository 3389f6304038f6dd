/// Column alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// A simple fixed-width text table for terminal output
pub struct Table {
    headers: Vec<String>,
    aligns: Vec<Align>,
    rows: Vec<Vec<String>>,
    col_widths: Vec<usize>,
}

impl Table {
    /// Create a new table with the given headers, all columns left-aligned
    pub fn new(headers: Vec<&str>) -> Self {
        let col_widths = headers.iter().map(|h| h.chars().count()).collect();
        let aligns = vec![Align::Left; headers.len()];
        let headers = headers.iter().map(|h| h.to_string()).collect();
        Table {
            headers,
            aligns,
            rows: Vec::new(),
            col_widths,
        }
    }

    /// Right-align column `index` (amounts, counts)
    pub fn align_right(mut self, index: usize) -> Self {
        if let Some(align) = self.aligns.get_mut(index) {
            *align = Align::Right;
        }
        self
    }

    /// Add a row to the table. Extra cells are ignored, missing ones render blank.
    pub fn add_row(&mut self, row: Vec<String>) {
        let mut row: Vec<String> = row.into_iter().take(self.headers.len()).collect();
        row.resize(self.headers.len(), String::new());

        for (i, col) in row.iter().enumerate() {
            self.col_widths[i] = self.col_widths[i].max(col.chars().count());
        }

        self.rows.push(row);
    }

    /// Render the table as a formatted string
    pub fn render(&self) -> String {
        let mut output = String::new();

        output.push_str(&self.render_row(&self.headers));
        output.push('\n');

        output.push_str(&self.render_separator());
        output.push('\n');

        for row in &self.rows {
            output.push_str(&self.render_row(row));
            output.push('\n');
        }

        output
    }

    fn render_row(&self, row: &[String]) -> String {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let width = self.col_widths[i];
                match self.aligns[i] {
                    Align::Left => format!("{:<width$}", col, width = width),
                    Align::Right => format!("{:>width$}", col, width = width),
                }
            })
            .collect();
        cells.join(" | ").trim_end().to_string()
    }

    fn render_separator(&self) -> String {
        self.col_widths
            .iter()
            .map(|&width| "-".repeat(width))
            .collect::<Vec<_>>()
            .join("-+-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_table() {
        let mut table = Table::new(vec!["Id", "Amount"]).align_right(1);
        table.add_row(vec!["abc".to_string(), "5".to_string()]);
        table.add_row(vec!["d".to_string(), "1500".to_string()]);

        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Id  | Amount");
        assert_eq!(lines[1], "----+-------");
        assert_eq!(lines[2], "abc |      5");
        assert_eq!(lines[3], "d   |   1500");
    }

    #[test]
    fn test_short_rows_are_padded() {
        let mut table = Table::new(vec!["A", "B", "C"]);
        table.add_row(vec!["x".to_string()]);
        assert_eq!(table.render().lines().nth(2), Some("x |   |"));
    }
}
