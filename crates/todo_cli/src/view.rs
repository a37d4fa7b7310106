//! Plain-text drawing of rendered cells.

use todo_core::{CellHandle, ListRenderer, ViewType};

const GRID_COLUMNS: usize = 2;
const CARD_WIDTH: usize = 30;

/// Draws every attached cell in the renderer's current layout.
pub fn render(renderer: &ListRenderer) -> String {
    if renderer.is_empty() {
        return "No tasks\n".to_string();
    }
    let cells = renderer.visible_cells().collect::<Vec<_>>();
    match renderer.layout() {
        ViewType::List => render_rows(&cells),
        ViewType::Grid => render_cards(&cells),
    }
}

fn render_rows(cells: &[&CellHandle]) -> String {
    let mut out = String::new();
    for (index, cell) in cells.iter().enumerate() {
        let fields = cell.fields();
        out.push_str(&format!("{:>3}. {}  [{}]\n", index + 1, fields.title, fields.date));
        for line in fields.description.lines() {
            out.push_str(&format!("     {line}\n"));
        }
    }
    out
}

fn render_cards(cells: &[&CellHandle]) -> String {
    let border = format!("+{}+", "-".repeat(CARD_WIDTH));
    let mut out = String::new();
    for (row_index, row) in cells.chunks(GRID_COLUMNS).enumerate() {
        let cards = row
            .iter()
            .enumerate()
            .map(|(column, cell)| card_lines(row_index * GRID_COLUMNS + column + 1, cell))
            .collect::<Vec<_>>();
        let height = cards.iter().map(Vec::len).max().unwrap_or(0);

        out.push_str(&vec![border.as_str(); cards.len()].join(" "));
        out.push('\n');
        for line in 0..height {
            let joined = cards
                .iter()
                .map(|card| {
                    let text = card.get(line).map(String::as_str).unwrap_or("");
                    format!("|{text:<CARD_WIDTH$}|")
                })
                .collect::<Vec<_>>()
                .join(" ");
            out.push_str(&joined);
            out.push('\n');
        }
        out.push_str(&vec![border.as_str(); cards.len()].join(" "));
        out.push('\n');
    }
    out
}

fn card_lines(number: usize, cell: &CellHandle) -> Vec<String> {
    let fields = cell.fields();
    let mut lines = vec![clip(&format!("#{number} {}", fields.title))];
    lines.extend(fields.description.lines().map(clip));
    lines.push(clip(&fields.date));
    lines
}

fn clip(text: &str) -> String {
    text.chars().take(CARD_WIDTH).collect()
}
