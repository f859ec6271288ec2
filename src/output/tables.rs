use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn header_row(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

/// `rate` is a fraction; rendered as a percentage.
pub fn success_rate_cell(rate: f64) -> Cell {
    let percent = rate * 100.0;
    let text = format!("{percent:.1}%");
    if percent > 80.0 {
        Cell::new(text).fg(TableColor::Green)
    } else if percent >= 50.0 {
        Cell::new(text).fg(TableColor::Yellow)
    } else {
        Cell::new(text).fg(TableColor::Red)
    }
}

/// `rate` is a fraction; rendered as a percentage.
pub fn failure_rate_cell(rate: f64) -> Cell {
    let percent = rate * 100.0;
    let text = format!("{percent:.1}%");
    if percent >= 50.0 {
        Cell::new(text).fg(TableColor::Red)
    } else if percent >= 25.0 {
        Cell::new(text).fg(TableColor::Yellow)
    } else {
        Cell::new(text).fg(TableColor::Green)
    }
}

pub fn duration_cell(minutes: f64) -> Cell {
    let text = format!("{minutes:.1}min");
    if minutes <= 10.0 {
        Cell::new(text).fg(TableColor::Green)
    } else if minutes <= 15.0 {
        Cell::new(text).fg(TableColor::Yellow)
    } else {
        Cell::new(text).fg(TableColor::Red)
    }
}
