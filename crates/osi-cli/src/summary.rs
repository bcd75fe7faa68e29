//! Terminal tables for command results.

use std::collections::BTreeSet;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use osi_filter::{DefinitionShare, OverlapSummary};

/// Matched row count of one applied definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationCount {
    pub definition: String,
    pub matched: usize,
}

pub fn definitions_table(names: &BTreeSet<String>) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("#"), header_cell("Definition")]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (index, name) in names.iter().enumerate() {
        table.add_row(vec![dim_cell(index + 1), Cell::new(name)]);
    }
    table
}

/// One row per definition with its matched count and share of `rows`.
pub fn annotation_table(counts: &[AnnotationCount], rows: usize) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Definition"),
        header_cell("Matched"),
        header_cell("Rows"),
        header_cell("Share"),
    ]);
    apply_table_style(&mut table);
    for index in 1..=3 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for count in counts {
        table.add_row(vec![
            Cell::new(&count.definition)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            count_cell(count.matched, Color::Green),
            Cell::new(rows),
            Cell::new(percent(count.matched, rows)),
        ]);
    }
    table
}

/// Per-definition code counts and how many of them are shared by all.
pub fn overlap_table(summary: &OverlapSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Definition"),
        header_cell("Codes"),
        header_cell("Shared"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for share in &summary.definitions {
        table.add_row(vec![
            Cell::new(&share.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(share.code_count),
            Cell::new(shared_label(share)),
        ]);
    }
    table
}

fn shared_label(share: &DefinitionShare) -> String {
    if share.skipped {
        "no criteria".to_string()
    } else {
        format!("{:.1}%", share.shared_fraction * 100.0)
    }
}

/// `A929, U071`, or `-` for an empty set.
pub fn format_codes(codes: &BTreeSet<String>) -> String {
    if codes.is_empty() {
        return "-".to_string();
    }
    codes.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn percent(part: usize, whole: usize) -> String {
    if whole == 0 {
        return "-".to_string();
    }
    format!("{:.1}%", part as f64 * 100.0 / whole as f64)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_handles_empty_tables() {
        assert_eq!(percent(3, 7), "42.9%");
        assert_eq!(percent(0, 0), "-");
    }
}
