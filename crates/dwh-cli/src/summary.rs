use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use dwh_cli::types::RunResult;

pub fn print_summary(result: &RunResult) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Collection"),
        header_cell("Profile"),
        header_cell("Table"),
        header_cell("Extracted"),
        header_cell("Columns"),
        header_cell("New"),
        header_cell("Loaded"),
        header_cell("Job"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 3..=6 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    let mut total_extracted = 0usize;
    let mut total_new = 0usize;
    let mut total_loaded = 0usize;
    for summary in &result.collections {
        total_extracted += summary.extracted;
        total_new += summary.new_rows;
        total_loaded += summary.loaded;
        let loaded = if summary.dry_run {
            dim_cell("-")
        } else {
            count_cell(summary.loaded, Color::Green)
        };
        table.add_row(vec![
            Cell::new(&summary.collection)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&summary.profile),
            Cell::new(summary.table.to_string()),
            Cell::new(summary.extracted),
            Cell::new(summary.columns),
            count_cell(summary.new_rows, Color::Yellow),
            loaded,
            summary
                .job_id
                .as_deref()
                .map_or_else(|| dim_cell("-"), Cell::new),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        Cell::new(total_extracted).add_attribute(Attribute::Bold),
        dim_cell("-"),
        count_cell(total_new, Color::Yellow).add_attribute(Attribute::Bold),
        if result.dry_run {
            dim_cell("-")
        } else {
            count_cell(total_loaded, Color::Green).add_attribute(Attribute::Bold)
        },
        dim_cell("-"),
    ]);
    println!("{table}");
    if result.dry_run {
        println!("Dry run: nothing was loaded");
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
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
