use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use enroll_cli::commands::{CategoryCount, EnrollReport, SearchResult};
use enroll_core::{Notification, NotificationKind};
use enroll_model::CatalogEntry;

pub fn print_categories(categories: &[CategoryCount]) {
    if categories.is_empty() {
        println!("The catalog is empty");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Category"), header_cell("Courses")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let mut total = 0usize;
    for entry in categories {
        total += entry.courses;
        table.add_row(vec![Cell::new(&entry.category), Cell::new(entry.courses)]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

pub fn print_search(result: &SearchResult) {
    if let Some(reason) = result.empty_reason() {
        println!("{reason}");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Course"),
        header_cell("Category"),
        header_cell("Term"),
        header_cell("Grades"),
        header_cell("Popularity"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 5, CellAlignment::Right);
    for course in &result.courses {
        table.add_row(course_row(course));
    }
    println!("{table}");
}

pub fn print_enroll(report: &EnrollReport) {
    println!("Course: {} ({})", report.course.name, report.course.id);
    if let Some(receipt) = &report.receipt {
        println!("Enrollment: {}", receipt.id);
    }
    match &report.notification {
        Some(notification) => print_notification(notification),
        None => println!("No result was reported"),
    }
}

fn print_notification(notification: &Notification) {
    let label = notification.kind.label().to_uppercase();
    match notification.kind {
        NotificationKind::Error => eprintln!("{label}: {}", notification.message),
        NotificationKind::Success | NotificationKind::Info => {
            println!("{label}: {}", notification.message);
        }
    }
}

fn course_row(course: &CatalogEntry) -> Vec<Cell> {
    vec![
        dim_cell(&course.id),
        Cell::new(&course.name)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold),
        Cell::new(&course.category),
        Cell::new(if course.is_semester {
            "Semester"
        } else {
            "Full Year"
        }),
        Cell::new(course.grade_levels_label()),
        Cell::new(course.popularity_score),
    ]
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
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
