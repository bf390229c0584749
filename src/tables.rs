use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};
use itertools::Itertools;

use crate::{
    core::{
        dashboard::{EmptyReason, Report},
        record::NormalizedPriceRecord,
        statistics::{PriceCategory, Statistics},
    },
    preferences::Theme,
    quantity::price::OrePerKilowattHour,
};

const BAR_WIDTH: f64 = 32.0;

pub const fn category_color(category: PriceCategory, theme: Option<Theme>) -> Color {
    match (theme, category) {
        (Some(Theme::Dark), PriceCategory::Low) => Color::Green,
        (Some(Theme::Dark), PriceCategory::Medium) => Color::Yellow,
        (Some(Theme::Dark), PriceCategory::High) => Color::Red,
        (Some(Theme::Light), PriceCategory::Low) => Color::DarkGreen,
        (Some(Theme::Light), PriceCategory::Medium) => Color::DarkYellow,
        (Some(Theme::Light), PriceCategory::High) => Color::DarkRed,
        (None, PriceCategory::Low) => Color::Green,
        (None, PriceCategory::Medium) => Color::DarkYellow,
        (None, PriceCategory::High) => Color::Red,
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table
}

fn format_time(record: &NormalizedPriceRecord) -> String {
    record.start.format("%H:%M").to_string()
}

/// Compact hourly tiles of the box window.
#[must_use]
pub fn build_tiles_table(report: &Report, theme: Option<Theme>) -> Table {
    let mut table = new_table();
    table.set_header(report.selection.box_window.iter().map(format_time).collect_vec());
    table.add_row(
        report
            .selection
            .box_window
            .iter()
            .zip(&report.box_categories)
            .map(|(record, category)| {
                Cell::new(record.display_price)
                    .set_alignment(CellAlignment::Right)
                    .fg(category_color(*category, theme))
            })
            .collect_vec(),
    );
    table
}

/// Chart window as horizontal bars scaled to the highest price.
#[must_use]
pub fn build_chart_table(report: &Report, theme: Option<Theme>) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Time", "Price", ""]);
    for (record, category) in report.selection.chart_window.iter().zip(&report.chart_categories) {
        let color = category_color(*category, theme);
        table.add_row(vec![
            Cell::new(format_time(record)).add_attribute(Attribute::Dim),
            Cell::new(record.display_price).set_alignment(CellAlignment::Right).fg(color),
            Cell::new(bar(record.display_price, report.statistics.highest)).fg(color),
        ]);
    }
    table
}

#[must_use]
pub fn build_statistics_table(statistics: &Statistics) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Lowest", "Average", "Highest"]);
    table.add_row(vec![
        Cell::new(statistics.lowest).set_alignment(CellAlignment::Right),
        Cell::new(format!("{} öre", statistics.formatted_average()))
            .set_alignment(CellAlignment::Right),
        Cell::new(statistics.highest).set_alignment(CellAlignment::Right),
    ]);
    table
}

#[must_use]
pub fn build_empty_table(reason: EmptyReason) -> Table {
    let mut table = new_table();
    table.add_row(vec![Cell::new(reason).fg(Color::Red)]);
    table
}

#[expect(clippy::cast_possible_truncation)]
#[expect(clippy::cast_sign_loss)]
fn bar(price: OrePerKilowattHour, highest: OrePerKilowattHour) -> String {
    if highest.0 <= 0.0 || price.0 <= 0.0 {
        return String::new();
    }
    let width = (price.0 / highest.0 * BAR_WIDTH).round().clamp(0.0, BAR_WIDTH) as usize;
    "█".repeat(width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar() {
        assert_eq!(bar(OrePerKilowattHour(50.0), OrePerKilowattHour(100.0)).chars().count(), 16);
        assert_eq!(bar(OrePerKilowattHour(100.0), OrePerKilowattHour(100.0)).chars().count(), 32);
        assert_eq!(bar(OrePerKilowattHour(-5.0), OrePerKilowattHour(100.0)), "");
        assert_eq!(bar(OrePerKilowattHour(5.0), OrePerKilowattHour::ZERO), "");
    }

    #[test]
    fn test_statistics_table() {
        let rendered = build_statistics_table(&Statistics::EMPTY).to_string();
        assert!(rendered.contains("0.00 öre"));
    }
}
