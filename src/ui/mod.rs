pub mod panels;
pub mod plot;
pub mod tables;
pub mod treemap;

use eframe::egui::{Color32, RichText, Ui};

use crate::data::error::PipelineError;

/// `$1,234.56` style label used on bars and table cells.
pub fn format_currency(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}.{:02}", cents % 100)
}

/// Show a pipeline condition in place of a chart: warnings for "no data",
/// errors for everything else.
pub fn show_condition(ui: &mut Ui, err: &PipelineError) {
    if err.is_no_data() {
        ui.label(RichText::new(format!("⚠ {err}")).color(Color32::from_rgb(200, 140, 0)));
    } else {
        ui.label(RichText::new(format!("✖ {err}")).color(Color32::RED));
    }
}

#[cfg(test)]
mod tests {
    use super::format_currency;

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(261.956), "$261.96");
        assert_eq!(format_currency(1234567.5), "$1,234,567.50");
        assert_eq!(format_currency(-1000.0), "-$1,000.00");
    }
}
