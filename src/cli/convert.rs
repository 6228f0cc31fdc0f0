use super::{OutputFormat, report, ui};
use crate::core::query::format_timestamp;
use crate::core::{Conversion, FeedFetcher, RateQueryService};
use anyhow::Result;
use comfy_table::Cell;

impl Conversion {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Pair"),
            ui::header_cell("Base"),
            ui::header_cell("Target"),
            ui::header_cell("Rate"),
        ]);
        table.add_row(vec![
            Cell::new(&self.code),
            Cell::new(&self.base),
            Cell::new(&self.target),
            ui::rate_cell(self.rate),
        ]);

        let headline = format!("1 {} = {} {}", self.base, self.rate, self.target);
        let mut output = format!(
            "{}\n\n",
            ui::style_text(&headline, ui::StyleType::TotalValue)
        );
        output.push_str(&table.to_string());
        output.push_str(&format!(
            "\n\n{}",
            ui::style_text(
                &format!("Queried at {}", format_timestamp(&self.queried_at)),
                ui::StyleType::Subtle
            )
        ));
        output
    }
}

pub async fn run<F: FeedFetcher>(
    service: &RateQueryService<F>,
    base: &str,
    target: &str,
    format: OutputFormat,
) -> Result<()> {
    let pb = ui::new_spinner("Fetching rates...");
    let result = service.convert(base, target).await;
    pb.finish_and_clear();

    report(&result, format, Conversion::display_as_table)
}
