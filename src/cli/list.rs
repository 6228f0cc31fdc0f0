use super::{OutputFormat, report, ui};
use crate::core::query::format_timestamp;
use crate::core::{CurrencyList, FeedFetcher, RateQueryService};
use anyhow::Result;
use comfy_table::{Cell, CellAlignment};

impl CurrencyList {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("#"), ui::header_cell("Currency")]);

        for (i, code) in self.currencies.iter().enumerate() {
            table.add_row(vec![
                Cell::new(i + 1).set_alignment(CellAlignment::Right),
                Cell::new(code),
            ]);
        }

        let mut output = format!(
            "{}\n\n",
            ui::style_text("Available currencies", ui::StyleType::Title)
        );
        output.push_str(&table.to_string());
        output.push_str(&format!(
            "\n\n{} {}\n{}",
            ui::style_text("Total:", ui::StyleType::TotalLabel),
            ui::style_text(&self.count.to_string(), ui::StyleType::TotalValue),
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
    format: OutputFormat,
) -> Result<()> {
    let pb = ui::new_spinner("Fetching rates...");
    let result = service.list_currencies().await;
    pb.finish_and_clear();

    report(&result, format, CurrencyList::display_as_table)
}
