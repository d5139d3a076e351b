use super::ui;
use crate::core::config::AppConfig;
use crate::core::currency::ALL_CURRENCIES;
use crate::core::rates::RateTable;
use crate::service::RateService;
use anyhow::Result;
use chrono::Utc;
use comfy_table::{Cell, Table};
use std::sync::Arc;

/// Refreshes once, then prints every catalog currency against `default_to`.
pub async fn run(service: &Arc<RateService>, config: &AppConfig) -> Result<()> {
    let spinner = ui::new_spinner("Fetching exchange rates...");
    service.start().await?;
    spinner.finish_and_clear();

    let status = service.status();
    let table = service.table();
    println!(
        "\n{}",
        ui::style_text(
            &format!("Exchange rates in {}", config.default_to),
            ui::StyleType::Title
        )
    );
    println!(
        "{}",
        build_table(&table, &config.default_to, config.display_precision)
    );
    let stale = status.is_stale(Utc::now(), config.refresh_interval());
    println!("{}", ui::format_status(&status, stale));
    Ok(())
}

/// One row per catalog currency: its factor against the base and the value
/// of one unit in `target`.
fn build_table(rates: &RateTable, target: &str, precision: usize) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell("Name"),
        ui::header_cell("Factor"),
        ui::header_cell(&format!("1 unit in {target}")),
    ]);

    for currency in ALL_CURRENCIES {
        let factor = match rates.get(currency.code) {
            Some(factor) => ui::number_cell(format!("{factor:.5}")),
            None => Cell::new(ui::style_text("N/A", ui::StyleType::Subtle)),
        };
        let value = rates.get_rate(currency.code, target);
        table.add_row(vec![
            Cell::new(format!("{} {}", currency.flag, currency.code)),
            Cell::new(currency.name),
            factor,
            ui::number_cell(ui::format_amount(value, precision)),
        ]);
    }
    table
}
