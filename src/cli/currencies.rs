use super::ui;
use crate::core::currency::{ALL_CURRENCIES, BASE_CURRENCY};
use anyhow::Result;
use comfy_table::{Cell, Table};

pub fn run() -> Result<()> {
    println!("{}", ui::style_text("Supported currencies", ui::StyleType::Title));
    println!("{}", build_table());
    Ok(())
}

fn build_table() -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell(""),
        ui::header_cell("Code"),
        ui::header_cell("Name"),
        ui::header_cell("Symbol"),
    ]);

    for currency in ALL_CURRENCIES {
        let code = if currency.code == BASE_CURRENCY {
            format!("{} (base)", currency.code)
        } else {
            currency.code.to_string()
        };
        table.add_row(vec![
            Cell::new(currency.flag),
            Cell::new(code),
            Cell::new(currency.name),
            Cell::new(currency.symbol),
        ]);
    }
    table
}
