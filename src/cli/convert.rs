use super::ui;
use crate::core::calculator::Calculator;
use crate::core::config::AppConfig;
use crate::core::currency::Currency;
use crate::service::RateService;
use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertRequest {
    pub keys: String,
    pub from: String,
    pub to: String,
    pub offline: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub amount: f64,
    pub converted: f64,
    pub rate: f64,
}

pub async fn run(
    service: &Arc<RateService>,
    config: &AppConfig,
    request: &ConvertRequest,
) -> Result<()> {
    let from = Currency::find_by_code(&request.from)
        .with_context(|| format!("Unknown currency: {}", request.from))?;
    let to = Currency::find_by_code(&request.to)
        .with_context(|| format!("Unknown currency: {}", request.to))?;

    if request.offline {
        debug!("Offline conversion, skipping fetch");
    } else {
        let spinner = ui::new_spinner("Fetching exchange rates...");
        service.start().await?;
        spinner.finish_and_clear();
    }

    let conversion = evaluate(service, &request.keys, from.code, to.code)?;
    let precision = config.display_precision;
    println!(
        "{} {} {}",
        from.flag,
        ui::format_amount(conversion.amount, precision),
        from.code
    );
    println!(
        "{} {}",
        to.flag,
        ui::style_text(
            &format!(
                "{} {}",
                ui::format_amount(conversion.converted, precision),
                to.code
            ),
            ui::StyleType::TotalValue
        )
    );
    println!(
        "{}",
        ui::style_text(
            &ui::format_pair_rate(from.code, to.code, conversion.rate),
            ui::StyleType::Subtle
        )
    );

    let status = service.status();
    let stale = status.is_stale(Utc::now(), config.refresh_interval());
    println!("\n{}", ui::format_status(&status, stale));
    Ok(())
}

/// Runs `keys` through the keypad and converts the displayed amount with
/// whatever table the service currently holds.
pub fn evaluate(service: &RateService, keys: &str, from: &str, to: &str) -> Result<Conversion> {
    let mut calculator = Calculator::new();
    calculator.feed(keys)?;
    let amount = calculator.value();
    Ok(Conversion {
        amount,
        converted: service.convert(amount, from, to),
        rate: service.get_rate(from, to),
    })
}
