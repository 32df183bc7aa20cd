use super::ui;
use crate::dashboard::Dashboard;
use crate::rates::RateService;
use crate::validator::{CurrencyValidator, TargetInput};
use anyhow::Result;
use comfy_table::Cell;

impl Dashboard {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();

        table.set_header(vec![
            ui::header_cell("Currency"),
            ui::header_cell(&format!("Rate (1 {})", self.base)),
        ]);

        for (code, rate) in &self.rates {
            table.add_row(vec![Cell::new(code), ui::rate_cell(*rate)]);
        }

        let mut output = format!(
            "Exchange rates for {}\n\n",
            ui::style_text(&self.base, ui::StyleType::Title)
        );
        output.push_str(&table.to_string());

        let missing: Vec<&str> = self
            .targets
            .iter()
            .filter(|t| !self.rates.iter().any(|(code, _)| code == *t))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            output.push_str(&format!(
                "\n\n{}",
                ui::style_text(
                    &format!("No rate quoted for: {}", missing.join(", ")),
                    ui::StyleType::Subtle
                )
            ));
        }

        output.push_str(&format!(
            "\n\n{}",
            ui::style_text(
                &format!("{} currencies available", self.available.len()),
                ui::StyleType::Subtle
            )
        ));

        output
    }
}

pub async fn run(
    rates: &RateService,
    validator: &CurrencyValidator,
    raw_base: Option<&str>,
    raw_targets: Option<TargetInput>,
) -> Result<()> {
    let spinner = ui::new_spinner("Fetching exchange rates...");
    let result = Dashboard::build(rates, validator, raw_base, raw_targets).await;
    spinner.finish_and_clear();

    match result {
        Ok(dashboard) => {
            println!("{}", dashboard.display_as_table());
            Ok(())
        }
        Err(e) => {
            // Upstream detail goes to the log, not the user.
            tracing::error!(error = %e, "Rate fetch failed");
            println!(
                "{}",
                ui::style_text("Exchange rates are currently unavailable", ui::StyleType::Error)
            );
            anyhow::bail!("exchange rates are currently unavailable")
        }
    }
}
