use super::ui;
use crate::rates::RateService;
use anyhow::Result;
use comfy_table::Cell;

const CODES_PER_ROW: usize = 8;

fn display_as_table(codes: &[String]) -> String {
    let mut table = ui::new_styled_table();

    for chunk in codes.chunks(CODES_PER_ROW) {
        table.add_row(chunk.iter().map(Cell::new).collect::<Vec<_>>());
    }

    let mut output = format!(
        "{}\n\n",
        ui::style_text("Available currencies", ui::StyleType::Title)
    );
    output.push_str(&table.to_string());
    output.push_str(&format!(
        "\n\n{}",
        ui::style_text(&format!("{} currencies", codes.len()), ui::StyleType::Subtle)
    ));
    output
}

pub async fn run(rates: &RateService) -> Result<()> {
    let spinner = ui::new_spinner("Fetching currency list...");
    let result = rates.available_currencies().await;
    spinner.finish_and_clear();

    match result {
        Ok(codes) => {
            println!("{}", display_as_table(&codes));
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "Currency list fetch failed");
            println!(
                "{}",
                ui::style_text(
                    "The currency list is currently unavailable",
                    ui::StyleType::Error
                )
            );
            anyhow::bail!("the currency list is currently unavailable")
        }
    }
}
