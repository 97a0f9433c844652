mod bootstrap;

use anyhow::Result;
use cohort_core::settings::Settings;
use cohort_data::analysis::CohortDailyAggregator;

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("Cohort report v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("Variant: {}, Label: {}", settings.variant, settings.label);

    let metadata = CohortDailyAggregator::in_current_dir()
        .with_label_mode(settings.label_mode()?)
        .run(&settings.variant)?;

    if settings.summary {
        println!("{}", serde_json::to_string_pretty(&metadata)?);
    }

    Ok(())
}
