// hoopval entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file; stdout carries the report)
// 2. Load config
// 3. Load and normalize input data
// 4. Run the analysis and print the report

use hoopval_app::config;
use hoopval_app::loader;
use hoopval_app::pipeline;

use anyhow::Context;
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("hoopval starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: context={:?}, {} categories, punt={:?}",
        config.analysis.context,
        config.analysis.categories.len(),
        config.analysis.punt_tokens
    );

    let inputs = loader::load_inputs(&config.data_paths).context("failed to load input data")?;
    info!(
        "Loaded {} season records, {} game records, {} roster entries",
        inputs.season_records.len(),
        inputs.game_records.len(),
        inputs.roster.len()
    );

    let report = pipeline::run(&config, &inputs);
    info!(
        "Ranked {} players against a cohort of {}",
        report.rankings.len(),
        report.cohort_size
    );

    print!("{}", report.render());
    Ok(())
}

/// Initialize tracing to log to a file (stdout is reserved for the report).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("hoopval.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hoopval=info,hoopval_app=info,hoopval_core=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
