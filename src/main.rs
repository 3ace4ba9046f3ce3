use anyhow::{Context, Result};
use clap::Parser;
use tickprof::cli::{Cli, OutputFormat};
use tickprof::config::ProfilerConfig;
use tickprof::report::{self, ReportOptions};
use tickprof::store;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_config(cli: &Cli) -> Result<ProfilerConfig> {
    match &cli.config {
        Some(path) => ProfilerConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(ProfilerConfig::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = load_config(&cli)?;
    let mut state = store::read_state(&cli.state)
        .with_context(|| format!("Failed to read session state {}", cli.state.display()))?;

    let cycle = cli.cycle.unwrap_or_else(|| match &state {
        Some(state) => state.disable_tick.unwrap_or(state.enabled_tick),
        None => 0,
    });
    debug!(cycle, format = ?cli.format, "rendering report");

    let text = match cli.format {
        OutputFormat::Table => {
            let mut options = ReportOptions::from(&config.report);
            if let Some(limit) = cli.limit {
                options.max_chars = Some(limit);
            }
            report::table::render(state.as_mut(), cycle, &options)
        }
        OutputFormat::Callgrind => report::callgrind::render(state.as_ref(), cycle),
        OutputFormat::Json => report::json::render(state.as_ref(), cycle)?,
    };

    println!("{}", text);
    Ok(())
}
