mod app;
mod cli;
mod config;
mod effects;
mod terminal;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let file_config = config::load_for(&cli)?;
    let settings = config::Settings::resolve(&cli, file_config);

    assistant_logging::initialize(
        settings.log_destination,
        settings.log_level,
        &settings.log_file,
    );

    app::run(settings)
}
