use clap::Parser;
use color_eyre::Result;
use emissions_dashboard::app::App;
use emissions_dashboard::cli::CliArgs;
use emissions_dashboard::config::init_app_config;
use emissions_dashboard::logging::{init_logging, LogTarget};
use emissions_dashboard::{event, terminal};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    args.apply_env_overrides();
    let config = init_app_config()?;

    let headless = args.wants_headless() || !is_terminal();
    let target = if headless {
        LogTarget::Stderr
    } else {
        LogTarget::File(&config.log_file)
    };
    init_logging(target, config.debug)?;
    config.log_warnings();
    info!(api = %config.api_url, headless, "starting");

    let mut app = App::new(&config)?;

    if headless {
        return event::run_headless(&mut app, &args).await;
    }

    let mut terminal = terminal::setup()?;
    let result = event::run(&mut terminal, &mut app).await;
    terminal::cleanup(true, true);

    result
}

fn is_terminal() -> bool {
    atty::is(atty::Stream::Stdout)
}
