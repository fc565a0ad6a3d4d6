use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "emissions-dashboard",
    version,
    about = "Coal mine emissions dashboard"
)]
pub struct CliArgs {
    /// Print the overview report and exit
    #[arg(long)]
    pub headless: bool,

    /// Print the headless report as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Override the emissions API base URL
    #[arg(long = "api-url", value_name = "URL")]
    pub api_url: Option<String>,

    /// Maximum number of hotspots to fetch
    #[arg(long = "hotspot-limit", value_name = "N")]
    pub hotspot_limit: Option<usize>,

    /// Look up the offset plan for a mine (headless)
    #[arg(long, value_name = "NAME")]
    pub mine: Option<String>,

    /// Upload a summary CSV before reporting (headless)
    #[arg(long, value_name = "PATH")]
    pub upload: Option<PathBuf>,
}

impl CliArgs {
    pub fn apply_env_overrides(&self) {
        if let Some(url) = &self.api_url {
            std::env::set_var("EMISSIONS_API_URL", url);
        }
        if let Some(limit) = self.hotspot_limit {
            std::env::set_var("HOTSPOT_LIMIT", limit.to_string());
        }
        if self.debug {
            std::env::set_var("DEBUG", "1");
        }
    }

    /// Flags that only make sense without the interactive UI.
    pub const fn wants_headless(&self) -> bool {
        self.headless || self.json || self.mine.is_some() || self.upload.is_some()
    }
}
