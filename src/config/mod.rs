use crate::config::cli::Args;
use crate::error::Result;
use reqwest::Client;
use std::time::Duration;
use tracing::info;

pub(crate) mod cli;
pub(crate) mod settings;

pub use settings::Settings;

pub struct Config {
    pub args: Args,
    pub settings: Settings,
    pub http_client: Client,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        let settings = Settings::load_or_create(&args.settings_file)?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(args.timeout_secs))
            .user_agent(concat!("arkadisti/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            args,
            settings,
            http_client,
        })
    }

    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.settings.inp_dir, &self.settings.output_dir] {
            if !dir.exists() {
                std::fs::create_dir_all(dir)?;
            }
        }

        info!("Input and output dirs exist");
        Ok(())
    }
}
