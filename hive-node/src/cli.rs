use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "hive-node")]
#[command(about = "Hive event consensus and availability service", long_about = None)]
pub struct Args {
    /// Path to the JSON config; generated with defaults when missing
    #[arg(long = "config", default_value = "config.json")]
    pub config_path: String,

    /// Overrides the HTTP port from the config
    #[arg(long)]
    pub port: Option<u16>,

    /// Never call Google Calendar, even when credentials are configured
    #[arg(long)]
    pub offline_calendar: bool,
}

impl Args {
    /// Name used for the audit log file: the config file's stem.
    pub fn node_label(&self) -> &str {
        std::path::Path::new(&self.config_path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("node")
    }
}
