use crate::adapters::gemini::API_KEY_ENV;
use crate::config::toml_config::TomlConfig;
use crate::domain::model::Query;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "bundleup")]
#[command(about = "Suggest discounted product bundles from order history")]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration file; flags below override its values
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Order history workbook (.xlsx, .xls, .ods) or CSV file
    #[arg(long, global = true)]
    pub data: Option<String>,

    /// Worksheet holding the orders
    #[arg(long, global = true)]
    pub sheet: Option<String>,

    /// Generation service base URL
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    #[arg(long, global = true)]
    pub model: Option<String>,

    #[arg(long, env = API_KEY_ENV, hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Print the outcome as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Print the prompt instead of calling the generation service
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Bundle around the first product whose title contains QUERY
    Product { query: String },
    /// Bundle products whose category contains QUERY
    Category { query: String },
    /// Prompt for queries until end of input
    Interactive,
}

impl Command {
    pub fn query(&self) -> Option<Query> {
        match self {
            Command::Product { query } => Some(Query::ByProduct(query.clone())),
            Command::Category { query } => Some(Query::ByCategory(query.clone())),
            Command::Interactive => None,
        }
    }
}

impl CliConfig {
    /// 載入設定檔（若有），再套用命令列覆蓋
    pub fn settings(&self) -> Result<TomlConfig> {
        let mut settings = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };

        if let Some(data) = &self.data {
            settings.data.path = data.clone();
        }
        if let Some(sheet) = &self.sheet {
            settings.data.sheet = sheet.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            settings.generator.endpoint = endpoint.clone();
        }
        if let Some(model) = &self.model {
            settings.generator.model = model.clone();
        }
        if let Some(api_key) = self.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            settings.generator.api_key = Some(api_key.clone());
        }
        if let Some(timeout) = self.timeout {
            settings.generator.timeout_seconds = timeout;
        }

        Ok(settings)
    }
}
