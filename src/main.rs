use std::collections::HashMap;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::info;
use youtrack_api::YouTrackClient;

use youtrack_macros::badge::{ID_PARAM, STYLE_PARAM};
use youtrack_macros::report::{
    FIELDS_PARAM, PAGE_SIZE_PARAM, PROJECT_PARAM, QUERY_PARAM, TOTAL_PAGES_PARAM,
};
use youtrack_macros::secrets::{resolve_token, TokenStore};
use youtrack_macros::{
    init_logging, BadgeParams, BadgeRenderer, Config, ConfigManager, MacroError, ReportEngine,
    ReportParams, Result, Tracker,
};

#[derive(Parser)]
#[command(name = "yt-macro")]
#[command(about = "Render YouTrack issue reports and badges as HTML")]
#[command(version)]
struct Cli {
    /// Tracker host, overrides the configured one
    #[arg(long, global = true)]
    host: Option<String>,

    /// Permanent token, overrides the keyring
    #[arg(long, global = true, env = "YOUTRACK_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a paginated issue report
    Report {
        /// Search query forwarded to the tracker
        query: Option<String>,

        /// Project short name, or "all projects"
        #[arg(short, long)]
        project: Option<String>,

        /// Comma-separated `code[:title]` column list
        #[arg(short, long)]
        fields: Option<String>,

        /// Issues per page
        #[arg(long)]
        page_size: Option<String>,

        /// Number of page links to show
        #[arg(long)]
        total_pages: Option<String>,

        /// 1-based page to render
        #[arg(long)]
        page: Option<String>,

        /// URL of the embedding page, enables page links
        #[arg(long)]
        page_url: Option<String>,
    },
    /// Render an inline badge for one issue
    Badge {
        /// Readable issue id, e.g. DEMO-42
        id: Option<String>,

        /// `detailed` for the summary variant
        #[arg(short, long)]
        style: Option<String>,
    },
    /// Store a token in the OS keyring
    Login,
    /// Remove the stored token
    Logout,
    /// Print the effective configuration
    Config,
}

fn insert_param(params: &mut HashMap<String, String>, key: &str, value: Option<String>) {
    if let Some(value) = value {
        params.insert(key.to_string(), value);
    }
}

fn connect(config: &Config, store: &TokenStore, token: Option<String>) -> Result<Tracker> {
    let token = resolve_token(token, store, &config.host)?;
    let client = YouTrackClient::new(config.client_config(token))?;
    Ok(Tracker::connect(client))
}

async fn run(cli: Cli) -> Result<()> {
    let manager = ConfigManager::new()?;
    let mut config = manager.load();
    if let Some(host) = cli.host {
        config.host = host;
    }
    let store = TokenStore::default();

    match cli.command {
        Commands::Report {
            query,
            project,
            fields,
            page_size,
            total_pages,
            page,
            page_url,
        } => {
            let mut raw = HashMap::new();
            insert_param(&mut raw, QUERY_PARAM, query);
            insert_param(&mut raw, PROJECT_PARAM, project);
            insert_param(&mut raw, FIELDS_PARAM, fields);
            insert_param(&mut raw, PAGE_SIZE_PARAM, page_size);
            insert_param(&mut raw, TOTAL_PAGES_PARAM, total_pages);

            let settings = config.engine_settings();
            let params = ReportParams::from_macro(&raw, page.as_deref(), page_url, &settings);
            let engine = ReportEngine::new(connect(&config, &store, cli.token)?, settings);
            println!("{}", engine.render(&params).await?);
        }
        Commands::Badge { id, style } => {
            let mut raw = HashMap::new();
            insert_param(&mut raw, ID_PARAM, id);
            insert_param(&mut raw, STYLE_PARAM, style);

            let badge = BadgeRenderer::new(connect(&config, &store, cli.token)?, config.engine_settings());
            println!("{}", badge.render(&BadgeParams::from_macro(&raw)).await?);
        }
        Commands::Login => {
            let token = cli.token.ok_or(MacroError::MissingParameter("token"))?;
            store.store(&config.host, &token)?;
            info!("Stored token for {}", config.host);
        }
        Commands::Logout => {
            store.clear(&config.host)?;
            info!("Removed token for {}", config.host);
        }
        Commands::Config => {
            println!("# {}", manager.path().display());
            let rendered = serde_json::to_string_pretty(&config)
                .map_err(|err| MacroError::Config(err.to_string()))?;
            println!("{}", rendered);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
