use clap::Parser;
use reqwest::Client;
use fit_export::api::google_fit::GoogleFitClient;
use fit_export::api::oauth2::GoogleOAuth;
use fit_export::credentials::CredentialManager;
use fit_export::export::Exporter;
use fit_export::utils::config_loader;
use fit_export::utils::constants::DEFAULT_CONFIG_FILE;
use fit_export::utils::logging;
use fit_export::utils::logging::LogLevel;
use fit_export::{ExportConfig, TimeWindow};
use anyhow::Result;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: String,
    #[arg(long, env = "LOG_LEVEL" , value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Fix the export window
    //
    // captured once, before authorization, shared by every fetch
    // -------------------------------

    let window = TimeWindow::until_now();
    let args = Args::parse();

    // -------------------------------
    // 2. Load YAML config, init logging
    // -------------------------------

    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level.to_owned()).await?;
    let export_config = ExportConfig::from_settings(&service_config.settings, window);
    info!("exporting into '{}'", export_config.paths.exports_dir.display());

    // -------------------------------
    // 3. Resolve credential
    // -------------------------------

    let client = Client::new();
    let identity = GoogleOAuth::new(client.clone(), &export_config);
    let credential = CredentialManager::new(&export_config, &identity)
        .get_token()
        .await?;

    // -------------------------------
    // 4. List data sources, export datasets
    // -------------------------------

    let api = GoogleFitClient::new(client, &export_config.fitness_api_url, &credential)?;
    Exporter::new(&export_config, &api).run().await?;

    Ok(())
}
