pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod repl;

use cli::{ Args, Command };
use config::ServiceConfig;
use llm::chat::new_client;
use log::info;
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = ServiceConfig::from_args(&args)?;

    info!("--- Core Configuration ---");
    info!("Service Base URL: {}", config.base_url());
    info!("Debug: {}", args.debug);
    info!("-------------------------");

    let client = new_client(&config)?;

    match &args.command {
        Command::Chat { query: Some(query) } => {
            let result = repl::ask(client.as_ref(), query, &[]).await;
            if let Some(err) = result.error {
                return Err(err.into());
            }
        }
        Command::Chat { query: None } => {
            repl::run_repl(client).await?;
        }
        command @ Command::Diagnose { .. } => {
            let record = command.medical_record().unwrap_or_default();
            let result = client.diagnose_disease(&record).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if let Some(err) = result.error {
                return Err(err.into());
            }
        }
    }

    Ok(())
}
