use clap::{Parser, Subcommand};
use genesyscloud::GenesysCloudProvider;
use std::io::Write;
use tfcore::provider::ConfigureProviderRequest;
use tfcore::{Diagnostics, DynamicValue, Provider};

#[derive(Parser)]
#[command(
    name = "terraform-provider-genesyscloud",
    version,
    about = "Terraform Provider for Genesys Cloud"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export existing objects as Terraform state JSON
    Export {
        /// Comma separated resource types; every exportable type when omitted
        #[arg(long, value_delimiter = ',')]
        resource_types: Vec<String>,

        #[arg(long)]
        verbose: bool,
    },
}

fn report(diagnostics: &Diagnostics) -> Box<dyn std::error::Error + Send + Sync> {
    for diagnostic in &diagnostics.errors {
        tracing::error!("{}: {}", diagnostic.summary, diagnostic.detail);
    }
    diagnostics
        .errors
        .first()
        .map(|d| d.summary.clone())
        .unwrap_or_else(|| "export failed".to_string())
        .into()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Export {
            resource_types,
            verbose,
        } => {
            let level = if verbose {
                tracing::Level::DEBUG
            } else {
                tracing::Level::INFO
            };
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .init();

            // Settings come from GENESYSCLOUD_* variables
            let mut provider = GenesysCloudProvider::new();
            let response = provider
                .configure(ConfigureProviderRequest {
                    terraform_version: String::new(),
                    config: DynamicValue::object(),
                })
                .await;
            if response.diagnostics.has_errors() {
                return Err(report(&response.diagnostics));
            }

            let exported = provider
                .export(&resource_types)
                .await
                .map_err(|diagnostics| report(&diagnostics))?;
            tracing::info!("Exported {} resources", exported.len());

            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &exported)?;
            writeln!(stdout)?;
        }
    }

    Ok(())
}
