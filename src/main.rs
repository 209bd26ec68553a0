use anyhow::Context;
use board_bootstrap::config::CredentialSource;
use board_bootstrap::{config::Config, default_plan, store, ProvisionReport, Provisioner};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    match run(&config).await {
        Ok(report) => {
            tracing::info!(
                created = report.created(),
                existing = report.already_existing(),
                "Bootstrap complete"
            );
        }
        Err(e) => {
            tracing::error!("Bootstrap failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run(config: &Config) -> anyhow::Result<ProvisionReport> {
    if config.credential_source == CredentialSource::BuiltIn {
        tracing::warn!("BOOTSTRAP_PASSWORD not set; using the built-in default password");
    }

    let store = store::connect(config)
        .await
        .context("failed to connect to user store")?;
    let plan = default_plan(config).context("invalid provisioning plan")?;

    let report = Provisioner::new(store).run(&plan).await?;
    Ok(report)
}
