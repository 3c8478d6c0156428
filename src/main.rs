use clap::Parser;
use pixel_predict::adapters::{load_pixel_source, StderrNotifier};
use pixel_predict::utils::error::ErrorSeverity;
use pixel_predict::utils::logger;
use pixel_predict::utils::validation::{validate_required_field, Validate};
use pixel_predict::{CliConfig, PredictApp, PredictError, PredictionClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting pixel-predict");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        fail(&e);
    }

    match run(&config).await {
        Ok(()) => Ok(()),
        Err(e) => fail(&e),
    }
}

async fn run(config: &CliConfig) -> pixel_predict::Result<()> {
    let settings = config.resolve()?;

    if config.health {
        let source = pixel_predict::GridPixelSource::grayscale(Vec::new());
        let client = PredictionClient::new(source, settings.client);
        let info = client.health_check().await?;
        println!("✅ {} is up (uptime: {})", info.service, info.uptime);
        return Ok(());
    }

    let input = validate_required_field("--input", &config.input)?;
    let source = load_pixel_source(input, config.format, settings.max_intensity)?;
    let client = PredictionClient::new(source, settings.client);
    let app = PredictApp::new(client, StderrNotifier);

    let digit = app.predict().await?;
    println!("{}", digit);
    Ok(())
}

fn fail(e: &PredictError) -> ! {
    tracing::error!(
        "❌ pixel-predict failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
