use clap::Parser;
use std::sync::Arc;
use training_tracker::utils::error::TrackerError;
use training_tracker::utils::{logger, validation::Validate};
use training_tracker::{build_store, serve, AppState, CliArgs, SystemClock, TrackerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 載入配置
    let mut config = match TrackerConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };
    let overrides = args.apply_overrides(&mut config);

    // 初始化日誌
    logger::init_logger(
        config.logging.verbose.unwrap_or(false),
        config.logging.format(),
    );

    tracing::info!("Starting training-tracker");
    for applied in &overrides {
        tracing::info!("🔧 {}", applied);
    }
    tracing::debug!("Loaded config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if args.check {
        tracing::info!("✅ Configuration is valid");
        println!("✅ Configuration is valid");
        return Ok(());
    }

    if let Err(e) = run(&config).await {
        tracing::error!(
            "❌ Server failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        std::process::exit(e.exit_code());
    }

    Ok(())
}

async fn run(config: &TrackerConfig) -> Result<(), TrackerError> {
    let store = build_store(config)?;
    let state = AppState::new(store, Arc::new(SystemClock));
    serve(config, state).await
}
