use bundleup::app::report;
use bundleup::core::ConfigProvider;
use bundleup::utils::error::{BundleError, ErrorSeverity};
use bundleup::utils::{logger, validation::Validate};
use bundleup::{
    BundleEngine, Catalog, CliConfig, GeminiClient, Session, SessionOptions, TomlConfig,
    WorkbookSource,
};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting bundleup");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入並驗證配置
    let settings = match cli.settings().and_then(|s| s.validate().map(|_| s)) {
        Ok(settings) => settings,
        Err(e) => fail(&e),
    };

    let catalog = Catalog::new(WorkbookSource::from_path(
        settings.data_path(),
        settings.sheet_name(),
    ));
    let engine = BundleEngine::with_policy(generator(&settings, cli.dry_run), settings.policy().clone());

    let Some(query) = cli.command.query() else {
        let options = SessionOptions {
            json: cli.json,
            dry_run: cli.dry_run,
        };
        let mut session = Session::new(catalog, engine, options);
        let requests = match session
            .run(std::io::stdin().lock(), std::io::stdout())
            .await
        {
            Ok(requests) => requests,
            Err(e) => fail(&e),
        };
        tracing::info!("👋 Session finished after {} generation requests", requests);
        return Ok(());
    };

    let dataset = match catalog.try_get() {
        Ok(dataset) => dataset,
        Err(e) => fail(&BundleError::DataLoadError {
            message: format!("{}: {}", settings.data_path(), e),
        }),
    };
    if dataset.is_empty() {
        fail(&BundleError::DataLoadError {
            message: format!("no records in {}", settings.data_path()),
        });
    }

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - the generation service will not be called");
        match engine.prompt_for(&dataset, &query) {
            Ok(prompt) => println!("{}", prompt),
            Err(e) => fail(&e),
        }
        return Ok(());
    }

    let outcome = match engine.run(&dataset, &query).await {
        Ok(outcome) => outcome,
        Err(e) => fail(&e),
    };

    if cli.json {
        println!("{}", report::render_json(&outcome)?);
    } else {
        println!("{}", report::render_text(&outcome));
    }

    if outcome.error.is_some() {
        std::process::exit(2);
    }

    Ok(())
}

/// dry-run 不需要 API key；其餘情況缺少 key 直接結束
fn generator(settings: &TomlConfig, dry_run: bool) -> GeminiClient {
    if dry_run {
        return GeminiClient::new(settings.api_endpoint(), settings.model(), "");
    }
    match GeminiClient::from_config(settings) {
        Ok(client) => client,
        Err(e) => fail(&e),
    }
}

fn fail(e: &BundleError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("{}", report::render_error(e));

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
