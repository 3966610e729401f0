use colored::Colorize;
use dockpush_build::DockerEngine;
use dockpush_config::PublishConfig;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// 必須の環境変数が欠けている場合の終了コード
const CONFIG_ERROR_EXIT_CODE: u8 = 2;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // ログは stderr に出す（stdout は進捗とエラーメッセージ用）
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("{}", "dockpush: build & push".bold());

    let config = match PublishConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            println!("{} {}", "✗".red(), e);
            return ExitCode::from(CONFIG_ERROR_EXIT_CODE);
        }
    };

    println!("docker-file-name: {}", config.dockerfile);
    tracing::debug!("Configuration: {:?}", config);

    let mut stdout = std::io::stdout();
    match dockpush_build::run(DockerEngine::connect, &config, &mut stdout).await {
        Ok(image) => {
            println!("{} {}", "✓ Pushed".green(), image);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            println!("{} {}", "✗".red(), e);
            ExitCode::from(e.exit_code())
        }
    }
}
