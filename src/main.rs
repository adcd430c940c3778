use clap::Parser;
use qjob::app;
use qjob::config::{Cli, LogFormat};
use qjob::utils::error::ErrorSeverity;
use qjob::utils::logger;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // 初始化日誌
    match cli.log_format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }

    tracing::debug!("Output format: {:?}", cli.output);

    let result = app::execute(&cli)
        .await
        .and_then(|output| output.render(cli.output));

    match result {
        Ok(rendered) => {
            if !rendered.is_empty() {
                println!("{}", rendered);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::debug!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }
}
