use std::process::ExitCode;

use scrape_image_relay::logging::{self, LogConfig};
use scrape_image_relay::{Pipeline, Settings};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _guard = match logging::init_logging(LogConfig::new(settings.log_dir.clone())) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("logging setup failed: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let pipeline = match Pipeline::new(settings) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, "pipeline setup failed");
            return ExitCode::FAILURE;
        }
    };

    match pipeline.run().await {
        Ok(report) => {
            tracing::info!(
                file = %report.saved.path.display(),
                captioned = report.caption.is_some(),
                submitted = report.submitted,
                "run finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(kind = ?e.kind(), error = %e, "run failed");
            ExitCode::FAILURE
        }
    }
}
