use std::error::Error;
use std::sync::Arc;

use dotenv::dotenv;
use tokio::sync::Mutex;
use tracing_subscriber::filter::EnvFilter;

use crate::context::{ScannerConfig, KEY_LOG_PATH};
use crate::draft_log::DraftLogRecorder;
use crate::limited_sets::SetList;
use crate::ocr::CommandRecognizer;
use crate::opt::{warn_if, DbgFlg};
use crate::scanner::Scanner;

mod cli;
mod context;
mod dataset;
mod draft_log;
mod limited_sets;
mod models;
mod ocr;
mod opt;
mod scanner;
mod watcher;

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();

    if let Err(err) = run().await {
        tracing::error!("{}", err);
        std::process::exit(1);
    }
}

/// Logs go to stderr so they don't interleave with REPL replies.
fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn Error>> {
    tracing::info!("OS type: {} {}", std::env::consts::OS, std::env::consts::ARCH);

    let context = Arc::new(context::create_context()?);
    let config = ScannerConfig::from_env(&context);

    let log_path = config
        .log_path
        .clone()
        .ok_or("Arena log not found, set ARENA_LOG_PATH")?;
    context.write_data(KEY_LOG_PATH, &log_path.to_string_lossy())?;
    tracing::info!("Watching {}", log_path.display());

    let sets = match config.sets_file.as_deref() {
        Some(path) => SetList::load(path)?,
        None => SetList::default(),
    };
    let recorder = DraftLogRecorder::new(config.draft_log_dir.clone(), config.draft_log_enabled);
    let mut scanner = Scanner::new(log_path, sets, config.scanner_options(), recorder);

    if config.use_ocr {
        match config.ocr_command.as_deref() {
            Some(command) => {
                scanner.set_recognizer(Arc::new(CommandRecognizer::from_command_line(command)?))
            }
            None => warn_if("USE_OCR is set but OCR_COMMAND is empty", DbgFlg::Ocr),
        }
    }

    let scanner = Arc::new(Mutex::new(scanner));
    let poller = tokio::spawn(watcher::run(
        scanner.clone(),
        config.poll_interval,
        config.use_ocr,
    ));

    let result = cli::main(scanner, context, config.use_ocr).await;
    poller.abort();
    result
}
