use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::sync::Mutex;

use crate::opt::{log_if, warn_if, DbgFlg};
use crate::scanner::Scanner;

/// Remembers the log's size and modification time between ticks.
#[derive(Debug, Default)]
pub struct ModifiedWatch {
    last: Option<(u64, SystemTime)>,
}

impl ModifiedWatch {
    /// True when the file exists and its size or modification time moved since the last call.
    /// Coarse timestamps can hide an append, the size never does.
    pub fn changed(&mut self, path: &Path) -> bool {
        let stamp = fs::metadata(path)
            .and_then(|meta| Ok((meta.len(), meta.modified()?)))
            .ok();
        if stamp.is_none() || stamp == self.last {
            return false;
        }
        self.last = stamp;
        true
    }
}

/// One detector pass followed by one data pass. Returns whether the draft changed.
pub fn tick(scanner: &mut Scanner, use_ocr: bool) -> bool {
    if let Some(event) = scanner.check_session() {
        log_if(
            &format!(
                "Joined {} {} ({})",
                event.label,
                event.set_codes.join("/"),
                event.session_id
            ),
            DbgFlg::Session,
        );
    }

    let updated = scanner.check_data(use_ocr);
    if updated {
        log_if(
            &format!(
                "Draft at {}: {} in pack, {} missing, {} taken",
                scanner.coordinate(),
                scanner.current_pack().len(),
                scanner.missing().len(),
                scanner.taken().len()
            ),
            DbgFlg::Scanner,
        );
    }
    updated
}

pub async fn run(scanner: Arc<Mutex<Scanner>>, interval: Duration, use_ocr: bool) {
    let mut watch = ModifiedWatch::default();
    let mut ticker = tokio::time::interval(interval);

    loop {
        ticker.tick().await;

        let path = scanner.lock().await.log_path().to_path_buf();
        if !watch.changed(&path) {
            continue;
        }

        // file reads and the OCR wait block, keep them off the runtime workers
        let shared = scanner.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut scanner = shared.blocking_lock();
            tick(&mut scanner, use_ocr)
        })
        .await;
        if let Err(err) = result {
            warn_if(&format!("Poll tick failed: {}", err), DbgFlg::Scanner);
        }
    }
}
