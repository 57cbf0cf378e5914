use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::opt::{log_if, warn_if, DbgFlg, ErrToStr, Res};

const TIMESTAMP_FORMAT: &str = "<%d%m%Y %H:%M:%S>";

/// Appends raw matched log lines to a per-session file. Never fails the caller.
#[derive(Debug)]
pub struct DraftLogRecorder {
    dir: PathBuf,
    enabled: bool,
    suspended: bool,
    current: Option<PathBuf>,
}

impl DraftLogRecorder {
    pub fn new(dir: impl Into<PathBuf>, enabled: bool) -> Self {
        DraftLogRecorder {
            dir: dir.into(),
            enabled,
            suspended: false,
            current: None,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn suspend(&mut self, suspended: bool) {
        self.suspended = suspended;
    }

    pub fn current_file(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    /// Points the recorder at `DraftLog_<set>_<event>_<id>.log`. The file is created on first write.
    pub fn start(&mut self, set_code: &str, event: &str, session_id: &str) {
        let path = self
            .dir
            .join(format!("DraftLog_{}_{}_{}.log", set_code, event, session_id));
        log_if(
            &format!("New draft log: {}", path.display()),
            DbgFlg::DraftLog,
        );
        self.current = Some(path);
    }

    pub fn record(&self, line: &str) {
        if !self.enabled || self.suspended {
            return;
        }
        let Some(path) = self.current.as_ref() else {
            return;
        };

        if let Err(err) = append_line(path, line) {
            warn_if(
                &format!("Failed to write draft log {}: {}", path.display(), err),
                DbgFlg::DraftLog,
            );
        }
    }
}

fn append_line(path: &Path, line: &str) -> Res<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).err_to_str()?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .err_to_str()?;
    writeln!(
        file,
        "{},{}",
        Local::now().format(TIMESTAMP_FORMAT),
        line.trim_end_matches(['\r', '\n'])
    )
    .err_to_str()
}
