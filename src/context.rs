use std::collections::HashMap;
use std::env;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use directories::{BaseDirs, ProjectDirs};

use crate::ocr;
use crate::opt::{log_if, parse_flag, DbgFlg, ErrToStr, Res};
use crate::scanner::ScannerOptions;

const APP_NAME: &str = "arena-draft-scanner";
const APP_AUTHOR: &str = "akio";
const APP_QUALIFIER: &str = "com";

const CONTEXT_FILE_NAME: &str = "runtime_data.json";

pub const KEY_LOG_PATH: &str = "arena_log_path";
pub const KEY_DRAFT_LOG: &str = "draft_log_enabled";

const DEFAULT_DRAFT_LOG_DIR: &str = "Logs";
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

const WINDOWS_DRIVES: &[&str] = &["C", "D", "E", "F"];
const WINDOWS_LOG_LOCATION: &str = "AppData/LocalLow/Wizards Of The Coast/MTGA/Player.log";
const MAC_LOG_LOCATION: &str = "Library/Logs/Wizards of the Coast/MTGA/Player.log";

/// Small key/value store kept next to the user's other application data.
pub struct AppContext {
    pub data: Arc<RwLock<HashMap<String, String>>>,
    file_path: PathBuf,
}

pub fn create_context() -> Res<AppContext> {
    let project_dirs = ProjectDirs::from(APP_QUALIFIER, APP_AUTHOR, APP_NAME)
        .ok_or_else(|| "Failed to get the project directory".to_string())?;

    let runtime_dir = project_dirs.data_local_dir();
    log_if(
        &format!("Runtime directory: {}", runtime_dir.display()),
        DbgFlg::Context,
    );
    fs::create_dir_all(runtime_dir).err_to_str()?;

    AppContext::load(&runtime_dir.join(CONTEXT_FILE_NAME))
}

impl AppContext {
    pub fn load(file_path: &Path) -> Res<Self> {
        let data = if file_path.exists() {
            let contents = fs::read_to_string(file_path).err_to_str()?;
            if contents.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&contents).err_to_str()?
            }
        } else {
            HashMap::new()
        };

        Ok(AppContext {
            data: Arc::new(RwLock::new(data)),
            file_path: file_path.to_path_buf(),
        })
    }

    pub fn read_data(&self, key: &str) -> Option<String> {
        let data = self.data.read().ok()?;
        data.get(key).cloned()
    }

    pub fn write_data(&self, key: &str, value: &str) -> Res<()> {
        let mut data = self.data.write().err_to_str()?;
        data.insert(key.to_string(), value.to_string());
        log_if(&format!("Saved {} = {}", key, value), DbgFlg::Context);
        save_data(&self.file_path, &data)
    }
}

fn save_data(file_path: &Path, data: &HashMap<String, String>) -> Res<()> {
    let content = serde_json::to_string(data).err_to_str()?;
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(file_path)
        .err_to_str()?;
    file.write_all(content.as_bytes()).err_to_str()
}

/// Everything the binary needs to build and drive a scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannerConfig {
    pub log_path: Option<PathBuf>,
    pub sets_file: Option<PathBuf>,
    pub sets_dir: Option<PathBuf>,
    pub draft_log_dir: PathBuf,
    pub draft_log_enabled: bool,
    pub step_through: bool,
    pub use_ocr: bool,
    pub ocr_command: Option<String>,
    pub ocr_timeout: Duration,
    pub legacy_premier: bool,
    pub poll_interval: Duration,
    pub retrieve_unknown: bool,
}

impl ScannerConfig {
    pub fn from_env(context: &AppContext) -> Self {
        Self::from_lookup(|name| env::var(name).ok(), context)
    }

    /// Variables first, then whatever was persisted, then platform defaults.
    pub fn from_lookup<F>(lookup: F, context: &AppContext) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = |name: &str| {
            lookup(name)
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
        };
        let flag = |name: &str| lookup(name).map(|s| parse_flag(&s));
        let number = |name: &str, default: u64| {
            lookup(name)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default)
        };

        let log_path = path("ARENA_LOG_PATH")
            .or_else(|| context.read_data(KEY_LOG_PATH).map(PathBuf::from))
            .or_else(default_log_path);
        let draft_log_enabled = flag("DRAFT_LOG_ENABLED")
            .or_else(|| context.read_data(KEY_DRAFT_LOG).map(|s| parse_flag(&s)))
            .unwrap_or(false);

        ScannerConfig {
            log_path,
            sets_file: path("SETS_FILE"),
            sets_dir: path("SETS_DIR"),
            draft_log_dir: path("DRAFT_LOG_DIR")
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DRAFT_LOG_DIR)),
            draft_log_enabled,
            step_through: flag("STEP_THROUGH").unwrap_or(false),
            use_ocr: flag("USE_OCR").unwrap_or(false),
            ocr_command: lookup("OCR_COMMAND").filter(|s| !s.trim().is_empty()),
            ocr_timeout: Duration::from_secs(number("OCR_TIMEOUT_SECS", ocr::DEFAULT_TIMEOUT_SECS)),
            legacy_premier: flag("LEGACY_PREMIER_LOG").unwrap_or(false),
            poll_interval: Duration::from_millis(number("POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)),
            retrieve_unknown: flag("RETRIEVE_UNKNOWN").unwrap_or(false),
        }
    }

    pub fn scanner_options(&self) -> ScannerOptions {
        ScannerOptions {
            step_through: self.step_through,
            retrieve_unknown: self.retrieve_unknown,
            legacy_premier: self.legacy_premier,
            ocr_timeout: self.ocr_timeout,
            sets_dir: self.sets_dir.clone(),
        }
    }
}

/// First platform location where the client log exists.
pub fn default_log_path() -> Option<PathBuf> {
    default_log_candidates()
        .into_iter()
        .find(|candidate| candidate.is_file())
}

fn default_log_candidates() -> Vec<PathBuf> {
    match env::consts::OS {
        "windows" => {
            let Ok(user) = env::var("USERNAME") else {
                return Vec::new();
            };
            WINDOWS_DRIVES
                .iter()
                .map(|drive| {
                    PathBuf::from(format!("{}:/", drive))
                        .join("Users")
                        .join(&user)
                        .join(WINDOWS_LOG_LOCATION)
                })
                .collect()
        }
        "macos" => BaseDirs::new()
            .map(|dirs| vec![dirs.home_dir().join(MAC_LOG_LOCATION)])
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, NamedTempFile};

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_read_write_data() {
        let file = NamedTempFile::new().unwrap();
        let context = AppContext::load(file.path()).unwrap();

        assert_eq!(context.read_data("key"), None);

        context.write_data("key", "value").unwrap();
        assert_eq!(context.read_data("key"), Some("value".to_string()));
    }

    #[test]
    fn test_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONTEXT_FILE_NAME);

        {
            let context = AppContext::load(&path).unwrap();
            context.write_data(KEY_LOG_PATH, "/tmp/Player.log").unwrap();
        }

        {
            let context = AppContext::load(&path).unwrap();
            assert_eq!(
                context.read_data(KEY_LOG_PATH),
                Some("/tmp/Player.log".to_string())
            );
        }
    }

    #[test]
    fn test_corrupt_context_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(AppContext::load(file.path()).is_err());
    }

    #[test]
    fn test_config_defaults() {
        let file = NamedTempFile::new().unwrap();
        let context = AppContext::load(file.path()).unwrap();
        context.write_data(KEY_LOG_PATH, "/saved/Player.log").unwrap();

        let config = ScannerConfig::from_lookup(vars(&[]), &context);
        assert_eq!(config.log_path, Some(PathBuf::from("/saved/Player.log")));
        assert_eq!(config.draft_log_dir, PathBuf::from("Logs"));
        assert!(!config.draft_log_enabled);
        assert!(!config.use_ocr);
        assert_eq!(config.ocr_command, None);
        assert_eq!(config.ocr_timeout, Duration::from_secs(5));
        assert_eq!(config.poll_interval, Duration::from_millis(1000));
    }

    #[test]
    fn test_config_from_variables() {
        let file = NamedTempFile::new().unwrap();
        let context = AppContext::load(file.path()).unwrap();
        context.write_data(KEY_LOG_PATH, "/saved/Player.log").unwrap();
        context.write_data(KEY_DRAFT_LOG, "true").unwrap();

        let config = ScannerConfig::from_lookup(
            vars(&[
                ("ARENA_LOG_PATH", "/env/Player.log"),
                ("SETS_DIR", "/data/sets"),
                ("STEP_THROUGH", "1"),
                ("USE_OCR", "yes"),
                ("OCR_COMMAND", "tesseract screen.png -"),
                ("OCR_TIMEOUT_SECS", "9"),
                ("LEGACY_PREMIER_LOG", "true"),
                ("POLL_INTERVAL_MS", "250"),
                ("RETRIEVE_UNKNOWN", "on"),
                ("DRAFT_LOG_ENABLED", "0"),
            ]),
            &context,
        );
        assert_eq!(config.log_path, Some(PathBuf::from("/env/Player.log")));
        assert!(!config.draft_log_enabled);
        assert!(config.use_ocr);
        assert_eq!(config.ocr_command.as_deref(), Some("tesseract screen.png -"));
        assert_eq!(config.poll_interval, Duration::from_millis(250));

        let options = config.scanner_options();
        assert!(options.step_through);
        assert!(options.legacy_premier);
        assert!(options.retrieve_unknown);
        assert_eq!(options.ocr_timeout, Duration::from_secs(9));
        assert_eq!(options.sets_dir, Some(PathBuf::from("/data/sets")));
    }

    #[test]
    fn test_persisted_draft_log_toggle() {
        let file = NamedTempFile::new().unwrap();
        let context = AppContext::load(file.path()).unwrap();
        context.write_data(KEY_DRAFT_LOG, "true").unwrap();

        let config = ScannerConfig::from_lookup(vars(&[("POLL_INTERVAL_MS", "fast")]), &context);
        assert!(config.draft_log_enabled);
        assert_eq!(config.poll_interval, Duration::from_millis(1000));
    }
}
