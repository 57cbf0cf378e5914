use std::collections::HashMap;
use std::fmt::Display;
use std::{env, result};

use lazy_static::lazy_static;

pub type Res<T> = Result<T, String>;

pub trait ErrToStr<T, E: Display> {
    fn err_to_str(self) -> Res<T>;
}

impl<T, E: Display> ErrToStr<T, E> for result::Result<T, E> {
    fn err_to_str(self) -> Res<T> {
        self.map_err(|err| err.to_string())
    }
}

#[derive(strum_macros::Display, Eq, PartialEq, Debug, Hash, Clone, Copy)]
pub enum DbgFlg {
    #[strum(serialize = "DBG_FLG_SCANNER")]
    Scanner,
    #[strum(serialize = "DBG_FLG_SESSION")]
    Session,
    #[strum(serialize = "DBG_FLG_OCR")]
    Ocr,
    #[strum(serialize = "DBG_FLG_DRAFT_LOG")]
    DraftLog,
    #[strum(serialize = "DBG_FLG_CONTEXT")]
    Context,
}

lazy_static! {
    pub static ref DBG_FLG_DEFAULTS: HashMap<DbgFlg, bool> = HashMap::from([
        (DbgFlg::Scanner, true),
        (DbgFlg::Session, true),
        (DbgFlg::Ocr, true),
        (DbgFlg::DraftLog, true),
        (DbgFlg::Context, false),
    ]);
}

pub fn log_if(s: &str, flg: DbgFlg) {
    if checkflag(&flg) {
        tracing::info!(category = %flg, "{}", s);
    }
}

pub fn warn_if(s: &str, flg: DbgFlg) {
    if checkflag(&flg) {
        tracing::warn!(category = %flg, "{}", s);
    }
}

pub fn parse_flag(s: &str) -> bool {
    matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn checkflag(flag: &DbgFlg) -> bool {
    env::var(flag.to_string()).ok().map_or_else(
        || DBG_FLG_DEFAULTS.get(flag).copied().unwrap_or(false),
        |s| parse_flag(&s),
    )
}
