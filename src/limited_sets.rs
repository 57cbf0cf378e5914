use std::path::Path;

use serde::Deserialize;

use crate::opt::{ErrToStr, Res};

const REPLACE_PHRASE_LATEST: &str = "{LATEST}";
const SPECIAL_LABEL_MAX_LEN: usize = 12;
pub const UNKNOWN_SET_CODE: &str = "UNKN";
pub const DEFAULT_CUBE_CODE: &str = "CUBE";

const DEFAULT_SET_CODES: &[&str] = &[
    "FDN", "DSK", "BLB", "MH3", "OTJ", "MKM", "LCI", "WOE", "LTR", "MOM", "ONE", "BRO", "DMU",
    "HBG", "SNC", "NEO", "VOW", "MID", "AFR", "STX", "KHM", "KLR", "ZNR", "AKR", "M21", "IKO",
    "THB", "ELD", "M20", "WAR", "RNA", "GRN", "DOM", "RIX", "XLN",
];

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SetInfo {
    #[serde(default)]
    pub name: String,
    pub code: String,
}

/// Event recognised by keywords rather than by the usual `<Format>_<SET>_<date>` naming.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SpecialEvent {
    pub label: String,
    /// Format token (`Sealed`, `PremierDraft`, ...) or a format kind name.
    pub format: String,
    pub set_code: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CubeVariant {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetList {
    #[serde(default)]
    pub latest_set: String,
    #[serde(default = "default_sets")]
    pub sets: Vec<SetInfo>,
    #[serde(default = "default_special_events")]
    pub special_events: Vec<SpecialEvent>,
    #[serde(default = "default_cubes")]
    pub cubes: Vec<CubeVariant>,
}

fn default_sets() -> Vec<SetInfo> {
    DEFAULT_SET_CODES
        .iter()
        .map(|code| SetInfo {
            name: String::new(),
            code: code.to_string(),
        })
        .collect()
}

fn default_special_events() -> Vec<SpecialEvent> {
    let event = |label: &str, format: &str, keywords: &[&str]| SpecialEvent {
        label: label.to_string(),
        format: format.to_string(),
        set_code: REPLACE_PHRASE_LATEST.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    };

    vec![
        event("OpenDay1", "Sealed", &["ArenaOpen", "Day1"]),
        event("OpenDay2", "PremierDraft", &["ArenaOpen", "Day2"]),
        event("QualSealed", "Sealed", &["Qualifier"]),
    ]
}

fn default_cubes() -> Vec<CubeVariant> {
    vec![CubeVariant {
        name: "Arena Cube".to_string(),
        code: DEFAULT_CUBE_CODE.to_string(),
    }]
}

impl Default for SetList {
    fn default() -> Self {
        SetList {
            latest_set: String::new(),
            sets: default_sets(),
            special_events: default_special_events(),
            cubes: default_cubes(),
        }
        .finish()
    }
}

impl SetList {
    pub fn from_json(json: &str) -> Res<Self> {
        let list: SetList = serde_json::from_str(json).err_to_str()?;
        Ok(list.finish())
    }

    pub fn load(path: &Path) -> Res<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|err| format!("failed to read set list {}: {}", path.display(), err))?;
        Self::from_json(&json)
    }

    fn finish(mut self) -> Self {
        if self.latest_set.is_empty() {
            self.latest_set = self
                .sets
                .first()
                .map(|set| set.code.clone())
                .unwrap_or_default();
        }

        let latest = self.latest_set.clone();
        self.special_events
            .iter_mut()
            .filter(|event| event.set_code == REPLACE_PHRASE_LATEST)
            .for_each(|event| event.set_code = latest.clone());
        self.special_events
            .iter_mut()
            .for_each(|event| event.label = event.label.chars().take(SPECIAL_LABEL_MAX_LEN).collect());
        self
    }

    /// First special event whose keywords all appear in the event name.
    pub fn special_event(&self, event_name: &str) -> Option<&SpecialEvent> {
        self.special_events.iter().find(|event| {
            !event.keywords.is_empty()
                && event
                    .keywords
                    .iter()
                    .all(|keyword| event_name.contains(keyword.as_str()))
        })
    }

    /// Known set codes appearing in any of the sections, in the order they are listed.
    pub fn set_codes_in(&self, sections: &[&str]) -> Vec<String> {
        let lowered: Vec<String> = sections.iter().map(|s| s.to_lowercase()).collect();
        let mut codes: Vec<String> = Vec::new();
        for set in self.sets.iter() {
            let code = set.code.to_lowercase();
            if code.is_empty() || codes.contains(&set.code) {
                continue;
            }
            if lowered.iter().any(|section| section.contains(&code)) {
                codes.push(set.code.clone());
            }
        }
        codes
    }

    /// Code of the cube variant named in the event, longest name first.
    pub fn cube_code(&self, event_name: &str) -> String {
        let event = event_name.to_lowercase();
        let mut cubes: Vec<&CubeVariant> = self.cubes.iter().collect();
        cubes.sort_by(|a, b| b.name.len().cmp(&a.name.len()));

        cubes
            .into_iter()
            .find(|cube| {
                let keyword = cube.name.to_lowercase().replace("cube", "");
                let keyword = keyword.trim();
                !keyword.is_empty() && event.contains(keyword)
            })
            .map(|cube| cube.code.clone())
            .unwrap_or_else(|| DEFAULT_CUBE_CODE.to_string())
    }
}
