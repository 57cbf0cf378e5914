use std::str::FromStr;

use serde_json::Value;

use super::payload::{json_find, parse_nested};
use super::ScanError;
use crate::limited_sets::{SetList, UNKNOWN_SET_CODE};
use crate::models::draft_session::{FormatKind, DEFAULT_SEAT_COUNT, PICK_TWO_SEAT_COUNT};

pub const START_MARKERS: &[&str] = &[
    "[UnityCrossThreadLogger]==> Event_Join ",
    "[UnityCrossThreadLogger]==> BotDraft_DraftStatus ",
];

const PREMIER_TOKEN: &str = "PremierDraft";
const PICK_TWO_TOKEN: &str = "PickTwo";
const CATCH_ALL_TOKENS: &[&str] = &["Draft", "draft"];

/// Checked in order against every underscore-separated segment of the event name.
const FORMAT_TOKENS: &[&str] = &[
    "PickTwoTradDraft",
    "PickTwoDraft",
    PREMIER_TOKEN,
    "QuickDraft",
    "TradDraft",
    "BotDraft",
    "TradSealed",
    "Sealed",
];

/// Format kind for a token from the event name or the set list.
pub fn format_for_token(token: &str, legacy_premier: bool) -> Option<FormatKind> {
    let format = match token {
        "PickTwoTradDraft" => FormatKind::PickTwoTraditional,
        "PickTwoDraft" => FormatKind::PickTwo,
        PREMIER_TOKEN if legacy_premier => FormatKind::PremierV2,
        PREMIER_TOKEN => FormatKind::PremierV1,
        "QuickDraft" | "BotDraft" => FormatKind::Quick,
        "TradDraft" => FormatKind::Traditional,
        "TradSealed" => FormatKind::SealedTraditional,
        "Sealed" => FormatKind::Sealed,
        other => return FormatKind::from_str(other).ok(),
    };
    Some(format)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub format: FormatKind,
    pub label: String,
    pub set_codes: Vec<String>,
    pub seat_count: usize,
}

/// Payload of a start line: the event name and the id the client gave the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartEntry {
    pub event_name: String,
    pub id: Option<String>,
}

/// The start marker contained in `line`, if any.
pub fn find_start_marker(line: &str) -> Option<&'static str> {
    START_MARKERS.iter().copied().find(|marker| line.contains(marker))
}

pub fn parse_start_entry(line: &str, marker: &'static str) -> Result<StartEntry, ScanError> {
    let after = line
        .find(marker)
        .map(|at| &line[at + marker.len()..])
        .unwrap_or(line);
    let brace = after
        .find('{')
        .ok_or_else(|| ScanError::MissingPayload(marker.trim().to_string()))?;
    let value = parse_nested(&after[brace..])?;

    let event_name = json_find("EventName", &value)
        .and_then(Value::as_str)
        .ok_or(ScanError::MissingField("EventName"))?
        .to_string();
    let id = json_find("id", &value)
        .and_then(Value::as_str)
        .map(|s| s.to_string());

    Ok(StartEntry { event_name, id })
}

fn seat_count_for(event_name: &str) -> usize {
    if event_name.contains(PICK_TWO_TOKEN) {
        PICK_TWO_SEAT_COUNT
    } else {
        DEFAULT_SEAT_COUNT
    }
}

pub fn classify_event(
    event_name: &str,
    sets: &SetList,
    legacy_premier: bool,
) -> Option<Classification> {
    classify_special(event_name, sets, legacy_premier)
        .or_else(|| classify_standard(event_name, sets, legacy_premier))
}

fn classify_special(
    event_name: &str,
    sets: &SetList,
    legacy_premier: bool,
) -> Option<Classification> {
    let event = sets.special_event(event_name)?;
    let format = format_for_token(&event.format, legacy_premier)?;
    Some(Classification {
        format,
        label: event.label.clone(),
        set_codes: vec![event.set_code.clone()],
        seat_count: seat_count_for(event_name),
    })
}

fn classify_standard(
    event_name: &str,
    sets: &SetList,
    legacy_premier: bool,
) -> Option<Classification> {
    let sections: Vec<&str> = event_name.split('_').collect();
    let in_sections = |token: &str| sections.iter().any(|section| section.contains(token));

    let token = FORMAT_TOKENS
        .iter()
        .copied()
        .find(|token| in_sections(token))
        .or_else(|| {
            CATCH_ALL_TOKENS
                .iter()
                .any(|token| in_sections(token))
                .then_some(PREMIER_TOKEN)
        })?;

    // Trad_Sealed_NEO_20220317
    let token = if token == "Sealed" && sections.contains(&"Trad") {
        "TradSealed"
    } else {
        token
    };
    let format = format_for_token(token, legacy_premier)?;

    let set_codes = if event_name.to_lowercase().contains("cube") {
        vec![sets.cube_code(event_name)]
    } else {
        let codes = sets.set_codes_in(&sections);
        if codes.is_empty() {
            vec![UNKNOWN_SET_CODE.to_string()]
        } else {
            codes
        }
    };

    Some(Classification {
        format,
        label: token.to_string(),
        set_codes,
        seat_count: seat_count_for(event_name),
    })
}
