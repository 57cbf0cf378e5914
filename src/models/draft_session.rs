use strum_macros::{Display, EnumString};

pub const DEFAULT_SEAT_COUNT: usize = 8;
pub const PICK_TWO_SEAT_COUNT: usize = 4;

/// How a limited event reports its packs and picks in the client log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum FormatKind {
    PremierV1,
    PremierV2,
    Quick,
    Traditional,
    Sealed,
    SealedTraditional,
    PickTwo,
    PickTwoTraditional,
}

impl FormatKind {
    /// Formats whose first pack may be read off the screen before the log reports it.
    pub fn supports_ocr(&self) -> bool {
        matches!(
            self,
            FormatKind::PremierV1
                | FormatKind::PremierV2
                | FormatKind::Traditional
                | FormatKind::PickTwo
                | FormatKind::PickTwoTraditional
        )
    }
}

/// The event the player joined. Replaced wholesale whenever a new start marker is classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSession {
    pub format: FormatKind,
    pub set_codes: Vec<String>,
    pub seat_count: usize,
    pub session_id: String,
    pub label: String,
    /// Internal event name exactly as logged, used to find the sealed pool.
    pub event_name: String,
}

impl DraftSession {
    pub fn primary_set(&self) -> &str {
        self.set_codes.first().map(|s| s.as_str()).unwrap_or("")
    }
}

/// Returned by the session detector when a new session begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub format: FormatKind,
    pub set_codes: Vec<String>,
    pub label: String,
    pub session_id: String,
}

impl From<&DraftSession> for SessionEvent {
    fn from(session: &DraftSession) -> Self {
        SessionEvent {
            format: session.format,
            set_codes: session.set_codes.clone(),
            label: session.label.clone(),
            session_id: session.session_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_format_kind_from_str() {
        assert_eq!(FormatKind::from_str("Quick").unwrap(), FormatKind::Quick);
        assert!(FormatKind::from_str("Cube").is_err());
        assert_eq!(FormatKind::SealedTraditional.to_string(), "SealedTraditional");
    }

    #[test]
    fn test_format_capabilities() {
        assert!(!FormatKind::SealedTraditional.supports_ocr());
        assert!(!FormatKind::Quick.supports_ocr());
        assert!(FormatKind::PickTwo.supports_ocr());
    }
}
