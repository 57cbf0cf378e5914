use serde_json::Value;

use super::payload::{as_card_ids, as_number, json_find, parse_first, parse_nested};
use super::ScanError;
use crate::models::draft_data::{CardId, PackCoordinate};
use crate::models::draft_session::FormatKind;

/// Where the JSON payload of a matched line begins.
#[derive(Debug, Clone, Copy)]
pub enum PayloadStart {
    /// First occurrence of this opening token.
    Token(&'static str),
    /// Right after the marker.
    AfterMarker,
}

#[derive(Debug, Clone, Copy)]
pub enum Decode {
    /// String leaves holding JSON are decoded too.
    Nested,
    Plain,
}

/// Line layout of a pack observation.
#[derive(Debug)]
pub struct PackSchema {
    pub name: &'static str,
    pub marker: &'static str,
    pub start: PayloadStart,
    pub decode: Decode,
    pub pack_field: &'static str,
    pub pick_field: &'static str,
    pub cards_field: &'static str,
    pub zero_based: bool,
    /// Only pack 1 pick 1 is accepted, and the coordinate is only set while unset.
    pub first_pick: bool,
    /// Field and value that must match for the line to count.
    pub status: Option<(&'static str, &'static str)>,
    /// Field listing the cards already taken, used when the pool is still empty.
    pub picked_field: Option<&'static str>,
}

/// Line layout of a pick made by the player.
#[derive(Debug)]
pub struct PickSchema {
    pub name: &'static str,
    pub marker: &'static str,
    pub start: PayloadStart,
    pub decode: Decode,
    pub pack_field: &'static str,
    pub pick_field: &'static str,
    /// Tried in order; the first one present wins.
    pub cards_fields: &'static [&'static str],
    pub zero_based: bool,
}

pub static PREMIER_P1P1: PackSchema = PackSchema {
    name: "premier_p1p1",
    marker: "CardsInPack",
    start: PayloadStart::Token("{\"id\":"),
    decode: Decode::Nested,
    pack_field: "PackNumber",
    pick_field: "PickNumber",
    cards_field: "CardsInPack",
    zero_based: false,
    first_pick: true,
    status: None,
    picked_field: None,
};

pub static PREMIER_PACK_V1: PackSchema = PackSchema {
    name: "premier_pack_v1",
    marker: "[UnityCrossThreadLogger]Draft.Notify ",
    start: PayloadStart::Token("{\"draftId\""),
    decode: Decode::Nested,
    pack_field: "SelfPack",
    pick_field: "SelfPick",
    cards_field: "PackCards",
    zero_based: false,
    first_pick: false,
    status: None,
    picked_field: None,
};

pub static PREMIER_PACK_V2: PackSchema = PackSchema {
    name: "premier_pack_v2",
    marker: "[UnityCrossThreadLogger]Draft.Notify ",
    start: PayloadStart::AfterMarker,
    decode: Decode::Plain,
    pack_field: "SelfPack",
    pick_field: "SelfPick",
    cards_field: "PackCards",
    zero_based: false,
    first_pick: false,
    status: None,
    picked_field: None,
};

pub static QUICK_PACK: PackSchema = PackSchema {
    name: "quick_pack",
    marker: "DraftPack",
    start: PayloadStart::Token("{\"CurrentModule\""),
    decode: Decode::Nested,
    pack_field: "PackNumber",
    pick_field: "PickNumber",
    cards_field: "DraftPack",
    zero_based: true,
    first_pick: false,
    status: Some(("DraftStatus", "PickNext")),
    picked_field: Some("PickedCards"),
};

pub static PREMIER_PICK_V1: PickSchema = PickSchema {
    name: "premier_pick_v1",
    marker: "[UnityCrossThreadLogger]==> Event_PlayerDraftMakePick ",
    start: PayloadStart::Token("{\"id\""),
    decode: Decode::Nested,
    pack_field: "Pack",
    pick_field: "Pick",
    cards_fields: &["GrpIds", "GrpId"],
    zero_based: false,
};

pub static PREMIER_PICK_V2: PickSchema = PickSchema {
    name: "premier_pick_v2",
    marker: "[UnityCrossThreadLogger]==> Draft.MakeHumanDraftPick ",
    start: PayloadStart::AfterMarker,
    decode: Decode::Nested,
    pack_field: "packNumber",
    pick_field: "pickNumber",
    cards_fields: &["cardIds", "cardId"],
    zero_based: false,
};

pub static QUICK_PICK: PickSchema = PickSchema {
    name: "quick_pick",
    marker: "[UnityCrossThreadLogger]==> BotDraft_DraftPick ",
    start: PayloadStart::AfterMarker,
    decode: Decode::Nested,
    pack_field: "PackNumber",
    pick_field: "PickNumber",
    cards_fields: &["CardIds", "CardId"],
    zero_based: true,
};

const SEALED_POOL_MARKER: &str = "CardPool";
/// More copies than any real pool holds of one card.
const MAX_POOL_COPIES: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    Pack {
        coordinate: PackCoordinate,
        cards: Vec<CardId>,
        first_pick: bool,
        picked: Vec<CardId>,
    },
    Pick {
        coordinate: PackCoordinate,
        cards: Vec<CardId>,
    },
    Pool(Vec<CardId>),
}

#[derive(Debug, Clone, Copy)]
pub enum Extractor {
    Pack(&'static PackSchema),
    Pick(&'static PickSchema),
    SealedPool,
}

impl Extractor {
    pub fn name(&self) -> &'static str {
        match self {
            Extractor::Pack(schema) => schema.name,
            Extractor::Pick(schema) => schema.name,
            Extractor::SealedPool => "sealed_pool",
        }
    }

    /// `Ok(None)` when the line is not for this extractor or carries nothing to apply.
    pub fn extract(&self, line: &str, event_name: &str) -> Result<Option<Observation>, ScanError> {
        match self {
            Extractor::Pack(schema) => extract_pack(schema, line),
            Extractor::Pick(schema) => extract_pick(schema, line),
            Extractor::SealedPool => extract_sealed_pool(line, event_name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Pack,
    Pick,
}

/// Extractors sharing one offset. Every line read on the channel is offered to each of them.
#[derive(Debug, Clone)]
pub struct Channel {
    pub kind: ChannelKind,
    pub extractors: Vec<Extractor>,
}

/// What to run for a session, fixed when the session is classified.
#[derive(Debug, Clone)]
pub struct DispatchPlan {
    pub uses_ocr: bool,
    pub channels: Vec<Channel>,
}

impl DispatchPlan {
    pub fn for_format(format: FormatKind) -> Self {
        let pack = |extractors: Vec<Extractor>| Channel {
            kind: ChannelKind::Pack,
            extractors,
        };
        let pick = |schema: &'static PickSchema| Channel {
            kind: ChannelKind::Pick,
            extractors: vec![Extractor::Pick(schema)],
        };

        let channels = match format {
            FormatKind::PremierV1
            | FormatKind::Traditional
            | FormatKind::PickTwo
            | FormatKind::PickTwoTraditional => vec![
                pack(vec![
                    Extractor::Pack(&PREMIER_P1P1),
                    Extractor::Pack(&PREMIER_PACK_V1),
                ]),
                pick(&PREMIER_PICK_V1),
            ],
            FormatKind::PremierV2 => vec![
                pack(vec![
                    Extractor::Pack(&PREMIER_P1P1),
                    Extractor::Pack(&PREMIER_PACK_V2),
                ]),
                pick(&PREMIER_PICK_V2),
            ],
            // picks first: a pack's picked list only seeds a pool no pick line has filled
            FormatKind::Quick => vec![pick(&QUICK_PICK), pack(vec![Extractor::Pack(&QUICK_PACK)])],
            FormatKind::Sealed | FormatKind::SealedTraditional => {
                vec![pack(vec![Extractor::SealedPool])]
            }
        };

        DispatchPlan {
            uses_ocr: format.supports_ocr(),
            channels,
        }
    }
}

fn locate<'a>(line: &'a str, marker: &str, start: PayloadStart) -> Option<&'a str> {
    let at = line.find(marker)?;
    let from = match start {
        PayloadStart::Token(token) => line.find(token)?,
        PayloadStart::AfterMarker => at + marker.len(),
    };
    Some(&line[from..])
}

fn payload(
    line: &str,
    name: &'static str,
    marker: &str,
    start: PayloadStart,
    decode: Decode,
) -> Result<Option<Value>, ScanError> {
    if !line.contains(marker) {
        return Ok(None);
    }
    let text = locate(line, marker, start).ok_or_else(|| ScanError::MissingPayload(name.to_string()))?;
    let value = match decode {
        Decode::Nested => parse_nested(text)?,
        Decode::Plain => parse_first(text)?,
    };
    Ok(Some(value))
}

fn number_field(value: &Value, field: &'static str, zero_based: bool) -> Result<u32, ScanError> {
    let raw = json_find(field, value).ok_or(ScanError::MissingField(field))?;
    let n = as_number(raw).ok_or_else(|| ScanError::InvalidField {
        field,
        value: raw.to_string(),
    })?;
    if !zero_based {
        return Ok(n);
    }
    n.checked_add(1).ok_or_else(|| ScanError::InvalidField {
        field,
        value: raw.to_string(),
    })
}

fn cards_field(value: &Value, field: &'static str) -> Result<Vec<CardId>, ScanError> {
    let raw = json_find(field, value).ok_or(ScanError::MissingField(field))?;
    as_card_ids(raw).ok_or_else(|| ScanError::InvalidField {
        field,
        value: raw.to_string(),
    })
}

fn extract_pack(schema: &PackSchema, line: &str) -> Result<Option<Observation>, ScanError> {
    let Some(value) = payload(line, schema.name, schema.marker, schema.start, schema.decode)? else {
        return Ok(None);
    };

    if let Some((field, expected)) = schema.status {
        if json_find(field, &value).and_then(Value::as_str) != Some(expected) {
            return Ok(None);
        }
    }

    let coordinate = PackCoordinate::new(
        number_field(&value, schema.pack_field, schema.zero_based)?,
        number_field(&value, schema.pick_field, schema.zero_based)?,
    );
    if schema.first_pick && coordinate != PackCoordinate::new(1, 1) {
        return Ok(None);
    }

    let cards = cards_field(&value, schema.cards_field)?;
    let picked = schema
        .picked_field
        .and_then(|field| json_find(field, &value))
        .and_then(as_card_ids)
        .unwrap_or_default();

    Ok(Some(Observation::Pack {
        coordinate,
        cards,
        first_pick: schema.first_pick,
        picked,
    }))
}

fn extract_pick(schema: &PickSchema, line: &str) -> Result<Option<Observation>, ScanError> {
    let Some(value) = payload(line, schema.name, schema.marker, schema.start, schema.decode)? else {
        return Ok(None);
    };

    let coordinate = PackCoordinate::new(
        number_field(&value, schema.pack_field, schema.zero_based)?,
        number_field(&value, schema.pick_field, schema.zero_based)?,
    );

    let field = schema
        .cards_fields
        .iter()
        .copied()
        .find(|field| json_find(field, &value).is_some())
        .ok_or(ScanError::MissingField(schema.cards_fields[0]))?;
    let cards = cards_field(&value, field)?;

    Ok(Some(Observation::Pick { coordinate, cards }))
}

fn extract_sealed_pool(line: &str, event_name: &str) -> Result<Option<Observation>, ScanError> {
    let event_tag = format!("\"InternalEventName\":\"{}\"", event_name);
    if event_name.is_empty() || !line.contains(&event_tag) || !line.contains(SEALED_POOL_MARKER) {
        return Ok(None);
    }

    let courses_at = line.find("{\"Courses\"");
    let course_at = line.find("{\"Course\"");
    let start = courses_at
        .or(course_at)
        .ok_or_else(|| ScanError::MissingPayload("sealed_pool".to_string()))?;
    let value = parse_nested(&line[start..])?;

    let course = match value.get("Courses").and_then(Value::as_array) {
        Some(courses) => courses
            .iter()
            .find(|course| course_event(course) == Some(event_name)),
        None => value
            .get("Course")
            .filter(|course| course_event(course) == Some(event_name)),
    };
    let Some(course) = course else {
        return Ok(None);
    };

    let pool = course
        .get(SEALED_POOL_MARKER)
        .and_then(Value::as_array)
        .ok_or(ScanError::MissingField(SEALED_POOL_MARKER))?;
    let cards = pool
        .iter()
        .map(pool_entry)
        .collect::<Result<Vec<Vec<CardId>>, ScanError>>()?
        .concat();

    Ok(Some(Observation::Pool(cards)))
}

fn course_event(course: &Value) -> Option<&str> {
    course.get("InternalEventName").and_then(Value::as_str)
}

/// A pool entry is either a bare id or `{"id": .., "quantity": n}`, expanded to one id per copy.
fn pool_entry(entry: &Value) -> Result<Vec<CardId>, ScanError> {
    match entry {
        Value::Object(map) => {
            let id = map
                .get("id")
                .or_else(|| map.get("grpId"))
                .and_then(|id| as_card_ids(id))
                .and_then(|ids| ids.into_iter().next())
                .ok_or(ScanError::MissingField("id"))?;
            let quantity = match map.get("quantity") {
                Some(raw) => as_number(raw)
                    .filter(|n| *n <= MAX_POOL_COPIES)
                    .ok_or_else(|| ScanError::InvalidField {
                        field: "quantity",
                        value: raw.to_string(),
                    })?,
                None => 1,
            };
            Ok(vec![id; quantity as usize])
        }
        other => as_card_ids(other).ok_or_else(|| ScanError::InvalidField {
            field: SEALED_POOL_MARKER,
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OTJ_P1P1: &str = r#"[UnityCrossThreadLogger]==> LogBusinessEvents {"id":"a5515a1a-d96e-4da3-9a4a-c03cc4b2b938","request":"{\"PlayerId\":null,\"ClientPlatform\":null,\"DraftId\":\"87b408d1-43e0-4fb5-8c74-a1227fde087c\",\"EventId\":\"PremierDraft_OTJ_20240416\",\"SeatNumber\":1,\"PackNumber\":1,\"PickNumber\":1,\"PickGrpId\":90459,\"CardsInPack\":[90734,90584,90631,90362,90440,90349,90486,90527,90406,90439,90488,90480,90388,90459],\"AutoPick\":false,\"TimeRemainingOnPick\":63.99701,\"EventType\":24,\"EventTime\":\"2024-05-08T00:56:34.4223433Z\"}"}"#;
    const OTJ_P1P2_BUSINESS: &str = r#"[UnityCrossThreadLogger]==> LogBusinessEvents {"id":"972efef7-cd60-4254-ae18-634210287c95","request":"{\"PlayerId\":null,\"ClientPlatform\":null,\"DraftId\":\"87b408d1-43e0-4fb5-8c74-a1257fde087c\",\"EventId\":\"PremierDraft_OTJ_20240416\",\"SeatNumber\":1,\"PackNumber\":1,\"PickNumber\":2,\"PickGrpId\":90701,\"CardsInPack\":[90702,90417,90607,90524,90481,90588,90440,90418,90353,90494,90360,90609,90548],\"AutoPick\":false,\"TimeRemainingOnPick\":30.8176479,\"EventType\":24,\"EventTime\":\"2024-05-08T00:57:07.6027017Z\"}"}"#;
    const OTJ_P3P14_NOTIFY: &str = r#"[UnityCrossThreadLogger]Draft.Notify {"draftId":"87b408d1-43e0-4fb5-8c74-a1257fde087c","SelfPick":14,"SelfPack":3,"PackCards":"90625"}"#;
    const MKM_PICK: &str = r#"[UnityCrossThreadLogger]==> Event_PlayerDraftMakePick {"id":"49311e08-14e2-4ef0-b532-cff8ac3850dc","request":"{\"Type\":620,\"TransId\":\"49311e08-14e2-4ef0-b532-cff8ac3850dc\",\"Payload\":\"{\\\"DraftId\\\":\\\"bc95b8cb-04d4-4823-aa37-a9b1a1212cb6\\\",\\\"GrpId\\\":89119,\\\"Pack\\\":1,\\\"Pick\\\":1}\"}"}"#;
    const LEGACY_PICK: &str = r#"[UnityCrossThreadLogger]==> Draft.MakeHumanDraftPick {"jsonrpc":"2.0","method":"Draft.MakeHumanDraftPick","params":{},"request":"{\"params\":{\"draftId\":\"3c3b\",\"cardIds\":[\"70012\",\"70013\"],\"packNumber\":\"2\",\"pickNumber\":\"3\"}}"}"#;
    const QUICK_PACK_P1P9: &str = r#"{"CurrentModule":"BotDraft","Payload":"{\"Result\":\"Success\",\"EventName\":\"QuickDraft_DMU_20240507\",\"DraftStatus\":\"PickNext\",\"PackNumber\":0,\"PickNumber\":8,\"DraftPack\":[\"82083\",\"82196\",\"82129\",\"82170\",\"82059\",\"82160\"],\"PackStyles\":[],\"PickedCards\":[\"82091\",\"82140\",\"82065\",\"82124\",\"82303\",\"82123\",\"82249\",\"82309\"],\"PickedStyles\":[]}","DTO_InventoryInfo":{"SeqId":14,"Changes":[],"Gems":2300}}"#;
    const QUICK_PICK_LINE: &str = r#"[UnityCrossThreadLogger]==> BotDraft_DraftPick {"id":"a4bc9a1c-8b5a-4939-85f8-d2eb524b5069","request":"{\"EventName\":\"QuickDraft_DMU_20240507\",\"PickInfo\":{\"EventName\":\"QuickDraft_DMU_20240507\",\"CardId\":\"82091\",\"PackNumber\":0,\"PickNumber\":0}}"}"#;

    fn ids(cards: &[&str]) -> Vec<CardId> {
        cards.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_p1p1_accepts_only_first_pick() {
        let obs = Extractor::Pack(&PREMIER_P1P1).extract(OTJ_P1P1, "").unwrap().unwrap();
        match obs {
            Observation::Pack {
                coordinate,
                cards,
                first_pick,
                ..
            } => {
                assert_eq!(coordinate, PackCoordinate::new(1, 1));
                assert_eq!(cards.len(), 14);
                assert_eq!(cards[0], "90734");
                assert!(first_pick);
            }
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(
            Extractor::Pack(&PREMIER_P1P1).extract(OTJ_P1P2_BUSINESS, "").unwrap(),
            None
        );
    }

    #[test]
    fn test_single_card_pack() {
        for schema in [&PREMIER_PACK_V1, &PREMIER_PACK_V2] {
            let obs = Extractor::Pack(schema).extract(OTJ_P3P14_NOTIFY, "").unwrap();
            assert_eq!(
                obs,
                Some(Observation::Pack {
                    coordinate: PackCoordinate::new(3, 14),
                    cards: ids(&["90625"]),
                    first_pick: false,
                    picked: Vec::new(),
                })
            );
        }
    }

    #[test]
    fn test_pick_lines() {
        let obs = Extractor::Pick(&PREMIER_PICK_V1).extract(MKM_PICK, "").unwrap();
        assert_eq!(
            obs,
            Some(Observation::Pick {
                coordinate: PackCoordinate::new(1, 1),
                cards: ids(&["89119"]),
            })
        );

        let obs = Extractor::Pick(&PREMIER_PICK_V2).extract(LEGACY_PICK, "").unwrap();
        assert_eq!(
            obs,
            Some(Observation::Pick {
                coordinate: PackCoordinate::new(2, 3),
                cards: ids(&["70012", "70013"]),
            })
        );

        let obs = Extractor::Pick(&QUICK_PICK).extract(QUICK_PICK_LINE, "").unwrap();
        assert_eq!(
            obs,
            Some(Observation::Pick {
                coordinate: PackCoordinate::new(1, 1),
                cards: ids(&["82091"]),
            })
        );
    }

    #[test]
    fn test_quick_pack_is_zero_based_and_carries_picks() {
        let obs = Extractor::Pack(&QUICK_PACK).extract(QUICK_PACK_P1P9, "").unwrap().unwrap();
        match obs {
            Observation::Pack {
                coordinate, picked, cards, ..
            } => {
                assert_eq!(coordinate, PackCoordinate::new(1, 9));
                assert_eq!(cards.len(), 6);
                assert_eq!(picked.len(), 8);
            }
            other => panic!("unexpected {:?}", other),
        }

        let waiting = QUICK_PACK_P1P9.replace("PickNext", "Completed");
        assert_eq!(Extractor::Pack(&QUICK_PACK).extract(&waiting, "").unwrap(), None);
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        let line = "[UnityCrossThreadLogger]Draft.Notify {\"draftId\":\"x\",\"SelfPick\":2,";
        assert!(matches!(
            Extractor::Pack(&PREMIER_PACK_V1).extract(line, ""),
            Err(ScanError::Json(_))
        ));

        let line = "[UnityCrossThreadLogger]Draft.Notify {\"draftId\":\"x\",\"SelfPick\":2,\"PackCards\":\"1\"}";
        assert!(matches!(
            Extractor::Pack(&PREMIER_PACK_V1).extract(line, ""),
            Err(ScanError::MissingField("SelfPack"))
        ));

        assert_eq!(
            Extractor::Pick(&PREMIER_PICK_V1).extract("unrelated line", "").unwrap(),
            None
        );
    }

    #[test]
    fn test_out_of_range_numbers_are_rejected() {
        let huge = QUICK_PACK_P1P9.replace(r#"\"PackNumber\":0"#, r#"\"PackNumber\":4294967295"#);
        assert_ne!(huge, QUICK_PACK_P1P9);
        assert!(matches!(
            Extractor::Pack(&QUICK_PACK).extract(&huge, ""),
            Err(ScanError::InvalidField { field: "PackNumber", .. })
        ));

        let huge = QUICK_PICK_LINE.replace(r#"\"PickNumber\":0"#, r#"\"PickNumber\":4294967295"#);
        assert!(matches!(
            Extractor::Pick(&QUICK_PICK).extract(&huge, ""),
            Err(ScanError::InvalidField { field: "PickNumber", .. })
        ));

        let course = r#"<== Event_Join {"Course":{"InternalEventName":"Sealed_OTJ_20240416","CardPool":[{"id":90734,"quantity":4000000000}]}}"#;
        assert!(matches!(
            Extractor::SealedPool.extract(course, "Sealed_OTJ_20240416"),
            Err(ScanError::InvalidField { field: "quantity", .. })
        ));
    }

    #[test]
    fn test_sealed_pool_variants() {
        let courses = r#"<== Event_GetCoursesV2 {"Courses":[{"InternalEventName":"Sealed_OTJ_20240416","CardPool":[90734,90734,90584]},{"InternalEventName":"Other","CardPool":[1]}]}"#;
        assert_eq!(
            Extractor::SealedPool.extract(courses, "Sealed_OTJ_20240416").unwrap(),
            Some(Observation::Pool(ids(&["90734", "90734", "90584"])))
        );

        let course = r#"<== Event_Join {"Course":{"InternalEventName":"Sealed_OTJ_20240416","CardPool":[{"id":90734,"quantity":2},"90584"]}}"#;
        assert_eq!(
            Extractor::SealedPool.extract(course, "Sealed_OTJ_20240416").unwrap(),
            Some(Observation::Pool(ids(&["90734", "90734", "90584"])))
        );

        assert_eq!(Extractor::SealedPool.extract(course, "Sealed_MKM_20240206").unwrap(), None);
        assert_eq!(Extractor::SealedPool.extract(course, "").unwrap(), None);
    }

    #[test]
    fn test_dispatch_plans() {
        let plan = DispatchPlan::for_format(FormatKind::Quick);
        assert!(!plan.uses_ocr);
        assert_eq!(plan.channels[0].kind, ChannelKind::Pick);
        assert_eq!(plan.channels[1].kind, ChannelKind::Pack);

        let plan = DispatchPlan::for_format(FormatKind::PremierV1);
        assert!(plan.uses_ocr);
        let names: Vec<&str> = plan.channels[0].extractors.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["premier_p1p1", "premier_pack_v1"]);
        assert_eq!(plan.channels[1].extractors[0].name(), "premier_pick_v1");

        let plan = DispatchPlan::for_format(FormatKind::PremierV2);
        assert!(plan.uses_ocr);
        assert_eq!(plan.channels.len(), 2);
        assert_eq!(plan.channels[0].kind, ChannelKind::Pack);
        let names: Vec<&str> = plan.channels[0].extractors.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["premier_p1p1", "premier_pack_v2"]);
        assert_eq!(plan.channels[1].kind, ChannelKind::Pick);
        assert_eq!(plan.channels[1].extractors[0].name(), "premier_pick_v2");

        let plan = DispatchPlan::for_format(FormatKind::Traditional);
        let names: Vec<&str> = plan.channels[0].extractors.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["premier_p1p1", "premier_pack_v1"]);

        let plan = DispatchPlan::for_format(FormatKind::SealedTraditional);
        assert_eq!(plan.channels.len(), 1);
        assert_eq!(plan.channels[0].extractors[0].name(), "sealed_pool");
    }
}
