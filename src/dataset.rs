use std::collections::HashMap;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use serde::Deserialize;

use crate::models::card::Card;
use crate::models::draft_data::CardId;
use crate::opt::{log_if, DbgFlg, ErrToStr, Res};

const SET_FILE_SUFFIX: &str = "Data.json";
const USER_GROUP_ALL: &str = "All";
const USER_GROUPS: &[&str] = &["All", "Top", "Middle", "Bottom"];

/// Card catalogue for the active set. The scanner only ever reads from it.
pub trait Dataset: Send {
    fn card(&self, id: &str) -> Option<&Card>;
    fn ids_by_name(&self, names: &[String]) -> Vec<CardId>;
    fn all_names(&self) -> Vec<String>;

    /// Records for the ids, in order. Unknown ids become placeholders when `retrieve_unknown` is set.
    fn cards_by_id(&self, ids: &[CardId], retrieve_unknown: bool) -> Vec<Card> {
        ids.iter()
            .filter_map(|id| match self.card(id) {
                Some(card) => Some(card.clone()),
                None if retrieve_unknown => Some(Card::unknown(id)),
                None => None,
            })
            .collect()
    }
}

#[derive(Deserialize)]
struct SetFile {
    #[serde(default)]
    card_ratings: HashMap<String, Card>,
}

#[derive(Debug, Default)]
pub struct CardDataset {
    cards: HashMap<CardId, Card>,
    ids_by_name: HashMap<String, CardId>,
}

impl CardDataset {
    pub fn from_json(json: &str) -> Res<Self> {
        let file: SetFile = serde_json::from_str(json).err_to_str()?;
        Ok(Self::from_cards(file.card_ratings))
    }

    pub fn from_cards(cards: HashMap<CardId, Card>) -> Self {
        let ids_by_name = cards
            .iter()
            .map(|(id, card)| (card.name.clone(), id.clone()))
            .collect();
        CardDataset { cards, ids_by_name }
    }

    pub fn load(path: &Path) -> Res<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|err| format!("failed to read dataset {}: {}", path.display(), err))?;
        let dataset = Self::from_json(&json)?;
        log_if(
            &format!("Loaded {} cards from {}", dataset.cards.len(), path.display()),
            DbgFlg::Scanner,
        );
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl Dataset for CardDataset {
    fn card(&self, id: &str) -> Option<&Card> {
        self.cards.get(id)
    }

    fn ids_by_name(&self, names: &[String]) -> Vec<CardId> {
        names
            .iter()
            .filter_map(|name| self.ids_by_name.get(name).cloned())
            .collect()
    }

    fn all_names(&self) -> Vec<String> {
        self.cards
            .values()
            .map(|card| card.name.clone())
            .unique()
            .sorted()
            .collect()
    }
}

struct SetFileName<'a> {
    set_code: &'a str,
    format: &'a str,
    group: &'a str,
}

fn parse_set_file_name(file_name: &str) -> Option<SetFileName> {
    let segments: Vec<&str> = file_name.split('_').collect();
    match segments.as_slice() {
        [set_code, format, group, suffix]
            if *suffix == SET_FILE_SUFFIX && USER_GROUPS.contains(group) =>
        {
            Some(SetFileName {
                set_code: *set_code,
                format: *format,
                group: *group,
            })
        }
        _ => None,
    }
}

/// Finds the local `<SET>_<Format>_<Group>_Data.json` file for a set, preferring the
/// session's format and the `All` user group.
pub fn locate_dataset(dir: &Path, set_code: &str, format_label: &str) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let set_code = set_code.to_uppercase();

    entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let file_name = entry.file_name().to_string_lossy().to_string();
            let parsed = parse_set_file_name(&file_name)?;
            if parsed.set_code.to_uppercase() != set_code {
                return None;
            }
            let rank = (parsed.format != format_label, parsed.group != USER_GROUP_ALL);
            Some((rank, file_name, entry.path()))
        })
        .min_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
        .map(|(_, _, path)| path)
}
