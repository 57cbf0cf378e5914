use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManaColor {
    White,
    Blue,
    Black,
    Red,
    Green,
}

impl ManaColor {
    fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'W' => Some(ManaColor::White),
            'U' => Some(ManaColor::Blue),
            'B' => Some(ManaColor::Black),
            'R' => Some(ManaColor::Red),
            'G' => Some(ManaColor::Green),
            _ => None,
        }
    }

    fn symbol(&self) -> char {
        match self {
            ManaColor::White => 'W',
            ManaColor::Blue => 'U',
            ManaColor::Black => 'B',
            ManaColor::Red => 'R',
            ManaColor::Green => 'G',
        }
    }
}

/// Mana cost as written in the set file (`{2}{W}{U/B}`), with the colours it contains.
#[derive(Debug, Clone, Default)]
pub struct ManaCost {
    pub text: String,
    pub colors: Vec<ManaColor>,
}

impl ManaCost {
    pub fn parse(text: &str) -> Self {
        let mut colors = Vec::new();
        for symbol in text
            .split(|c| c == '{' || c == '}' || c == '/')
            .filter(|s| s.len() == 1)
            .filter_map(|s| s.chars().next())
            .filter_map(ManaColor::from_symbol)
        {
            if !colors.contains(&symbol) {
                colors.push(symbol);
            }
        }

        ManaCost {
            text: text.to_string(),
            colors,
        }
    }
}

impl<'de> Deserialize<'de> for ManaCost {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        Ok(ManaCost::parse(&s))
    }
}

impl Display for ManaCost {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let colors: String = self.colors.iter().map(|c| c.symbol()).collect();
        write!(f, "{}", colors)
    }
}

#[derive(Debug, Clone, Deserialize, PartialOrd, Ord, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CardRarity {
    Mythic,
    Rare,
    Uncommon,
    Common,
    Special,
    #[default]
    #[serde(other)]
    None,
}

impl Display for CardRarity {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            CardRarity::Mythic => write!(f, "{:^10}", "Mythic"),
            CardRarity::Rare => write!(f, "{:^10}", "Rare"),
            CardRarity::Uncommon => write!(f, "{:^10}", "Uncommon"),
            CardRarity::Common => write!(f, "{:^10}", "Common"),
            CardRarity::Special => write!(f, "{:^10}", "Special"),
            CardRarity::None => write!(f, "{:^10}", "None"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Card {
    pub name: String,
    #[serde(default)]
    pub mana_cost: ManaCost,
    #[serde(default)]
    pub cmc: u32,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub rarity: CardRarity,
}

impl Card {
    /// Stand-in record for an identifier the dataset does not know.
    pub fn unknown(id: &str) -> Self {
        Card {
            name: id.to_string(),
            mana_cost: ManaCost::default(),
            cmc: 0,
            types: Vec::new(),
            rarity: CardRarity::None,
        }
    }

    pub fn to_text(&self) -> String {
        format!("[{}] {:<5} {}", self.rarity, self.mana_cost, self.name)
    }
}
