use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RomExchangeError;

// ---------------------------------------------------------------------------
// Sort enums - serialized exactly as the API expects them
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sort {
    #[default]
    Change,
    Diff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Server {
    #[default]
    Both,
    Global,
    #[serde(rename = "SEA")]
    Sea,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Range {
    All,
    Month,
    #[default]
    Week,
}

macro_rules! api_enum_str {
    ($ty:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $s,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = RomExchangeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok($ty::$variant),)+
                    other => Err(RomExchangeError::InvalidArgument(format!(
                        "Unknown {} value: {}",
                        stringify!($ty),
                        other
                    ))),
                }
            }
        }
    };
}

api_enum_str!(Sort { Change => "Change", Diff => "Diff" });
api_enum_str!(Direction { Asc => "Asc", Desc => "Desc" });
api_enum_str!(Server { Both => "Both", Global => "Global", Sea => "SEA" });
api_enum_str!(Range { All => "All", Month => "Month", Week => "Week" });

impl Server {
    /// Regions shown for this selection, global first.
    pub fn regions(&self) -> &'static [Server] {
        match self {
            Server::Both => &[Server::Global, Server::Sea],
            Server::Global => &[Server::Global],
            Server::Sea => &[Server::Sea],
        }
    }
}

// ---------------------------------------------------------------------------
// ItemType - Category code
// ---------------------------------------------------------------------------

/// Item category code as used by the `type` query parameter. `0` means all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemType(pub u32);

const ITEM_TYPE_NAMES: &[&str] = &[
    "All",
    "Weapon",
    "Off-hand",
    "Armor",
    "Garments",
    "Footgear",
    "Accessory",
    "Blueprint",
    "Potion / Effect",
    "Refine",
    "Scroll / Album",
    "Material",
    "Holiday Material",
    "Pet Material",
    "Premium",
    "Costume",
    "Head",
    "Face",
    "Back",
    "Mouth",
    "Tail",
    "Weapon Card",
    "Off-hand Card",
    "Armor Card",
    "Garments Card",
    "Shoe Card",
    "Accessory Card",
    "Headwear Card",
];

impl ItemType {
    pub const ALL: ItemType = ItemType(0);
    pub const POTION: ItemType = ItemType(8);

    pub fn is_all(&self) -> bool {
        self.0 == 0
    }

    /// Known display name for this code, if any.
    pub fn name(&self) -> Option<&'static str> {
        ITEM_TYPE_NAMES.get(self.0 as usize).copied()
    }

    /// Every known category, `All` first.
    pub fn known() -> impl Iterator<Item = ItemType> {
        (0..ITEM_TYPE_NAMES.len() as u32).map(ItemType)
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Type {}", self.0),
        }
    }
}

// ---------------------------------------------------------------------------
// SortOptions / QueryOptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortOptions {
    pub sort: Sort,
    pub direction: Direction,
    pub server: Server,
    pub range: Range,
}

/// Full description of one `/api` request.
///
/// The default is the landing view: no name filter, all types, biggest
/// weekly movers on both servers first, page 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    pub item: String,
    pub exact: bool,
    pub item_type: ItemType,
    pub sort: SortOptions,
    pub page: u32,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            item: String::new(),
            exact: false,
            item_type: ItemType::ALL,
            sort: SortOptions::default(),
            page: 1,
        }
    }
}

impl QueryOptions {
    /// Copy of this query pointed at another page.
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }
}
