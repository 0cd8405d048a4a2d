//! Practice target domain model.
//!
//! A target is one addressable practice scenario: a tower, a side, and either
//! a rotation (practice-map family) or a numeric O-level (leniency family).
//! Targets are identified by a canonical pipe-separated key.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Tower name used by the 1/8 practice targets.
pub const ONE_EIGHT_TOWER: &str = "1/8";

/// Towers shipped with the practice map.
pub const PRACTICE_MAP_TOWERS: [&str; 10] = [
    "Small Boy",
    "Small Cage",
    "Tall Cage",
    "M-85",
    "M-88",
    "M-91",
    "T-94",
    "T-97",
    "T-100",
    "Tall Boy",
];

/// Errors raised while parsing or building a target key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetKeyError {
    #[error("target key is empty")]
    Empty,

    #[error("expected 4 '|'-separated segments, found {0}")]
    WrongSegmentCount(usize),

    #[error("unknown target kind '{0}', expected one of: mpk, tower, one_eight")]
    UnknownKind(String),

    #[error("tower name cannot be empty")]
    EmptyTower,

    #[error("tower name '{0}' cannot contain '|'")]
    InvalidTower(String),

    #[error("invalid side '{0}', expected Front or Back")]
    InvalidSide(String),

    #[error("invalid rotation '{0}', expected CW or CCW")]
    InvalidRotation(String),

    #[error("invalid level '{0}', expected an integer")]
    InvalidLevel(String),

    #[error("one_eight targets must use tower '1/8', found '{0}'")]
    InvalidOneEightTower(String),
}

/// Errors raised while building a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("duplicate target key in catalog: {0}")]
    DuplicateKey(String),

    #[error("catalog mixes target families: {first} and {second}")]
    MixedFamilies { first: String, second: String },
}

/// Kind of practice target, the first key segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// Tower practiced at a fixed O-level
    Mpk,
    /// Practice-map tower with a rotation
    Tower,
    /// 1/8 setup with a rotation
    OneEight,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mpk => "mpk",
            Self::Tower => "tower",
            Self::OneEight => "one_eight",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "mpk" => Some(Self::Mpk),
            "tower" => Some(Self::Tower),
            "one_eight" => Some(Self::OneEight),
            _ => None,
        }
    }

    pub fn family(&self) -> TargetFamily {
        match self {
            Self::Mpk => TargetFamily::Level,
            Self::Tower | Self::OneEight => TargetFamily::Rotation,
        }
    }
}

/// Key family. A catalog only ever holds one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetFamily {
    Level,
    Rotation,
}

impl TargetFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Level => "level",
            Self::Rotation => "rotation",
        }
    }
}

/// Side of the tower the player starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    Front,
    Back,
}

impl Side {
    pub const ALL: [Self; 2] = [Self::Front, Self::Back];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Front => "Front",
            Self::Back => "Back",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "front" => Some(Self::Front),
            "back" => Some(Self::Back),
            _ => None,
        }
    }
}

/// Dragon rotation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rotation {
    #[serde(rename = "CW")]
    Cw,
    #[serde(rename = "CCW")]
    Ccw,
}

impl Rotation {
    pub const ALL: [Self; 2] = [Self::Cw, Self::Ccw];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cw => "CW",
            Self::Ccw => "CCW",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cw" => Some(Self::Cw),
            "ccw" => Some(Self::Ccw),
            _ => None,
        }
    }
}

/// Last key segment: an O-level or a rotation depending on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetVariant {
    Level(i32),
    Rotation(Rotation),
}

impl fmt::Display for TargetVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Level(level) => write!(f, "{level}"),
            Self::Rotation(rotation) => f.write_str(rotation.as_str()),
        }
    }
}

/// Canonical, validated target key.
///
/// Equality, ordering and hashing all go through the canonical string, so two
/// keys parsed from differently-cased input compare equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TargetKey {
    kind: TargetKind,
    tower: String,
    side: Side,
    variant: TargetVariant,
    canonical: String,
}

impl TargetKey {
    /// Parse a key such as `tower|T-100|back|ccw` into its canonical form.
    pub fn parse(raw: &str) -> Result<Self, TargetKeyError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(TargetKeyError::Empty);
        }

        let parts: Vec<&str> = raw.split('|').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(TargetKeyError::WrongSegmentCount(parts.len()));
        }

        let kind = TargetKind::from_str(parts[0])
            .ok_or_else(|| TargetKeyError::UnknownKind(parts[0].to_string()))?;
        let side =
            Side::from_str(parts[2]).ok_or_else(|| TargetKeyError::InvalidSide(parts[2].to_string()))?;

        match kind {
            TargetKind::Mpk => {
                let level = parts[3]
                    .parse::<i32>()
                    .map_err(|_| TargetKeyError::InvalidLevel(parts[3].to_string()))?;
                Self::mpk(parts[1], side, level)
            }
            TargetKind::Tower => {
                let rotation = Rotation::from_str(parts[3])
                    .ok_or_else(|| TargetKeyError::InvalidRotation(parts[3].to_string()))?;
                Self::tower(parts[1], side, rotation)
            }
            TargetKind::OneEight => {
                if parts[1] != ONE_EIGHT_TOWER {
                    return Err(TargetKeyError::InvalidOneEightTower(parts[1].to_string()));
                }
                let rotation = Rotation::from_str(parts[3])
                    .ok_or_else(|| TargetKeyError::InvalidRotation(parts[3].to_string()))?;
                Ok(Self::one_eight(side, rotation))
            }
        }
    }

    /// Level-family key for a tower practiced at an O-level.
    pub fn mpk(tower: &str, side: Side, level: i32) -> Result<Self, TargetKeyError> {
        let tower = validate_tower(tower)?;
        Ok(Self::build(TargetKind::Mpk, tower, side, TargetVariant::Level(level)))
    }

    /// Rotation-family key for a practice-map tower.
    pub fn tower(tower: &str, side: Side, rotation: Rotation) -> Result<Self, TargetKeyError> {
        let tower = validate_tower(tower)?;
        Ok(Self::build(TargetKind::Tower, tower, side, TargetVariant::Rotation(rotation)))
    }

    /// Rotation-family key for the 1/8 setup.
    pub fn one_eight(side: Side, rotation: Rotation) -> Self {
        Self::build(
            TargetKind::OneEight,
            ONE_EIGHT_TOWER.to_string(),
            side,
            TargetVariant::Rotation(rotation),
        )
    }

    fn build(kind: TargetKind, tower: String, side: Side, variant: TargetVariant) -> Self {
        let canonical = format!("{}|{}|{}|{}", kind.as_str(), tower, side.as_str(), variant);
        Self { kind, tower, side, variant, canonical }
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn family(&self) -> TargetFamily {
        self.kind.family()
    }

    pub fn tower_name(&self) -> &str {
        &self.tower
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn variant(&self) -> TargetVariant {
        self.variant
    }

    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// Human-readable label, e.g. `T-100 Back CCW` or `M-85 Front O3`.
    pub fn label(&self) -> String {
        match self.variant {
            TargetVariant::Level(level) => format!("{} {} O{}", self.tower, self.side.as_str(), level),
            TargetVariant::Rotation(rotation) => {
                format!("{} {} {}", self.tower, self.side.as_str(), rotation.as_str())
            }
        }
    }

    /// Practice-map chat command that loads this target, when one exists.
    pub fn load_command(&self) -> Option<String> {
        let TargetVariant::Rotation(rotation) = self.variant else {
            return None;
        };
        let side = self.side.as_str().to_lowercase();
        let rotation = rotation.as_str().to_lowercase();
        let slug = match self.kind {
            TargetKind::Tower => slug_tower(&self.tower),
            TargetKind::OneEight => "one_eight".to_string(),
            TargetKind::Mpk => return None,
        };
        Some(format!("/function practice:zdash/set/{slug}_{side}_{rotation}"))
    }
}

fn validate_tower(tower: &str) -> Result<String, TargetKeyError> {
    let tower = tower.trim();
    if tower.is_empty() {
        return Err(TargetKeyError::EmptyTower);
    }
    if tower.contains('|') {
        return Err(TargetKeyError::InvalidTower(tower.to_string()));
    }
    Ok(tower.to_string())
}

/// Lowercase a tower name and collapse runs of non-alphanumerics to `_`.
pub fn slug_tower(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut prev_underscore = false;
    for ch in name.to_lowercase().chars() {
        if ch.is_alphanumeric() {
            slug.push(ch);
            prev_underscore = false;
        } else if !prev_underscore {
            slug.push('_');
            prev_underscore = true;
        }
    }
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        "tower".to_string()
    } else {
        slug.to_string()
    }
}

impl PartialEq for TargetKey {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for TargetKey {}

impl Hash for TargetKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl PartialOrd for TargetKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TargetKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl std::str::FromStr for TargetKey {
    type Err = TargetKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TargetKey {
    type Error = TargetKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TargetKey> for String {
    fn from(key: TargetKey) -> Self {
        key.canonical
    }
}

/// A catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub key: TargetKey,
    pub label: String,
    /// Eligibility score; for level targets the maximum over standing heights
    pub leniency: Option<f64>,
    /// Leniency keyed by standing height (level family only)
    #[serde(default)]
    pub leniency_by_standing_height: BTreeMap<i32, f64>,
    /// World seeds the loader can inject for this target
    #[serde(default)]
    pub seeds: Vec<i64>,
}

impl Target {
    pub fn new(key: TargetKey) -> Self {
        Self {
            label: key.label(),
            key,
            leniency: None,
            leniency_by_standing_height: BTreeMap::new(),
            seeds: Vec::new(),
        }
    }

    pub fn with_leniency(mut self, leniency: f64) -> Self {
        self.leniency = Some(leniency);
        self
    }

    pub fn with_seeds(mut self, seeds: Vec<i64>) -> Self {
        self.seeds = seeds;
        self
    }

    /// Record a standing-height leniency and keep `leniency` at the maximum.
    pub fn add_standing_height(&mut self, standing_height: i32, leniency: f64) {
        self.leniency_by_standing_height.insert(standing_height, leniency);
        self.leniency = Some(self.leniency.map_or(leniency, |current| current.max(leniency)));
    }
}

/// Finite set of practice targets with unique keys.
#[derive(Debug, Clone, Default)]
pub struct TargetCatalog {
    targets: BTreeMap<TargetKey, Target>,
}

impl TargetCatalog {
    /// Build a catalog, rejecting duplicate keys and mixed families.
    pub fn new(targets: impl IntoIterator<Item = Target>) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        let mut family: Option<(TargetFamily, String)> = None;

        for target in targets {
            match &family {
                None => family = Some((target.key.family(), target.key.to_string())),
                Some((existing, first)) if *existing != target.key.family() => {
                    return Err(CatalogError::MixedFamilies {
                        first: first.clone(),
                        second: target.key.to_string(),
                    });
                }
                Some(_) => {}
            }

            if map.contains_key(&target.key) {
                return Err(CatalogError::DuplicateKey(target.key.to_string()));
            }
            map.insert(target.key.clone(), target);
        }

        Ok(Self { targets: map })
    }

    /// The practice-map catalog: every tower and the 1/8 setup on both sides
    /// and both rotations.
    pub fn practice_map() -> Self {
        let mut targets = BTreeMap::new();
        for tower in PRACTICE_MAP_TOWERS {
            for side in Side::ALL {
                for rotation in Rotation::ALL {
                    let key = TargetKey::build(
                        TargetKind::Tower,
                        tower.to_string(),
                        side,
                        TargetVariant::Rotation(rotation),
                    );
                    targets.insert(key.clone(), Target::new(key));
                }
            }
        }
        for side in Side::ALL {
            for rotation in Rotation::ALL {
                let key = TargetKey::one_eight(side, rotation);
                targets.insert(key.clone(), Target::new(key));
            }
        }
        Self { targets }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn get(&self, key: &TargetKey) -> Option<&Target> {
        self.targets.get(key)
    }

    pub fn contains(&self, key: &TargetKey) -> bool {
        self.targets.contains_key(key)
    }

    /// Targets in canonical key order.
    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.values()
    }

    pub fn family(&self) -> Option<TargetFamily> {
        self.targets.keys().next().map(TargetKey::family)
    }

    /// Distinct tower names in the catalog.
    pub fn towers(&self) -> BTreeSet<String> {
        self.targets.keys().map(|k| k.tower_name().to_string()).collect()
    }
}
