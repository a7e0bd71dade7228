use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use icu_normalizer::ComposingNormalizerBorrowed;
use rand::Rng;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::store::StoreError;

#[derive(Embed)]
#[folder = "assets/catalog/"]
struct CatalogAssets;

const BUNDLED_FILE: &str = "drills.json";

// --- Identifiers ---

/// A tier of drills. Tiers start at 1 and higher tiers unlock after lower ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Tier(u32);

impl Tier {
    pub const FIRST: Tier = Tier(1);

    pub fn new(n: u32) -> Option<Self> {
        (n >= 1).then_some(Tier(n))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn next(self) -> Tier {
        Tier(self.0.saturating_add(1))
    }

    /// Tiers `1..=self` in increasing order.
    pub fn up_to(self) -> impl Iterator<Item = Tier> {
        (1..=self.0).map(Tier)
    }
}

impl TryFrom<u32> for Tier {
    type Error = String;

    fn try_from(n: u32) -> Result<Self, Self::Error> {
        Tier::new(n).ok_or_else(|| format!("tier must be at least 1, got {n}"))
    }
}

impl From<Tier> for u32 {
    fn from(tier: Tier) -> u32 {
        tier.0
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrillId(pub u32);

impl fmt::Display for DrillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// --- Drill ---

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drill {
    pub id: DrillId,
    pub title: String,
    pub body: String,
    pub tier: Tier,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    drills: Vec<Drill>,
}

// --- Catalog contract ---

/// Read-only source of tier membership.
pub trait DrillCatalog {
    /// Highest tier with at least one drill, or `Tier::FIRST` for an empty catalog.
    fn max_tier(&self) -> Result<Tier, StoreError>;

    fn drill_ids_in_tier(&self, tier: Tier) -> Result<BTreeSet<DrillId>, StoreError>;
}

// --- In-memory catalog ---

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    // sorted by (tier, id)
    drills: Vec<Drill>,
}

impl Catalog {
    /// Build a catalog, normalizing drill text to NFC.
    ///
    /// Rejects duplicate ids and empty bodies.
    pub fn new(drills: Vec<Drill>) -> Result<Self, StoreError> {
        let nfc = ComposingNormalizerBorrowed::new_nfc();
        let mut seen: HashSet<DrillId> = HashSet::new();
        let mut normalized = Vec::with_capacity(drills.len());

        for mut drill in drills {
            if !seen.insert(drill.id) {
                return Err(StoreError::InvalidCatalog(format!(
                    "duplicate drill id {}",
                    drill.id
                )));
            }
            if drill.body.trim().is_empty() {
                return Err(StoreError::InvalidCatalog(format!(
                    "drill {} has an empty body",
                    drill.id
                )));
            }
            drill.body = nfc.normalize(&drill.body).into_owned();
            normalized.push(drill);
        }

        normalized.sort_by_key(|d| (d.tier, d.id));
        Ok(Self { drills: normalized })
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.drills)
    }

    /// The catalog shipped inside the binary.
    pub fn bundled() -> Result<Self, StoreError> {
        let file = CatalogAssets::get(BUNDLED_FILE).ok_or_else(|| {
            StoreError::InvalidCatalog(format!("bundled {BUNDLED_FILE} is missing"))
        })?;
        let json = std::str::from_utf8(file.data.as_ref())
            .map_err(|e| StoreError::InvalidCatalog(e.to_string()))?;
        Self::from_json(json)
    }

    /// Load drills from `path` when given, else from the user's config dir,
    /// else the bundled set.
    ///
    /// An explicit path must load; a broken file in the config dir is logged
    /// and skipped.
    pub fn load(path: Option<&Path>) -> Result<Self, StoreError> {
        if let Some(path) = path {
            let catalog = Self::from_json(&fs::read_to_string(path)?)?;
            debug!(path = %path.display(), drills = catalog.len(), "loaded drill catalog");
            return Ok(catalog);
        }

        let user_path = Self::user_catalog_path();
        if user_path.exists() {
            match fs::read_to_string(&user_path)
                .map_err(StoreError::from)
                .and_then(|json| Self::from_json(&json))
            {
                Ok(catalog) => {
                    debug!(path = %user_path.display(), drills = catalog.len(), "loaded user drill catalog");
                    return Ok(catalog);
                }
                Err(e) => {
                    warn!(path = %user_path.display(), error = %e, "ignoring unreadable user drill catalog");
                }
            }
        }

        Self::bundled()
    }

    fn user_catalog_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tierdrill")
            .join(BUNDLED_FILE)
    }

    pub fn len(&self) -> usize {
        self.drills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drills.is_empty()
    }

    pub fn drills(&self) -> &[Drill] {
        &self.drills
    }

    pub fn drill(&self, id: DrillId) -> Option<&Drill> {
        self.drills.iter().find(|d| d.id == id)
    }

    pub fn drills_in_tier(&self, tier: Tier) -> impl Iterator<Item = &Drill> {
        self.drills.iter().filter(move |d| d.tier == tier)
    }

    /// Every drill at or below `tier`, ordered by tier then id.
    pub fn drills_up_to(&self, tier: Tier) -> Vec<&Drill> {
        self.drills.iter().filter(|d| d.tier <= tier).collect()
    }

    pub fn random_drill_up_to<R: Rng>(&self, tier: Tier, rng: &mut R) -> Option<&Drill> {
        let candidates = self.drills_up_to(tier);
        if candidates.is_empty() {
            return None;
        }
        Some(candidates[rng.gen_range(0..candidates.len())])
    }
}

impl DrillCatalog for Catalog {
    fn max_tier(&self) -> Result<Tier, StoreError> {
        Ok(self
            .drills
            .iter()
            .map(|d| d.tier)
            .max()
            .unwrap_or(Tier::FIRST))
    }

    fn drill_ids_in_tier(&self, tier: Tier) -> Result<BTreeSet<DrillId>, StoreError> {
        Ok(self.drills_in_tier(tier).map(|d| d.id).collect())
    }
}
