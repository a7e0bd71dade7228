use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::{DrillCatalog, Tier};
use crate::store::{SessionHistory, StoreError, UserId};

// --- Tier Status ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TierStatus {
    Locked,
    Available,
    Complete,
}

/// Coverage of one tier for one user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TierProgress {
    pub tier: Tier,
    pub completed: usize,
    pub total: usize,
    pub status: TierStatus,
}

// --- Progression Gate ---

/// Decides which tiers a user may play from the drill catalog and the
/// session history.
///
/// A tier is covered once every drill in it has at least one session. The
/// unlocked tier is one past the longest run of covered tiers starting at
/// tier 1, capped at the highest tier in the catalog. Tiers without drills
/// are skipped. Nothing is cached: every call reads both sources again.
pub struct ProgressionGate<'a, C: ?Sized, H: ?Sized> {
    catalog: &'a C,
    history: &'a H,
}

impl<'a, C, H> ProgressionGate<'a, C, H>
where
    C: DrillCatalog + ?Sized,
    H: SessionHistory + ?Sized,
{
    pub fn new(catalog: &'a C, history: &'a H) -> Self {
        Self { catalog, history }
    }

    /// Highest tier `user` may attempt.
    ///
    /// Storage failures are logged and never unlock more than was proven
    /// before the failure.
    pub fn unlocked_up_to(&self, user: UserId) -> Tier {
        if !user.is_valid() {
            return Tier::FIRST;
        }
        let max_tier = match self.catalog.max_tier() {
            Ok(tier) => tier,
            Err(e) => {
                warn!(%user, error = %e, "drill catalog unavailable, only tier 1 unlocked");
                return Tier::FIRST;
            }
        };

        let mut unlocked = Tier::FIRST;
        for tier in max_tier.up_to() {
            let drills = match self.catalog.drill_ids_in_tier(tier) {
                Ok(ids) => ids,
                Err(e) => {
                    warn!(%user, %tier, %unlocked, error = %e, "drill catalog query failed");
                    return unlocked;
                }
            };
            if drills.is_empty() {
                continue;
            }

            let completed = match self.history.distinct_completed_drills(user, &drills) {
                Ok(n) => n,
                Err(e) => {
                    warn!(%user, %tier, %unlocked, error = %e, "session history query failed");
                    return unlocked;
                }
            };

            if completed >= drills.len() {
                unlocked = tier.next().min(max_tier);
            } else {
                break;
            }
        }

        debug!(%user, %unlocked, "computed unlocked tier");
        unlocked
    }

    /// Per-tier coverage for display, from tier 1 to the catalog's highest tier.
    ///
    /// Unlike `unlocked_up_to`, storage failures are returned to the caller.
    pub fn tier_overview(&self, user: UserId) -> Result<Vec<TierProgress>, StoreError> {
        let max_tier = self.catalog.max_tier()?;
        let unlocked = self.unlocked_up_to(user);

        let mut overview = Vec::new();
        for tier in max_tier.up_to() {
            let drills = self.catalog.drill_ids_in_tier(tier)?;
            let total = drills.len();
            let completed = if user.is_valid() {
                self.history.distinct_completed_drills(user, &drills)?
            } else {
                0
            };
            let status = if tier > unlocked {
                TierStatus::Locked
            } else if total > 0 && completed >= total {
                TierStatus::Complete
            } else {
                TierStatus::Available
            };
            overview.push(TierProgress {
                tier,
                completed,
                total,
                status,
            });
        }
        Ok(overview)
    }
}
