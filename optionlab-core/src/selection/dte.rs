//! Expiration selection.
//!
//! A heuristic target is computed per strategy family, then snapped to the
//! nearest expiration the chain actually lists.

use tracing::debug;

use crate::domain::{ChainError, DteProfile, OptionChain, TrendStrength};

/// Near leg of a time spread aims for roughly three weeks.
pub const NEAR_LEG_TARGET: u32 = 21;
/// Far leg aims for roughly six weeks.
pub const FAR_LEG_TARGET: u32 = 45;
/// The far leg must expire more than this many days after the near leg.
pub const MIN_LEG_SEPARATION: u32 = 14;
/// Far DTE assumed when no listed expiration is far enough out.
pub const FALLBACK_LEG_SEPARATION: u32 = 30;

/// Ideal days-to-expiration before snapping.
pub fn target_dte(profile: DteProfile, iv_rank: f64, strength: TrendStrength) -> u32 {
    match profile {
        // Richest premium decays fastest: go shorter as IV rank climbs.
        DteProfile::PremiumSelling => {
            if iv_rank > 70.0 {
                7
            } else if iv_rank > 50.0 {
                14
            } else {
                21
            }
        }
        // Cheap options in a clean trend get time to develop.
        DteProfile::LongPremium => {
            if iv_rank < 30.0 && strength == TrendStrength::VeryStrong {
                45
            } else if iv_rank < 40.0 {
                30
            } else {
                21
            }
        }
        DteProfile::Vertical => {
            if strength == TrendStrength::VeryStrong {
                30
            } else {
                21
            }
        }
        DteProfile::Standard => 30,
    }
}

/// Nearest listed value to `target`; the shorter expiration wins ties.
///
/// `available` must be sorted ascending.
pub fn snap(available: &[u32], target: u32) -> Option<u32> {
    let mut best: Option<u32> = None;
    for &dte in available {
        match best {
            Some(b) if dte.abs_diff(target) >= b.abs_diff(target) => {}
            _ => best = Some(dte),
        }
    }
    best
}

/// Snap the heuristic target to an available expiration.
pub fn select_dte(
    available: &[u32],
    profile: DteProfile,
    iv_rank: f64,
    strength: TrendStrength,
) -> Result<u32, ChainError> {
    let target = target_dte(profile, iv_rank, strength);
    let dte = snap(available, target).ok_or(ChainError::EmptyChain)?;
    debug!(?profile, iv_rank, %strength, target, dte, "expiration selected");
    Ok(dte)
}

/// Near and far expirations for calendar and diagonal spreads.
///
/// The far leg is the listed expiration closest to six weeks among those more
/// than two weeks beyond the near leg. When none qualifies the far leg is
/// `near + 30`, which may not be listed; pricing then reports the missing
/// contract.
pub fn near_far_dtes(available: &[u32]) -> Result<(u32, u32), ChainError> {
    let near = snap(available, NEAR_LEG_TARGET).ok_or(ChainError::EmptyChain)?;
    let later: Vec<u32> = available
        .iter()
        .copied()
        .filter(|d| *d > near + MIN_LEG_SEPARATION)
        .collect();
    let far = snap(&later, FAR_LEG_TARGET).unwrap_or(near + FALLBACK_LEG_SEPARATION);
    debug!(near, far, "time spread expirations selected");
    Ok((near, far))
}

/// Expiration selection bound to one chain snapshot.
#[derive(Debug, Clone)]
pub struct DteSelector {
    available: Vec<u32>,
}

impl DteSelector {
    pub fn new(chain: &OptionChain) -> Self {
        Self {
            available: chain.available_dtes(),
        }
    }

    pub fn from_available(mut available: Vec<u32>) -> Self {
        available.sort_unstable();
        available.dedup();
        Self { available }
    }

    pub fn available(&self) -> &[u32] {
        &self.available
    }

    pub fn select(
        &self,
        profile: DteProfile,
        iv_rank: f64,
        strength: TrendStrength,
    ) -> Result<u32, ChainError> {
        select_dte(&self.available, profile, iv_rank, strength)
    }

    pub fn near_far(&self) -> Result<(u32, u32), ChainError> {
        near_far_dtes(&self.available)
    }
}
