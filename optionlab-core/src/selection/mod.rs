//! Contract selection — which strike and which expiration to trade.

pub mod dte;
pub mod strikes;

pub use dte::{near_far_dtes, select_dte, target_dte, DteSelector};
pub use strikes::StrikeSelector;
