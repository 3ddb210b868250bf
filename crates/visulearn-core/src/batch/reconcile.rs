//! Fitting a planned unit list to the requested size.

use crate::batch::types::UnitDescriptor;
use tracing::{info, warn};

/// Returns exactly `target` descriptors.
///
/// Extra descriptors are dropped from the tail; a shortfall is filled at the
/// tail with `filler(id)`. Ids are then renumbered `1..=target` in order.
pub fn reconcile_units<F>(mut descriptors: Vec<UnitDescriptor>, target: usize, mut filler: F) -> Vec<UnitDescriptor>
where
    F: FnMut(u32) -> UnitDescriptor,
{
    let received = descriptors.len();

    if received > target {
        warn!(expected = target, received, "Plan has too many units, truncating");
        descriptors.truncate(target);
    } else if received < target {
        warn!(expected = target, received, "Plan has too few units, padding");
        let missing = target - received;
        descriptors.extend((received + 1..=target).map(|id| filler(id as u32)));
        info!(added = missing, "Added filler units");
    }

    for (index, descriptor) in descriptors.iter_mut().enumerate() {
        descriptor.id = index as u32 + 1;
    }

    descriptors
}
