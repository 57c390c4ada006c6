use tracing::{trace, warn};

use crate::error::Result;
use crate::topology::{MeshStore, PointId};

use super::MergePolicy;

/// Collapses `second` into `first` so that both become one shared point.
///
/// Every slot that referenced `second` is rewritten to `first`, the owner
/// sets are united, and `second` is destroyed. The surviving position is
/// chosen by the [`MergePolicy`].
pub struct MergePoints {
    first: PointId,
    second: PointId,
    policy: MergePolicy,
}

impl MergePoints {
    /// Creates a new `MergePoints` operation using [`MergePolicy::Interpolate`].
    #[must_use]
    pub fn new(first: PointId, second: PointId) -> Self {
        Self {
            first,
            second,
            policy: MergePolicy::default(),
        }
    }

    /// Sets how the merged position is chosen.
    #[must_use]
    pub fn with_policy(mut self, policy: MergePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Executes the merge.
    ///
    /// Merging a point with itself is a no-op; merging an anchor is refused.
    ///
    /// # Errors
    ///
    /// Returns an error if either point, or an owner of `second`, is not in
    /// the store. The store is unchanged in that case.
    pub fn execute(&self, store: &mut MeshStore) -> Result<()> {
        let (first, second) = (self.first, self.second);
        if first == second {
            trace!(?first, "merge of a point with itself ignored");
            return Ok(());
        }
        if store.is_anchor(first) || store.is_anchor(second) {
            warn!(?first, ?second, "anchor points cannot be merged");
            return Ok(());
        }

        store.point(first)?;
        for &owner in &store.point(second)?.owners {
            store.patch(owner)?;
        }

        let absorbed = store.remove_point(second)?;
        for &owner in &absorbed.owners {
            store.patch_mut(owner)?.replace_point(second, first);
        }
        let target = store.point_mut(first)?;
        target.position = self.policy.resolve(&target.position, &absorbed.position);
        target.owners.extend(absorbed.owners);
        Ok(())
    }
}
