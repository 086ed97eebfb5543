use std::collections::HashSet;

use tracing::error;

use super::{PolylineKnife, RejectReason};
use crate::math::Point2;
use crate::operations::query::RayCast;
use crate::operations::region::{RegionAction, SelectRegion};
use crate::topology::{FaceId, MeshStore};
use crate::viewport::Viewport;

/// Result of picking the face that seeds a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Selected(FaceId),
    /// The ray missed; the seed was cleared.
    Cleared,
    Rejected(RejectReason),
}

/// Result of applying a region action.
#[derive(Debug)]
pub enum RegionOutcome {
    Applied {
        faces: usize,
        /// The copied region, for duplicate and separate.
        extracted: Option<MeshStore>,
    },
    Rejected(RejectReason),
}

impl PolylineKnife {
    /// Picks the region seed face under the cursor.
    pub fn select_seed<V: Viewport + ?Sized>(&mut self, viewport: &V, cursor: &Point2) -> SeedOutcome {
        let Some(plan) = &self.plan else {
            return SeedOutcome::Rejected(RejectReason::NoPlan);
        };
        let hit = match RayCast::new(viewport.cursor_ray(cursor)).execute(&self.store) {
            Ok(hit) => hit,
            Err(err) => {
                error!(%err, "seed selection failed");
                return SeedOutcome::Rejected(RejectReason::Mesh);
            }
        };
        let Some(hit) = hit else {
            self.seed = None;
            return SeedOutcome::Cleared;
        };
        if plan.face_chain.contains(&hit.face) {
            return SeedOutcome::Rejected(RejectReason::InCutChain);
        }
        self.seed = Some(hit.face);
        SeedOutcome::Selected(hit.face)
    }

    /// Faces reachable from the seed without crossing the committed cut.
    ///
    /// Empty before commit, without a seed, or when the cut does not
    /// enclose the seed.
    #[must_use]
    pub fn inner_faces(&self) -> Vec<FaceId> {
        let (Some(seed), Some(result)) = (self.seed, &self.result) else {
            return Vec::new();
        };
        let perimeter: HashSet<_> = result.perimeter.iter().copied().collect();
        SelectRegion::new(seed, &perimeter)
            .with_max_iterations(self.params.region_max_iterations)
            .execute(&self.store)
            .unwrap_or_else(|err| {
                error!(%err, "region selection failed");
                Vec::new()
            })
    }

    /// Applies `action` to the inner faces of the committed cut.
    pub fn apply_region(&mut self, action: RegionAction) -> RegionOutcome {
        if self.result.is_none() {
            return RegionOutcome::Rejected(RejectReason::NotCommitted);
        }
        let faces = self.inner_faces();
        if faces.is_empty() {
            return RegionOutcome::Rejected(RejectReason::NoRegion);
        }
        match action.apply(&mut self.store, &faces) {
            Ok(extracted) => {
                if matches!(action, RegionAction::Separate | RegionAction::Delete) {
                    self.seed = None;
                }
                RegionOutcome::Applied {
                    faces: faces.len(),
                    extracted,
                }
            }
            Err(err) => {
                error!(%err, "region action failed");
                RegionOutcome::Rejected(RejectReason::Mesh)
            }
        }
    }
}
