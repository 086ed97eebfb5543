use crate::operations::path::SearchParams;
use crate::operations::region::DEFAULT_MAX_ITERATIONS;

/// Parameters controlling cursor interaction and path search.
#[derive(Debug, Clone, Copy)]
pub struct KnifeParams {
    /// Screen distance in pixels under which the cursor hovers a point.
    pub point_px: f64,
    /// Squared screen distance in pixels under which the cursor hovers a
    /// segment.
    pub segment_px_sq: f64,
    /// Boundary snapping distance in pixels while hovering.
    pub idle_snap_px: f64,
    /// Boundary snapping distance in pixels while dragging a bound endpoint.
    pub drag_snap_px: f64,
    /// Path search tuning.
    pub search: SearchParams,
    /// Flood-fill iteration cap for region selection.
    pub region_max_iterations: usize,
}

impl Default for KnifeParams {
    fn default() -> Self {
        Self {
            point_px: 20.0,
            segment_px_sq: 400.0,
            idle_snap_px: 20.0,
            drag_snap_px: 60.0,
            search: SearchParams::default(),
            region_max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}
