//! Mission upload session.
//!
//! A paired app sends a mission as segment counts, exclusion sub-run lengths
//! and then every point in storage order. [`MissionPlan`] holds such a mission
//! in structured form and [`Navigator::upload`] replays the session against the
//! store.

use sward_geometry::Point;
use tracing::info;

use crate::error::NavigationError;
use crate::nav::Navigator;
use crate::store::{MAX_EXCLUSIONS, MAX_POINTS, Segment};

/// A complete mission as uploaded by the app.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MissionPlan {
    /// Boundary of the mowing area.
    pub perimeter: Vec<Point>,
    /// Zones to keep out of, one polygon each.
    pub exclusions: Vec<Vec<Point>>,
    /// Path into the charging station.
    pub dock: Vec<Point>,
    /// The mowing pattern.
    pub mow: Vec<Point>,
}

impl MissionPlan {
    /// Total points across all segments.
    pub fn point_count(&self) -> usize {
        self.perimeter.len() + self.exclusion_point_count() + self.dock.len() + self.mow.len()
    }

    fn exclusion_point_count(&self) -> usize {
        self.exclusions.iter().map(Vec::len).sum()
    }

    /// Every point in storage order.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.perimeter
            .iter()
            .chain(self.exclusions.iter().flatten())
            .chain(&self.dock)
            .chain(&self.mow)
            .copied()
    }

    fn check_capacity(&self) -> Result<(), NavigationError> {
        if self.exclusions.len() > MAX_EXCLUSIONS {
            return Err(NavigationError::ExclusionOutOfRange {
                index: self.exclusions.len() - 1,
                max: MAX_EXCLUSIONS,
            });
        }
        if self.point_count() > MAX_POINTS {
            return Err(NavigationError::CapacityExceeded {
                segment: Segment::Mow,
                requested: self.point_count(),
                capacity: MAX_POINTS,
            });
        }
        Ok(())
    }
}

impl Navigator {
    /// Replays a full upload session for `plan`.
    ///
    /// Segment counts go first (free is cleared), then exclusion lengths in
    /// increasing order, then every point from index 0, which rewinds all
    /// progress. A plan that cannot fit is refused before anything is written.
    pub fn upload(&mut self, plan: &MissionPlan) -> Result<(), NavigationError> {
        plan.check_capacity()?;

        // Shrink before growing so no intermediate layout overflows.
        for segment in Segment::ALL.into_iter().rev() {
            self.set_segment_count(segment, 0)?;
        }
        self.set_segment_count(Segment::Perimeter, plan.perimeter.len())?;
        self.set_segment_count(Segment::Exclusion, plan.exclusion_point_count())?;
        self.set_segment_count(Segment::Dock, plan.dock.len())?;
        self.set_segment_count(Segment::Mow, plan.mow.len())?;

        for (run, zone) in plan.exclusions.iter().enumerate() {
            self.set_exclusion_length(run, zone.len())?;
        }
        for (index, point) in plan.points().enumerate() {
            self.set_point(index, point)?;
        }

        info!(
            perimeter = plan.perimeter.len(),
            exclusions = plan.exclusions.len(),
            dock = plan.dock.len(),
            mow = plan.mow.len(),
            "mission uploaded"
        );
        self.run();
        Ok(())
    }
}
