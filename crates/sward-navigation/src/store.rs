//! Segmented point storage.
//!
//! All mission points live in one buffer, in this order: perimeter,
//! exclusions, dock path, mow path, free (transit) path. Each segment is a
//! contiguous range described by a [`SegmentLayout`], which is recomputed from
//! the five counts every time one of them changes. Callers address points by
//! `(Segment, index-within-segment)` and never by raw buffer offset.

use core::fmt;
use core::ops::Range;

use sward_geometry::Point;
use tracing::{debug, warn};

use crate::error::NavigationError;

/// Number of points the store can hold across all segments.
pub const MAX_POINTS: usize = 5000;
/// Number of exclusion sub-runs the store can describe.
pub const MAX_EXCLUSIONS: usize = 100;

/// The kind of path a stored point belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Segment {
    /// Boundary of the mowing area. Static obstacle data.
    Perimeter,
    /// All exclusion zones, back to back. Static obstacle data.
    Exclusion,
    /// Path into the charging station, last point at the contacts.
    Dock,
    /// The mowing pattern.
    Mow,
    /// Transit path connecting the end of one segment to the start of another.
    Free,
}

impl Segment {
    /// All segments in storage order.
    pub const ALL: [Segment; 5] = [
        Segment::Perimeter,
        Segment::Exclusion,
        Segment::Dock,
        Segment::Mow,
        Segment::Free,
    ];

    const fn slot(self) -> usize {
        match self {
            Segment::Perimeter => 0,
            Segment::Exclusion => 1,
            Segment::Dock => 2,
            Segment::Mow => 3,
            Segment::Free => 4,
        }
    }
}

/// Counts and derived start offsets of the five segments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentLayout {
    counts: [usize; 5],
    starts: [usize; 5],
}

impl SegmentLayout {
    /// Builds the layout for the given counts, indexed in storage order.
    pub fn from_counts(counts: [usize; 5]) -> Self {
        let mut starts = [0; 5];
        for slot in 1..5 {
            starts[slot] = starts[slot - 1] + counts[slot - 1];
        }
        Self { counts, starts }
    }

    /// Number of points in `segment`.
    pub fn count(&self, segment: Segment) -> usize {
        self.counts[segment.slot()]
    }

    /// Buffer offset of the first point of `segment`.
    pub fn start(&self, segment: Segment) -> usize {
        self.starts[segment.slot()]
    }

    /// Buffer range covered by `segment`.
    pub fn range(&self, segment: Segment) -> Range<usize> {
        let start = self.start(segment);
        start..start + self.count(segment)
    }

    /// Total points across all segments.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    fn with_count(&self, segment: Segment, count: usize) -> Self {
        let mut counts = self.counts;
        counts[segment.slot()] = count;
        Self::from_counts(counts)
    }
}

/// One exclusion zone inside the exclusion segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExclusionRun {
    /// Buffer offset of the first point.
    pub start: usize,
    /// Number of points.
    pub len: usize,
}

impl ExclusionRun {
    /// End offset (exclusive).
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Outcome of an accepted [`PointStore::set_point`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadProgress {
    /// Index 0 was written: a fresh upload began and old progress is void.
    Restarted,
    /// The point extended the current upload.
    Appended,
}

/// Flat point buffer partitioned into segments.
#[derive(Debug, Clone)]
pub struct PointStore {
    points: Vec<Point>,
    layout: SegmentLayout,
    exclusion_runs: Vec<ExclusionRun>,
    next_index: usize,
}

impl Default for PointStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PointStore {
    /// Creates an empty store with room for [`MAX_POINTS`] points.
    pub fn new() -> Self {
        Self {
            points: vec![Point::default(); MAX_POINTS],
            layout: SegmentLayout::default(),
            exclusion_runs: Vec::new(),
            next_index: 0,
        }
    }

    /// Stores a point during an upload.
    ///
    /// Points must arrive in order: `index` has to be either 0, which starts a
    /// fresh upload, or exactly one past the last accepted index.
    ///
    /// # Errors
    /// * `IndexOutOfRange` if `index >= MAX_POINTS`
    /// * `NonContiguousIndex` if `index` would leave a hole or overwrite
    pub fn set_point(&mut self, index: usize, point: Point) -> Result<UploadProgress, NavigationError> {
        if index >= MAX_POINTS {
            return Err(NavigationError::IndexOutOfRange {
                index,
                capacity: MAX_POINTS,
            });
        }
        if index != 0 && index != self.next_index {
            return Err(NavigationError::NonContiguousIndex {
                index,
                expected: self.next_index,
            });
        }

        self.points[index] = point;
        self.next_index = index + 1;

        if index == 0 {
            debug!("point upload restarted");
            Ok(UploadProgress::Restarted)
        } else {
            Ok(UploadProgress::Appended)
        }
    }

    /// Sets the number of points in `segment` and recomputes all start offsets.
    ///
    /// # Errors
    /// `CapacityExceeded` if the segment counts would sum past `MAX_POINTS`.
    pub fn set_segment_count(&mut self, segment: Segment, count: usize) -> Result<(), NavigationError> {
        let layout = self.layout.with_count(segment, count);
        if layout.total() > MAX_POINTS {
            warn!(?segment, count, total = layout.total(), "segment count refused");
            return Err(NavigationError::CapacityExceeded {
                segment,
                requested: layout.total(),
                capacity: MAX_POINTS,
            });
        }
        self.layout = layout;
        Ok(())
    }

    /// Describes exclusion sub-run `run` as `len` points.
    ///
    /// The run starts where run `run - 1` ends, or right after the perimeter
    /// for run 0. The sub-run count becomes `run + 1`, so uploading runs in
    /// increasing order from 0 replaces any previous description.
    ///
    /// # Errors
    /// `ExclusionOutOfRange` if `run >= MAX_EXCLUSIONS`, `NonContiguousExclusion`
    /// if run `run - 1` has not been described.
    pub fn set_exclusion_length(&mut self, run: usize, len: usize) -> Result<(), NavigationError> {
        if run >= MAX_EXCLUSIONS {
            return Err(NavigationError::ExclusionOutOfRange {
                index: run,
                max: MAX_EXCLUSIONS,
            });
        }

        let start = match run.checked_sub(1) {
            None => self.layout.count(Segment::Perimeter),
            Some(previous) => match self.exclusion_runs.get(previous) {
                Some(previous) => previous.end(),
                None => {
                    warn!(run, described = self.exclusion_runs.len(), "exclusion run refused");
                    return Err(NavigationError::NonContiguousExclusion {
                        run,
                        expected: self.exclusion_runs.len(),
                    });
                }
            },
        };
        self.exclusion_runs.resize(run + 1, ExclusionRun::default());
        self.exclusion_runs[run] = ExclusionRun { start, len };
        Ok(())
    }

    /// Replaces the free segment with `path`.
    ///
    /// # Errors
    /// `TransitUnavailable` if the path does not fit behind the mow segment.
    pub fn replace_free_path(&mut self, path: &[Point]) -> Result<(), NavigationError> {
        if !self.can_hold_free_path(path.len()) {
            return Err(NavigationError::TransitUnavailable { len: path.len() });
        }
        self.layout = self.layout.with_count(Segment::Free, path.len());
        let start = self.layout.start(Segment::Free);
        self.points[start..start + path.len()].copy_from_slice(path);
        Ok(())
    }

    /// Whether a free path of `len` points fits behind the mow segment.
    pub fn can_hold_free_path(&self, len: usize) -> bool {
        self.layout.start(Segment::Free) + len <= MAX_POINTS
    }

    /// Point `index` of `segment`, or `None` past the segment's end.
    pub fn point(&self, segment: Segment, index: usize) -> Option<Point> {
        if index >= self.layout.count(segment) {
            return None;
        }
        self.points.get(self.layout.start(segment) + index).copied()
    }

    /// All points of `segment`.
    pub fn segment(&self, segment: Segment) -> &[Point] {
        let range = self.layout.range(segment);
        &self.points[range.start.min(MAX_POINTS)..range.end.min(MAX_POINTS)]
    }

    /// Points of the mowing area boundary.
    pub fn perimeter(&self) -> &[Point] {
        self.segment(Segment::Perimeter)
    }

    /// Points of exclusion zone `run`, if it is configured.
    pub fn exclusion(&self, run: usize) -> Option<&[Point]> {
        let run = self.exclusion_runs.get(run)?;
        self.points.get(run.start..run.end())
    }

    /// Configured exclusion sub-runs.
    pub fn exclusion_runs(&self) -> &[ExclusionRun] {
        &self.exclusion_runs
    }

    /// Number of points in `segment`.
    pub fn count(&self, segment: Segment) -> usize {
        self.layout.count(segment)
    }

    /// Current segment layout.
    pub fn layout(&self) -> &SegmentLayout {
        &self.layout
    }

    /// The index the next appended point must carry.
    pub fn next_index(&self) -> usize {
        self.next_index
    }
}

impl fmt::Display for PointStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PointStore ({}/{} points)", self.layout.total(), MAX_POINTS)?;
        for segment in Segment::ALL {
            writeln!(
                f,
                "  {:<9} count={:<5} start={}",
                format!("{segment:?}"),
                self.layout.count(segment),
                self.layout.start(segment)
            )?;
        }
        for (i, run) in self.exclusion_runs.iter().enumerate() {
            writeln!(f, "  exclusion[{}] start={} len={}", i, run.start, run.len)?;
        }
        match self.point(Segment::Mow, 0) {
            Some(p) => write!(f, "  first mow point {}", p),
            None => write!(f, "  no mow points"),
        }
    }
}
