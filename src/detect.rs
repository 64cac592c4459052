//! Plate edge detection and thermocouple localization.
//!
//! The fin shows up in a heat map as a rectangle of hot
//! pixels against a colder background, so each of its four
//! edges coincides with the steepest temperature step along
//! a scan line.
//!
//! # Derivative convention
//!
//! Scan lines are differentiated with adjacent forward
//! differences, `d[i] = v[i + 1] - v[i]`. A rising edge is
//! reported at `argmax(d) + 1` (the first sample past the
//! steepest rise) and a falling edge at `argmin(d)` (the
//! last sample before the steepest fall), so both indices
//! land on the hot side of their step. Ties in `argmax` /
//! `argmin` keep the first occurrence; ties in the cross-row
//! and cross-column mode resolve to the smallest index.
//!
//! All entry points are pure functions of their inputs:
//! deterministic, no internal state, safe to run
//! concurrently for independent grids.

use core::fmt;
use std::cmp::Reverse;

use itertools::Itertools;
use ndarray::{s, ArrayView1};
use serde_derive::*;

use crate::calibration::Calibration;
use crate::grid::HeatMap;

/// Pixel bounding box of the plate within the grid. For a
/// well-formed plate, `left < right` and `top < bottom`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlateEdges {
    /// Leftmost plate column.
    pub left: usize,
    /// Rightmost plate column.
    pub right: usize,
    /// Topmost plate row.
    pub top: usize,
    /// Bottommost plate row.
    pub bottom: usize,
}

impl PlateEdges {
    /// Vertical centerline of the plate span. Fractional
    /// when the edge sum is odd.
    pub fn midline(&self) -> f64 {
        (self.left + self.right) as f64 / 2.
    }

    pub fn pixel_width(&self) -> usize {
        self.right - self.left + 1
    }

    pub fn pixel_height(&self) -> usize {
        self.bottom - self.top + 1
    }
}

/// Pixel coordinate, `x` rightward, `y` downward.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelPoint {
    pub x: usize,
    pub y: usize,
}

impl fmt::Display for PixelPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Everything derived from one heat map: the plate box, its
/// midline and the two thermocouple pixel locations.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub edges: PlateEdges,
    pub midline: f64,
    pub chamfered_tc: PixelPoint,
    pub filleted_tc: PixelPoint,
}

/// The grid cannot support edge detection. Non-recoverable
/// for the experiment: no partial result is produced, and
/// retrying without a different grid is pointless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectError {
    /// Fewer rows than the two edge windows need.
    InsufficientRows { rows: usize, needed: usize },
    /// A scan line too short to define a discrete gradient.
    DegenerateScanLine { len: usize },
    /// No columns strictly between the detected vertical
    /// edges to scan for the horizontal ones.
    EmptyScanSpan { left: usize, right: usize },
}

impl fmt::Display for DetectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientRows { rows, needed } => {
                write!(f, "grid has {} rows, edge windows need {}", rows, needed)
            }
            Self::DegenerateScanLine { len } => {
                write!(f, "scan line of {} sample(s) has no defined gradient", len)
            }
            Self::EmptyScanSpan { left, right } => {
                write!(
                    f,
                    "no scan columns strictly between vertical edges {} and {}",
                    left, right
                )
            }
        }
    }
}

impl std::error::Error for DetectError {}

/// Run edge detection and thermocouple localization against
/// one grid.
///
/// The calibration must have passed
/// [`validate`](Calibration::validate): zero physical
/// dimensions are a startup configuration error, not a
/// detection failure.
pub fn detect(map: &HeatMap, calib: &Calibration) -> Result<Detection, DetectError> {
    let edges = detect_plate_edges(map, calib.edge_sensitivity)?;
    let (chamfered_tc, filleted_tc) = locate_thermocouples(&edges, calib);
    Ok(Detection {
        midline: edges.midline(),
        edges,
        chamfered_tc,
        filleted_tc,
    })
}

/// Locate the four pixel edges of the plate.
///
/// Every row votes for a left and right edge (steepest rise
/// and fall across its columns); the mode of the votes wins.
/// The top and bottom edges are then found the same way per
/// column, but only over columns strictly inside the
/// vertical span and only within the first and last
/// `sensitivity` rows. The windows keep the search away from
/// the opposite physical edge and bound the work per column.
pub fn detect_plate_edges(map: &HeatMap, sensitivity: usize) -> Result<PlateEdges, DetectError> {
    let rows = map.rows();
    let needed = 2 * sensitivity;
    if rows < needed {
        return Err(DetectError::InsufficientRows { rows, needed });
    }
    if sensitivity < 2 {
        return Err(DetectError::DegenerateScanLine { len: sensitivity });
    }

    let mut left_votes = Vec::with_capacity(rows);
    let mut right_votes = Vec::with_capacity(rows);
    for y in 0..rows {
        let (rise, fall) = steepest_step(map.row(y))?;
        left_votes.push(rise);
        right_votes.push(fall);
    }
    let left = mode(&left_votes).ok_or(DetectError::InsufficientRows { rows, needed })?;
    let right = mode(&right_votes).ok_or(DetectError::InsufficientRows { rows, needed })?;

    let mut top_votes = Vec::new();
    let mut bottom_votes = Vec::new();
    for x in left + 1..right {
        let column = map.column(x);
        let (rise, _) = steepest_step(column.slice(s![..sensitivity]))?;
        let (_, fall) = steepest_step(column.slice(s![rows - sensitivity..]))?;
        top_votes.push(rise);
        bottom_votes.push(rows - sensitivity + fall);
    }
    let top = mode(&top_votes).ok_or(DetectError::EmptyScanSpan { left, right })?;
    let bottom = mode(&bottom_votes).ok_or(DetectError::EmptyScanSpan { left, right })?;

    Ok(PlateEdges {
        left,
        right,
        top,
        bottom,
    })
}

/// Map the physical thermocouple mounting offsets into
/// pixel coordinates within the detected plate box.
///
/// Fractions of the physical span are truncated toward zero
/// when converted to pixels: the offsets are measured from a
/// fixed reference edge inward, never rounded outward. Both
/// horizontal terms mirror the offset (`fin_width - offset`)
/// because the camera views the fin mirrored; the chamfered
/// vertical term is measured from the top edge, the filleted
/// one from the bottom (`fin_height - offset`).
pub fn locate_thermocouples(
    edges: &PlateEdges,
    calib: &Calibration,
) -> (PixelPoint, PixelPoint) {
    let width = edges.pixel_width() as f64;
    let height = edges.pixel_height() as f64;

    let chamfered = PixelPoint {
        x: trunc_frac((calib.fin_width - calib.tc_chamfered_h_offset) / calib.fin_width, width)
            + edges.left,
        y: trunc_frac(calib.tc_chamfered_v_offset / calib.fin_height, height) + edges.top,
    };
    let filleted = PixelPoint {
        x: trunc_frac((calib.fin_width - calib.tc_filleted_h_offset) / calib.fin_width, width)
            + edges.left,
        y: trunc_frac(
            (calib.fin_height - calib.tc_filleted_v_offset) / calib.fin_height,
            height,
        ) + edges.top,
    };
    (chamfered, filleted)
}

fn trunc_frac(frac: f64, span: f64) -> usize {
    (frac * span).trunc() as usize
}

/// Locations of the steepest rise and fall along a scan
/// line, both reported on the hot side of their step.
fn steepest_step(line: ArrayView1<f64>) -> Result<(usize, usize), DetectError> {
    if line.len() < 2 {
        return Err(DetectError::DegenerateScanLine { len: line.len() });
    }

    let mut max_i = 0;
    let mut max_d = line[1] - line[0];
    let mut min_i = 0;
    let mut min_d = max_d;
    for i in 1..line.len() - 1 {
        let d = line[i + 1] - line[i];
        if d > max_d {
            max_d = d;
            max_i = i;
        }
        if d < min_d {
            min_d = d;
            min_i = i;
        }
    }
    Ok((max_i + 1, min_i))
}

/// Most frequent value; count ties resolve to the smallest
/// value so the winner does not depend on scan order.
fn mode(votes: &[usize]) -> Option<usize> {
    votes
        .iter()
        .copied()
        .counts()
        .into_iter()
        .min_by_key(|&(value, count)| (Reverse(count), value))
        .map(|(value, _)| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    /// The clean synthetic plate: 100x50 background of 20.0
    /// with an 80.0 rectangle over rows 10..=89 and columns
    /// 5..=44.
    fn clean_plate() -> HeatMap {
        HeatMap::new(Array2::from_shape_fn((100, 50), |(y, x)| {
            if (10..=89).contains(&y) && (5..=44).contains(&x) {
                80.0
            } else {
                20.0
            }
        }))
    }

    fn scenario_calibration() -> Calibration {
        Calibration {
            edge_sensitivity: 15,
            ..Calibration::default()
        }
    }

    #[test]
    fn clean_plate_edges() {
        let edges = detect_plate_edges(&clean_plate(), 15).unwrap();
        assert_eq!(
            edges,
            PlateEdges {
                left: 5,
                right: 44,
                top: 10,
                bottom: 89,
            }
        );
        assert_eq!(edges.midline(), 24.5);
    }

    #[test]
    fn detection_is_deterministic() {
        let map = clean_plate();
        let calib = scenario_calibration();
        let first = detect(&map, &calib).unwrap();
        let second = detect(&map, &calib).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn edge_ordering_and_midline_bounds() {
        let edges = detect_plate_edges(&clean_plate(), 15).unwrap();
        assert!(edges.left < edges.right);
        assert!(edges.top < edges.bottom);
        assert!(edges.left as f64 <= edges.midline());
        assert!(edges.midline() <= edges.right as f64);
    }

    #[test]
    fn chamfered_localization_matches_the_bilinear_formula() {
        let edges = PlateEdges {
            left: 5,
            right: 44,
            top: 10,
            bottom: 89,
        };
        let (chamfered, _) = locate_thermocouples(&edges, &scenario_calibration());
        // x = trunc((34.02 - 16.71) / 34.02 * 40) + 5
        // y = trunc(28.47 / 90.28 * 80) + 10
        assert_eq!(chamfered, PixelPoint { x: 25, y: 35 });
    }

    #[test]
    fn filleted_vertical_offset_is_measured_from_the_bottom() {
        let edges = PlateEdges {
            left: 5,
            right: 44,
            top: 10,
            bottom: 89,
        };
        let (_, filleted) = locate_thermocouples(&edges, &scenario_calibration());
        // y = trunc((90.28 - 27.65) / 90.28 * 80) + 10
        assert_eq!(filleted, PixelPoint { x: 25, y: 65 });
    }

    #[test]
    fn localization_stays_inside_the_plate_box() {
        let edges = detect_plate_edges(&clean_plate(), 15).unwrap();
        let (chamfered, filleted) = locate_thermocouples(&edges, &scenario_calibration());
        for tc in [chamfered, filleted].iter() {
            assert!((edges.left..=edges.right).contains(&tc.x));
            assert!((edges.top..=edges.bottom).contains(&tc.y));
        }
    }

    #[test]
    fn full_detection_of_the_clean_plate() {
        let detection = detect(&clean_plate(), &scenario_calibration()).unwrap();
        assert_eq!(detection.midline, 24.5);
        assert_eq!(detection.chamfered_tc, PixelPoint { x: 25, y: 35 });
        assert_eq!(detection.filleted_tc, PixelPoint { x: 25, y: 65 });
    }

    #[test]
    fn mode_breaks_count_ties_toward_the_smallest_value() {
        assert_eq!(mode(&[7, 3, 7, 3]), Some(3));
        assert_eq!(mode(&[2, 9, 9]), Some(9));
        assert_eq!(mode(&[]), None);
    }

    #[test]
    fn tied_gradient_columns_resolve_to_the_smaller_index() {
        // Even rows step up at column 3, odd rows at column 7,
        // with equal step heights: the vote counts tie and the
        // smaller column must win.
        let map = HeatMap::new(Array2::from_shape_fn((30, 12), |(y, x)| {
            let step = if y % 2 == 0 { 3 } else { 7 };
            if (step..10).contains(&x) {
                80.0
            } else {
                20.0
            }
        }));
        let edges = detect_plate_edges(&map, 2).unwrap();
        assert_eq!(edges.left, 3);
    }

    #[test]
    fn too_few_rows_for_the_windows() {
        let map = HeatMap::new(Array2::from_elem((10, 10), 20.0));
        assert_eq!(
            detect_plate_edges(&map, 15),
            Err(DetectError::InsufficientRows {
                rows: 10,
                needed: 30,
            })
        );
    }

    #[test]
    fn single_column_grid_has_no_gradient() {
        let map = HeatMap::new(Array2::from_elem((40, 1), 20.0));
        assert_eq!(
            detect_plate_edges(&map, 15),
            Err(DetectError::DegenerateScanLine { len: 1 })
        );
    }

    #[test]
    fn adjacent_vertical_edges_leave_nothing_to_scan() {
        // A two-column grid puts the rise at column 1 and the
        // fall at column 0: no column lies strictly between.
        let map = HeatMap::new(Array2::from_shape_fn((40, 2), |(_, x)| {
            if x == 0 {
                80.0
            } else {
                20.0
            }
        }));
        match detect_plate_edges(&map, 15) {
            Err(DetectError::EmptyScanSpan { .. }) => (),
            other => panic!("expected EmptyScanSpan, got {:?}", other),
        }
    }
}
