use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

use crate::core::Axis;

/// Shape of the guide lines drawn through the hovered point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrosshairType {
    /// Full-height vertical line.
    X,
    /// Full-width horizontal line.
    Y,
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    #[default]
    BottomLeft,
    Left,
    Cross,
}

/// Guide line segment `(x1, y1, x2, y2)` in inner-area coordinates.
pub type CrosshairSegment = (f64, f64, f64, f64);

impl CrosshairType {
    /// Segments through `(x, y)` clipped to a `width` x `height` area.
    ///
    /// Corner variants draw from the point toward the named corner, edge
    /// variants draw a single segment toward the named edge.
    #[must_use]
    pub fn segments(self, x: f64, y: f64, width: f64, height: f64) -> SmallVec<[CrosshairSegment; 2]> {
        let up = (x, 0.0, x, y);
        let down = (x, y, x, height);
        let left = (0.0, y, x, y);
        let right = (x, y, width, y);
        let full_vertical = (x, 0.0, x, height);
        let full_horizontal = (0.0, y, width, y);

        let mut segments = SmallVec::new();
        match self {
            Self::X => segments.push(full_vertical),
            Self::Y => segments.push(full_horizontal),
            Self::TopLeft => segments.extend([up, left]),
            Self::Top => segments.push(up),
            Self::TopRight => segments.extend([up, right]),
            Self::Right => segments.push(right),
            Self::BottomRight => segments.extend([down, right]),
            Self::Bottom => segments.push(down),
            Self::BottomLeft => segments.extend([down, left]),
            Self::Left => segments.push(left),
            Self::Cross => segments.extend([full_vertical, full_horizontal]),
        }
        segments
    }
}

/// Whether hover snaps to whole slices, and along which axis.
///
/// JSON accepts `false`, `"x"` or `"y"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SliceMode {
    #[default]
    Disabled,
    X,
    Y,
}

impl SliceMode {
    #[must_use]
    pub fn axis(self) -> Option<Axis> {
        match self {
            Self::Disabled => None,
            Self::X => Some(Axis::X),
            Self::Y => Some(Axis::Y),
        }
    }
}

impl Serialize for SliceMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Disabled => serializer.serialize_bool(false),
            Self::X => serializer.serialize_str("x"),
            Self::Y => serializer.serialize_str("y"),
        }
    }
}

impl<'de> Deserialize<'de> for SliceMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Axis(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Flag(false) => Ok(Self::Disabled),
            Raw::Axis(axis) if axis == "x" => Ok(Self::X),
            Raw::Axis(axis) if axis == "y" => Ok(Self::Y),
            _ => Err(D::Error::custom("expected false, \"x\" or \"y\"")),
        }
    }
}

/// Pointer position relative to the outer chart box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
}

impl PointerEvent {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InteractionMode {
    #[default]
    Idle,
    Hovering,
    Touching,
}

/// What the pointer currently designates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InteractionState {
    mode: InteractionMode,
    current_point: Option<String>,
    current_slice: Option<usize>,
}

impl InteractionState {
    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Id (`"<serie>.<index>"`) of the hovered point.
    #[must_use]
    pub fn current_point(&self) -> Option<&str> {
        self.current_point.as_deref()
    }

    /// Index of the hovered slice.
    #[must_use]
    pub fn current_slice(&self) -> Option<usize> {
        self.current_slice
    }

    /// Returns `true` when the hovered point changed.
    pub fn set_current_point(&mut self, point: Option<String>, mode: InteractionMode) -> bool {
        self.mode = if point.is_some() { mode } else { InteractionMode::Idle };
        let changed = self.current_point != point;
        self.current_point = point;
        changed
    }

    /// Returns `true` when the hovered slice changed.
    pub fn set_current_slice(&mut self, slice: Option<usize>) -> bool {
        self.mode = if slice.is_some() {
            InteractionMode::Hovering
        } else {
            InteractionMode::Idle
        };
        let changed = self.current_slice != slice;
        self.current_slice = slice;
        changed
    }

    pub fn clear(&mut self) {
        self.mode = InteractionMode::Idle;
        self.current_point = None;
        self.current_slice = None;
    }
}

/// Index of the position closest to `(x, y)`.
///
/// Equivalent to locating the Voronoi cell containing the pointer; ties keep
/// the earliest position.
#[must_use]
pub fn nearest_point(positions: &[(f64, f64)], x: f64, y: f64) -> Option<usize> {
    positions
        .iter()
        .enumerate()
        .filter(|(_, (px, py))| px.is_finite() && py.is_finite())
        .map(|(index, (px, py))| (index, (px - x).powi(2) + (py - y).powi(2)))
        .fold(None, |best: Option<(usize, f64)>, (index, distance)| match best {
            Some((_, best_distance)) if best_distance <= distance => best,
            _ => Some((index, distance)),
        })
        .map(|(index, _)| index)
}

/// Voronoi cell of `positions[index]` clipped to the `width` x `height` box,
/// as a closed polygon (first vertex not repeated).
#[must_use]
pub fn voronoi_cell(positions: &[(f64, f64)], index: usize, width: f64, height: f64) -> Vec<(f64, f64)> {
    let Some(&(sx, sy)) = positions.get(index) else {
        return Vec::new();
    };
    let mut cell = vec![(0.0, 0.0), (width, 0.0), (width, height), (0.0, height)];
    for (other_index, &(ox, oy)) in positions.iter().enumerate() {
        if other_index == index || (ox == sx && oy == sy) {
            continue;
        }
        // Keep the half-plane closer to the site: n·p <= c.
        let (nx, ny) = (ox - sx, oy - sy);
        let c = (ox * ox + oy * oy - sx * sx - sy * sy) / 2.0;
        cell = clip_half_plane(&cell, nx, ny, c);
        if cell.is_empty() {
            break;
        }
    }
    cell
}

fn clip_half_plane(polygon: &[(f64, f64)], nx: f64, ny: f64, c: f64) -> Vec<(f64, f64)> {
    let inside = |(x, y): (f64, f64)| nx * x + ny * y <= c;
    let mut clipped = Vec::with_capacity(polygon.len() + 1);
    for (i, &current) in polygon.iter().enumerate() {
        let previous = polygon[(i + polygon.len() - 1) % polygon.len()];
        match (inside(previous), inside(current)) {
            (true, true) => clipped.push(current),
            (true, false) => clipped.push(intersect(previous, current, nx, ny, c)),
            (false, true) => {
                clipped.push(intersect(previous, current, nx, ny, c));
                clipped.push(current);
            }
            (false, false) => {}
        }
    }
    clipped
}

fn intersect(a: (f64, f64), b: (f64, f64), nx: f64, ny: f64, c: f64) -> (f64, f64) {
    let da = nx * a.0 + ny * a.1 - c;
    let db = nx * b.0 + ny * b.1 - c;
    let t = da / (da - db);
    (a.0 + t * (b.0 - a.0), a.1 + t * (b.1 - a.1))
}

/// Index of the span `(start, length)` containing `coordinate`.
///
/// The last span also owns its far edge.
#[must_use]
pub fn span_at(spans: &[(f64, f64)], coordinate: f64) -> Option<usize> {
    let last = spans.len().checked_sub(1)?;
    spans.iter().enumerate().position(|(index, &(start, length))| {
        let end = start + length;
        coordinate >= start && (coordinate < end || (index == last && coordinate <= end))
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{CrosshairType, InteractionState, SliceMode, nearest_point, span_at, voronoi_cell};
    use crate::interaction::InteractionMode;

    #[test]
    fn bottom_left_crosshair_runs_down_and_left() {
        let segments = CrosshairType::BottomLeft.segments(30.0, 20.0, 100.0, 80.0);
        assert_eq!(segments.as_slice(), &[(30.0, 20.0, 30.0, 80.0), (0.0, 20.0, 30.0, 20.0)]);
        assert_eq!(CrosshairType::Cross.segments(1.0, 1.0, 2.0, 2.0).len(), 2);
        assert_eq!(CrosshairType::Top.segments(1.0, 1.0, 2.0, 2.0).len(), 1);
    }

    #[test]
    fn slice_mode_accepts_false_x_and_y() {
        let modes: Vec<SliceMode> = serde_json::from_str(r#"[false, "x", "y"]"#).expect("modes");
        assert_eq!(modes, vec![SliceMode::Disabled, SliceMode::X, SliceMode::Y]);
        assert!(serde_json::from_str::<SliceMode>("true").is_err());
    }

    #[test]
    fn nearest_point_picks_the_closest_site() {
        let positions = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)];
        assert_eq!(nearest_point(&positions, 8.0, 2.0), Some(1));
        assert_eq!(nearest_point(&positions, 9.0, 9.0), Some(2));
        assert_eq!(nearest_point(&[], 0.0, 0.0), None);
    }

    #[test]
    fn voronoi_cells_split_the_box_between_sites() {
        let positions = [(25.0, 50.0), (75.0, 50.0)];
        let left = voronoi_cell(&positions, 0, 100.0, 100.0);
        let max_x = left.iter().map(|(x, _)| *x).fold(f64::MIN, f64::max);
        assert_relative_eq!(max_x, 50.0);
        assert_eq!(left.len(), 4);
    }

    #[test]
    fn spans_include_the_far_edge_of_the_last_span() {
        let spans = [(0.0, 15.0), (15.0, 20.0), (35.0, 15.0)];
        assert_eq!(span_at(&spans, 14.9), Some(0));
        assert_eq!(span_at(&spans, 15.0), Some(1));
        assert_eq!(span_at(&spans, 50.0), Some(2));
        assert_eq!(span_at(&spans, 51.0), None);
    }

    #[test]
    fn interaction_state_reports_changes() {
        let mut state = InteractionState::default();
        assert!(state.set_current_point(Some("a.0".to_owned()), InteractionMode::Hovering));
        assert!(!state.set_current_point(Some("a.0".to_owned()), InteractionMode::Hovering));
        assert_eq!(state.mode(), InteractionMode::Hovering);
        state.clear();
        assert_eq!(state.current_point(), None);
    }
}
