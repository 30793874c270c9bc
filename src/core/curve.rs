//! Path generation for series lines and areas.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// Interpolation applied between consecutive points of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineCurve {
    Basis,
    Cardinal,
    CatmullRom,
    #[default]
    Linear,
    MonotoneX,
    MonotoneY,
    Natural,
    Step,
    StepAfter,
    StepBefore,
}

/// One drawing command in inner-area pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo {
        x: f64,
        y: f64,
    },
    LineTo {
        x: f64,
        y: f64,
    },
    CubicTo {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x: f64,
        y: f64,
    },
    ClosePath,
}

impl PathCommand {
    /// End point of the command, `None` for `ClosePath`.
    #[must_use]
    pub fn end_point(self) -> Option<(f64, f64)> {
        match self {
            Self::MoveTo { x, y } | Self::LineTo { x, y } | Self::CubicTo { x, y, .. } => {
                Some((x, y))
            }
            Self::ClosePath => None,
        }
    }

    #[must_use]
    pub fn translated(self, dx: f64, dy: f64) -> Self {
        match self {
            Self::MoveTo { x, y } => Self::MoveTo {
                x: x + dx,
                y: y + dy,
            },
            Self::LineTo { x, y } => Self::LineTo {
                x: x + dx,
                y: y + dy,
            },
            Self::CubicTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => Self::CubicTo {
                x1: x1 + dx,
                y1: y1 + dy,
                x2: x2 + dx,
                y2: y2 + dy,
                x: x + dx,
                y: y + dy,
            },
            Self::ClosePath => Self::ClosePath,
        }
    }
}

/// Serializes commands to SVG path data (`M0,0L10,5Z`).
#[must_use]
pub fn svg_path_data(commands: &[PathCommand]) -> String {
    let mut out = String::new();
    for command in commands {
        // Writing into a String cannot fail.
        let _ = match *command {
            PathCommand::MoveTo { x, y } => write!(out, "M{x},{y}"),
            PathCommand::LineTo { x, y } => write!(out, "L{x},{y}"),
            PathCommand::CubicTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => write!(out, "C{x1},{y1},{x2},{y2},{x},{y}"),
            PathCommand::ClosePath => write!(out, "Z"),
        };
    }
    out
}

type Pt = (f64, f64);

/// Builds line and area paths for a chosen curve.
///
/// Input points are `None` where a datum could not be placed; each run of
/// defined points becomes its own sub-path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineGenerator {
    curve: LineCurve,
}

impl LineGenerator {
    #[must_use]
    pub fn new(curve: LineCurve) -> Self {
        Self { curve }
    }

    #[must_use]
    pub fn curve(self) -> LineCurve {
        self.curve
    }

    #[must_use]
    pub fn generate(self, points: &[Option<Pt>]) -> Vec<PathCommand> {
        let mut out = Vec::new();
        for segment in defined_segments(points) {
            emit_curve(self.curve, &segment, true, &mut out);
        }
        out
    }

    /// Closed area between the curve and the horizontal line `y = baseline`.
    #[must_use]
    pub fn generate_area(self, points: &[Option<Pt>], baseline: f64) -> Vec<PathCommand> {
        let mut out = Vec::new();
        for segment in defined_segments(points) {
            emit_curve(self.curve, &segment, true, &mut out);
            let floor: Vec<Pt> = segment.iter().rev().map(|(x, _)| (*x, baseline)).collect();
            emit_curve(self.curve, &floor, false, &mut out);
            out.push(PathCommand::ClosePath);
        }
        out
    }
}

fn defined_segments(points: &[Option<Pt>]) -> Vec<Vec<Pt>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for point in points {
        match point {
            Some((x, y)) if x.is_finite() && y.is_finite() => current.push((*x, *y)),
            _ => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

fn start(points: &[Pt], move_first: bool, out: &mut Vec<PathCommand>) {
    let (x, y) = points[0];
    out.push(if move_first {
        PathCommand::MoveTo { x, y }
    } else {
        PathCommand::LineTo { x, y }
    });
}

fn cubic(c1: Pt, c2: Pt, end: Pt) -> PathCommand {
    PathCommand::CubicTo {
        x1: c1.0,
        y1: c1.1,
        x2: c2.0,
        y2: c2.1,
        x: end.0,
        y: end.1,
    }
}

fn emit_curve(curve: LineCurve, points: &[Pt], move_first: bool, out: &mut Vec<PathCommand>) {
    if points.is_empty() {
        return;
    }
    match curve {
        LineCurve::Linear => linear(points, move_first, out),
        LineCurve::Step => step(points, 0.5, move_first, out),
        LineCurve::StepBefore => step(points, 0.0, move_first, out),
        LineCurve::StepAfter => step(points, 1.0, move_first, out),
        LineCurve::Basis => basis(points, move_first, out),
        LineCurve::Cardinal => cardinal(points, 0.0, move_first, out),
        LineCurve::CatmullRom => catmull_rom(points, 0.5, move_first, out),
        LineCurve::MonotoneX => monotone(points, move_first, out),
        LineCurve::MonotoneY => {
            let swapped: Vec<Pt> = points.iter().map(|(x, y)| (*y, *x)).collect();
            let mut reflected = Vec::new();
            monotone(&swapped, move_first, &mut reflected);
            out.extend(reflected.into_iter().map(reflect));
        }
        LineCurve::Natural => natural(points, move_first, out),
    }
}

fn reflect(command: PathCommand) -> PathCommand {
    match command {
        PathCommand::MoveTo { x, y } => PathCommand::MoveTo { x: y, y: x },
        PathCommand::LineTo { x, y } => PathCommand::LineTo { x: y, y: x },
        PathCommand::CubicTo {
            x1,
            y1,
            x2,
            y2,
            x,
            y,
        } => PathCommand::CubicTo {
            x1: y1,
            y1: x1,
            x2: y2,
            y2: x2,
            x: y,
            y: x,
        },
        PathCommand::ClosePath => PathCommand::ClosePath,
    }
}

fn linear(points: &[Pt], move_first: bool, out: &mut Vec<PathCommand>) {
    start(points, move_first, out);
    out.extend(
        points[1..]
            .iter()
            .map(|&(x, y)| PathCommand::LineTo { x, y }),
    );
}

/// `t = 0` steps before each point, `t = 1` after, `t = 0.5` halfway.
fn step(points: &[Pt], t: f64, move_first: bool, out: &mut Vec<PathCommand>) {
    start(points, move_first, out);
    for pair in points.windows(2) {
        let ((x0, y0), (x, y)) = (pair[0], pair[1]);
        if t <= 0.0 {
            out.push(PathCommand::LineTo { x: x0, y });
            out.push(PathCommand::LineTo { x, y });
        } else {
            let mid = x0 * (1.0 - t) + x * t;
            out.push(PathCommand::LineTo { x: mid, y: y0 });
            out.push(PathCommand::LineTo { x: mid, y });
        }
    }
    if t > 0.0 && t < 1.0 && points.len() > 1 {
        let (x, y) = points[points.len() - 1];
        out.push(PathCommand::LineTo { x, y });
    }
}

fn basis(points: &[Pt], move_first: bool, out: &mut Vec<PathCommand>) {
    let n = points.len();
    start(points, move_first, out);
    if n == 2 {
        let (x, y) = points[1];
        out.push(PathCommand::LineTo { x, y });
        return;
    }
    if n < 3 {
        return;
    }

    let segment = |p0: Pt, p1: Pt, p: Pt| {
        cubic(
            ((2.0 * p0.0 + p1.0) / 3.0, (2.0 * p0.1 + p1.1) / 3.0),
            ((p0.0 + 2.0 * p1.0) / 3.0, (p0.1 + 2.0 * p1.1) / 3.0),
            (
                (p0.0 + 4.0 * p1.0 + p.0) / 6.0,
                (p0.1 + 4.0 * p1.1 + p.1) / 6.0,
            ),
        )
    };

    let (p0, p1) = (points[0], points[1]);
    out.push(PathCommand::LineTo {
        x: (5.0 * p0.0 + p1.0) / 6.0,
        y: (5.0 * p0.1 + p1.1) / 6.0,
    });
    for k in 2..n {
        out.push(segment(points[k - 2], points[k - 1], points[k]));
    }
    out.push(segment(points[n - 2], points[n - 1], points[n - 1]));
    let (x, y) = points[n - 1];
    out.push(PathCommand::LineTo { x, y });
}

fn cardinal(points: &[Pt], tension: f64, move_first: bool, out: &mut Vec<PathCommand>) {
    let n = points.len();
    start(points, move_first, out);
    if n == 2 {
        let (x, y) = points[1];
        out.push(PathCommand::LineTo { x, y });
        return;
    }
    let k = (1.0 - tension) / 6.0;
    for i in 0..n.saturating_sub(1) {
        let (p1, p2) = (points[i], points[i + 1]);
        let prev = if i == 0 { p2 } else { points[i - 1] };
        let next = if i + 2 < n { points[i + 2] } else { p1 };
        out.push(cubic(
            (p1.0 + k * (p2.0 - prev.0), p1.1 + k * (p2.1 - prev.1)),
            (p2.0 + k * (p1.0 - next.0), p2.1 + k * (p1.1 - next.1)),
            p2,
        ));
    }
}

fn catmull_rom(points: &[Pt], alpha: f64, move_first: bool, out: &mut Vec<PathCommand>) {
    const EPSILON: f64 = 1e-12;
    let n = points.len();
    start(points, move_first, out);
    if n == 2 {
        let (x, y) = points[1];
        out.push(PathCommand::LineTo { x, y });
        return;
    }

    let dist_a = |a: Pt, b: Pt| ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).powf(alpha / 2.0);

    for i in 0..n.saturating_sub(1) {
        let (p1, p2) = (points[i], points[i + 1]);
        let l01_a = if i > 0 { dist_a(points[i - 1], p1) } else { 0.0 };
        let l12_a = dist_a(p1, p2);
        let l23_a = if i + 2 < n { dist_a(p2, points[i + 2]) } else { 0.0 };
        let (l01_2a, l12_2a, l23_2a) = (l01_a * l01_a, l12_a * l12_a, l23_a * l23_a);

        let c1 = if l01_a > EPSILON {
            let p0 = points[i - 1];
            let a = 2.0 * l01_2a + 3.0 * l01_a * l12_a + l12_2a;
            let m = 3.0 * l01_a * (l01_a + l12_a);
            (
                (p1.0 * a - p0.0 * l12_2a + p2.0 * l01_2a) / m,
                (p1.1 * a - p0.1 * l12_2a + p2.1 * l01_2a) / m,
            )
        } else {
            p1
        };
        let c2 = if l23_a > EPSILON {
            let p3 = points[i + 2];
            let b = 2.0 * l23_2a + 3.0 * l23_a * l12_a + l12_2a;
            let m = 3.0 * l23_a * (l23_a + l12_a);
            (
                (p2.0 * b + p1.0 * l23_2a - p3.0 * l12_2a) / m,
                (p2.1 * b + p1.1 * l23_2a - p3.1 * l12_2a) / m,
            )
        } else {
            p2
        };
        out.push(cubic(c1, c2, p2));
    }
}

fn sign(value: f64) -> f64 {
    if value < 0.0 { -1.0 } else { 1.0 }
}

fn slope3(p0: Pt, p1: Pt, p2: Pt) -> f64 {
    let h0 = p1.0 - p0.0;
    let h1 = p2.0 - p1.0;
    let d0 = if h0 != 0.0 { h0 } else if h1 < 0.0 { -0.0 } else { 0.0 };
    let d1 = if h1 != 0.0 { h1 } else if h0 < 0.0 { -0.0 } else { 0.0 };
    let s0 = (p1.1 - p0.1) / d0;
    let s1 = (p2.1 - p1.1) / d1;
    let p = (s0 * h1 + s1 * h0) / (h0 + h1);
    let slope = (sign(s0) + sign(s1)) * s0.abs().min(s1.abs()).min(0.5 * p.abs());
    if slope.is_nan() { 0.0 } else { slope }
}

fn slope2(p0: Pt, p1: Pt, t: f64) -> f64 {
    let h = p1.0 - p0.0;
    if h != 0.0 {
        (3.0 * (p1.1 - p0.1) / h - t) / 2.0
    } else {
        t
    }
}

fn hermite(p0: Pt, p1: Pt, t0: f64, t1: f64) -> PathCommand {
    let dx = (p1.0 - p0.0) / 3.0;
    cubic((p0.0 + dx, p0.1 + dx * t0), (p1.0 - dx, p1.1 - dx * t1), p1)
}

/// Monotone cubic interpolation in x (Steffen).
fn monotone(points: &[Pt], move_first: bool, out: &mut Vec<PathCommand>) {
    let mut unique: Vec<Pt> = Vec::with_capacity(points.len());
    for point in points {
        if unique.last() != Some(point) {
            unique.push(*point);
        }
    }
    let points = unique.as_slice();
    let n = points.len();
    start(points, move_first, out);
    if n == 2 {
        let (x, y) = points[1];
        out.push(PathCommand::LineTo { x, y });
        return;
    }
    if n < 3 {
        return;
    }

    let mut t1 = slope3(points[0], points[1], points[2]);
    out.push(hermite(points[0], points[1], slope2(points[0], points[1], t1), t1));
    for k in 3..n {
        let t0 = t1;
        t1 = slope3(points[k - 2], points[k - 1], points[k]);
        out.push(hermite(points[k - 2], points[k - 1], t0, t1));
    }
    let (p0, p1) = (points[n - 2], points[n - 1]);
    out.push(hermite(p0, p1, t1, slope2(p0, p1, t1)));
}

fn natural_control_points(values: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let n = values.len() - 1;
    let mut a = vec![0.0; n];
    let mut b = vec![0.0; n];
    let mut r = vec![0.0; n];
    a[0] = 0.0;
    b[0] = 2.0;
    r[0] = values[0] + 2.0 * values[1];
    for i in 1..n.saturating_sub(1) {
        a[i] = 1.0;
        b[i] = 4.0;
        r[i] = 4.0 * values[i] + 2.0 * values[i + 1];
    }
    a[n - 1] = 2.0;
    b[n - 1] = 7.0;
    r[n - 1] = 8.0 * values[n - 1] + values[n];
    for i in 1..n {
        let m = a[i] / b[i - 1];
        b[i] -= m;
        r[i] -= m * r[i - 1];
    }
    a[n - 1] = r[n - 1] / b[n - 1];
    for i in (0..n.saturating_sub(1)).rev() {
        a[i] = (r[i] - a[i + 1]) / b[i];
    }
    b[n - 1] = (values[n] + a[n - 1]) / 2.0;
    for i in 0..n.saturating_sub(1) {
        b[i] = 2.0 * values[i + 1] - a[i + 1];
    }
    (a, b)
}

fn natural(points: &[Pt], move_first: bool, out: &mut Vec<PathCommand>) {
    let n = points.len();
    start(points, move_first, out);
    if n == 2 {
        let (x, y) = points[1];
        out.push(PathCommand::LineTo { x, y });
        return;
    }
    if n < 3 {
        return;
    }
    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
    let (ax, bx) = natural_control_points(&xs);
    let (ay, by) = natural_control_points(&ys);
    for i in 0..n - 1 {
        out.push(cubic((ax[i], ay[i]), (bx[i], by[i]), points[i + 1]));
    }
}
