//! Annular wedge layout.

use serde::Serialize;

/// Shape of one wheel ring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WheelSpec {
    pub center: Point,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub label_radius: f64,
    /// Rotate labels along the radius (secondary ring).
    pub rotate_labels: bool,
}

/// Core ring: hub of radius 20 labelled "Mood".
pub const CORE_WHEEL: WheelSpec = WheelSpec {
    center: Point { x: 100.0, y: 100.0 },
    inner_radius: 20.0,
    outer_radius: 90.0,
    label_radius: 55.0,
    rotate_labels: false,
};

/// Secondary ring around a hub filled with the selected core's color.
pub const SECONDARY_WHEEL: WheelSpec = WheelSpec {
    center: Point { x: 100.0, y: 100.0 },
    inner_radius: 40.0,
    outer_radius: 80.0,
    label_radius: 60.0,
    rotate_labels: true,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// One option to place on a ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice<'a> {
    pub id: &'static str,
    pub label: &'a str,
    pub color: &'static str,
    pub selected: bool,
}

/// Render data for one slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wedge {
    pub id: &'static str,
    pub label: String,
    pub color: &'static str,
    pub selected: bool,
    /// SVG path data (`M ... Z`).
    pub path: String,
    pub label_anchor: Point,
    /// Degrees; 0 when the ring does not rotate labels.
    pub label_rotation: f64,
}

/// Lays out `slices` as equal-angle wedges of `spec`.
pub fn layout_wedges(spec: &WheelSpec, slices: &[Slice<'_>]) -> Vec<Wedge> {
    if slices.is_empty() {
        return Vec::new();
    }
    let sweep = 360.0 / slices.len() as f64;

    slices
        .iter()
        .enumerate()
        .map(|(index, slice)| {
            let start = index as f64 * sweep;
            let end = start + sweep;
            let mid = start + sweep / 2.0;
            Wedge {
                id: slice.id,
                label: slice.label.to_string(),
                color: slice.color,
                selected: slice.selected,
                path: wedge_path(spec, start, end),
                label_anchor: polar(spec.center, spec.label_radius, mid),
                label_rotation: if spec.rotate_labels {
                    label_rotation(mid)
                } else {
                    0.0
                },
            }
        })
        .collect()
}

fn wedge_path(spec: &WheelSpec, start_deg: f64, end_deg: f64) -> String {
    let inner_start = polar(spec.center, spec.inner_radius, start_deg);
    let inner_end = polar(spec.center, spec.inner_radius, end_deg);
    let outer_end = polar(spec.center, spec.outer_radius, end_deg);
    let outer_start = polar(spec.center, spec.outer_radius, start_deg);
    let (r, big_r) = (spec.inner_radius, spec.outer_radius);

    format!(
        "M {:.2} {:.2} L {:.2} {:.2} A {big_r} {big_r} 0 0 1 {:.2} {:.2} L {:.2} {:.2} A {r} {r} 0 0 0 {:.2} {:.2} Z",
        inner_start.x,
        inner_start.y,
        outer_start.x,
        outer_start.y,
        outer_end.x,
        outer_end.y,
        inner_end.x,
        inner_end.y,
        inner_start.x,
        inner_start.y,
    )
}

/// Point at `radius` and `angle_deg` clockwise from 12 o'clock.
fn polar(center: Point, radius: f64, angle_deg: f64) -> Point {
    let radians = angle_deg.to_radians();
    Point {
        x: center.x + radius * radians.sin(),
        y: center.y - radius * radians.cos(),
    }
}

/// Keeps labels upright: text on the left half is flipped.
fn label_rotation(mid_deg: f64) -> f64 {
    let rotation = mid_deg - 90.0;
    if rotation > 90.0 && rotation < 270.0 {
        rotation + 180.0
    } else {
        rotation
    }
}
