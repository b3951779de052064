//! Bezier geometry for pitch curves.

use crate::structure::{PitchPoint, HANDLE_OFFSET};
use egui::{Pos2, Vec2};
use std::fmt::Write;

/// One cubic segment between two neighbouring anchors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicSegment {
    pub start: Pos2,
    pub control1: Pos2,
    pub control2: Pos2,
    pub end: Pos2,
}

impl CubicSegment {
    pub fn points(&self) -> [Pos2; 4] {
        [self.start, self.control1, self.control2, self.end]
    }

    pub fn translate(&self, offset: Vec2) -> Self {
        Self {
            start: self.start + offset,
            control1: self.control1 + offset,
            control2: self.control2 + offset,
            end: self.end + offset,
        }
    }
}

/// Chains the anchors into cubic segments through their handles. A missing
/// handle is treated as a flat one [`HANDLE_OFFSET`] away from its anchor.
pub fn curve_segments(points: &[PitchPoint]) -> Vec<CubicSegment> {
    points
        .windows(2)
        .map(|pair| {
            let (from, to) = (&pair[0], &pair[1]);
            let control1 = from
                .cp1
                .map(|h| h.pos())
                .unwrap_or_else(|| Pos2::new(from.x + HANDLE_OFFSET, from.y));
            let control2 = to
                .cp2
                .map(|h| h.pos())
                .unwrap_or_else(|| Pos2::new(to.x - HANDLE_OFFSET, to.y));
            CubicSegment {
                start: from.pos(),
                control1,
                control2,
                end: to.pos(),
            }
        })
        .collect()
}

/// SVG path data (`M x,y C ...`) for the curve; empty below two points.
pub fn svg_path(points: &[PitchPoint]) -> String {
    let Some(first) = points.first() else {
        return String::new();
    };
    if points.len() < 2 {
        return String::new();
    }
    let mut path = format!("M {},{}", first.x, first.y);
    for segment in curve_segments(points) {
        let _ = write!(
            path,
            " C {},{} {},{} {},{}",
            segment.control1.x,
            segment.control1.y,
            segment.control2.x,
            segment.control2.y,
            segment.end.x,
            segment.end.y
        );
    }
    path
}
