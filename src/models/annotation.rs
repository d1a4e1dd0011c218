// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the rectangle annotation, the key that groups
//! annotations per video frame, and the cosmetic helpers (palette and
//! name sanitizing) that go with them.

use crate::util::geometry::{Bounds, Point};

/// Display palette, indexed by [`color_index`].
pub const PALETTE: [[u8; 3]; 16] = [
    [185, 219, 63],
    [221, 55, 83],
    [127, 67, 183],
    [51, 94, 224],
    [244, 206, 17],
    [99, 252, 255],
    [70, 233, 242],
    [7, 130, 62],
    [242, 212, 19],
    [223, 50, 229],
    [47, 183, 65],
    [216, 121, 73],
    [45, 49, 173],
    [49, 206, 196],
    [194, 201, 2],
    [81, 194, 198],
];

/// Palette slot for a rectangle anchored at `(x, y)`.
///
/// `x mod 4` fills the two high bits and `y mod 4` the two low bits, using
/// the integer part of each coordinate.
pub fn color_index(x: f64, y: f64) -> usize {
    let quad = |v: f64| -> usize {
        if v.is_finite() {
            v.floor().rem_euclid(4.0) as usize
        } else {
            0
        }
    };
    (quad(x) << 2) | quad(y)
}

/// Restrict a label to `[-0-9A-Za-z ]`, lower-case it and turn spaces into
/// hyphens.
pub fn sanitize_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == ' ')
        .map(|c| if c == ' ' { '-' } else { c.to_ascii_lowercase() })
        .collect()
}

/// Identifies the set of annotations shown together.
///
/// Images use [`FrameKey::Still`]. Videos key by playback timestamp,
/// rounded to the microsecond so that it can be ordered and compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FrameKey {
    Still,
    At(i64),
}

impl FrameKey {
    /// Key for a playback timestamp in seconds.
    pub fn from_time(seconds: f64) -> Self {
        if seconds.is_finite() {
            FrameKey::At((seconds * 1_000_000.0).round() as i64)
        } else {
            FrameKey::At(0)
        }
    }

    /// Timestamp in seconds, if this key belongs to a video frame.
    pub fn seconds(&self) -> Option<f64> {
        match self {
            FrameKey::Still => None,
            FrameKey::At(us) => Some(*us as f64 / 1_000_000.0),
        }
    }
}

/// A rectangle pinned to the media, in media coordinates.
///
/// `(x1, y1)` is where the drag started and `(x2, y2)` follows the pointer,
/// so the corners are not ordered. Use [`Rectangle::bounds`] for a
/// normalized view.
#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub name: Option<String>,
    pub hovered: bool,
    /// Id of the name label checked out for this rectangle, if any.
    pub label: Option<usize>,
}

impl Rectangle {
    /// A zero-size rectangle with both corners at `at`.
    pub fn new(at: Point) -> Self {
        Self::from_corners(at, at)
    }

    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x1: a.x,
            y1: a.y,
            x2: b.x,
            y2: b.y,
            name: None,
            hovered: false,
            label: None,
        }
    }

    pub fn anchor(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn corner(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    /// Move the free corner.
    pub fn set_corner(&mut self, p: Point) {
        self.x2 = p.x;
        self.y2 = p.y;
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_corners(self.anchor(), self.corner())
    }

    /// True when the rectangle covers no area.
    pub fn is_degenerate(&self) -> bool {
        self.bounds().area() <= 0.0
    }

    pub fn color_index(&self) -> usize {
        color_index(self.x1, self.y1)
    }

    pub fn color(&self) -> [u8; 3] {
        PALETTE[self.color_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Person A"), "person-a");
        assert_eq!(sanitize_name("Car #2 (red)"), "car-2-red");
        assert_eq!(sanitize_name("a  b"), "a--b");
        assert_eq!(sanitize_name("!!!"), "");
    }

    #[test]
    fn test_color_index_is_deterministic() {
        assert_eq!(color_index(0.0, 0.0), 0);
        assert_eq!(color_index(1.0, 2.0), 6);
        assert_eq!(color_index(3.0, 3.0), 15);
        assert_eq!(color_index(7.9, 4.2), 12);
        assert_eq!(color_index(5.0, 9.0), color_index(1.0, 1.0));
        for x in 0..8 {
            for y in 0..8 {
                assert!(color_index(x as f64, y as f64) < PALETTE.len());
            }
        }
    }

    #[test]
    fn test_frame_key_ordering() {
        let a = FrameKey::from_time(1.0);
        let b = FrameKey::from_time(1.0 + 1e-9);
        let c = FrameKey::from_time(2.5);
        assert_eq!(a, b);
        assert!(a < c);
        assert_eq!(c.seconds(), Some(2.5));
        assert_eq!(FrameKey::Still.seconds(), None);
    }

    #[test]
    fn test_rectangle_keeps_drag_direction() {
        let mut rect = Rectangle::new(Point::new(50.0, 40.0));
        assert!(rect.is_degenerate());

        rect.set_corner(Point::new(10.0, 20.0));
        assert_eq!(rect.x1, 50.0);
        assert_eq!(rect.x2, 10.0);

        let b = rect.bounds();
        assert_eq!((b.left, b.top, b.right, b.bottom), (10.0, 20.0, 50.0, 40.0));
        assert!(!rect.is_degenerate());
    }
}
