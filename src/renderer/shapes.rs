//! Shape generation for 2D primitives
//!
//! All coordinates are canvas pixels; the pipeline maps them to NDC.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;

/// Generate vertices for a ring (hollow circle)
pub fn ring(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 6) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        let dir1 = Vec2::new(theta1.cos(), theta1.sin());
        let dir2 = Vec2::new(theta2.cos(), theta2.sin());
        let inner1 = center + dir1 * inner_radius;
        let outer1 = center + dir1 * outer_radius;
        let inner2 = center + dir2 * inner_radius;
        let outer2 = center + dir2 * outer_radius;

        // Two triangles per segment
        vertices.push(Vertex::new(inner1.x, inner1.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(inner2.x, inner2.y, color));

        vertices.push(Vertex::new(inner2.x, inner2.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(outer2.x, outer2.y, color));
    }

    vertices
}

/// Segment count that keeps a circle of this radius smooth
pub fn segments_for_radius(radius: f32) -> u32 {
    ((radius * 1.5) as u32).clamp(24, 96)
}

/// Axis-aligned filled rectangle
pub fn rect(min: Vec2, max: Vec2, color: [f32; 4]) -> [Vertex; 6] {
    [
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
    ]
}

/// Seven-segment layout per digit: a, b, c, d, e, f, g
const DIGIT_SEGMENTS: [[bool; 7]; 10] = [
    [true, true, true, true, true, true, false],     // 0
    [false, true, true, false, false, false, false], // 1
    [true, true, false, true, true, false, true],    // 2
    [true, true, true, true, false, false, true],    // 3
    [false, true, true, false, false, true, true],   // 4
    [true, false, true, true, false, true, true],    // 5
    [true, false, true, true, true, true, true],     // 6
    [true, true, true, false, false, false, false],  // 7
    [true, true, true, true, true, true, true],      // 8
    [true, true, true, true, false, true, true],     // 9
];

/// Filled quad from four corners in order
fn quad(a: Vec2, b: Vec2, c: Vec2, d: Vec2, color: [f32; 4]) -> [Vertex; 6] {
    [
        Vertex::new(a.x, a.y, color),
        Vertex::new(b.x, b.y, color),
        Vertex::new(c.x, c.y, color),
        Vertex::new(a.x, a.y, color),
        Vertex::new(c.x, c.y, color),
        Vertex::new(d.x, d.y, color),
    ]
}

/// Draw digits and `/` centered on `center` in seven-segment style.
///
/// `height` is the glyph height in pixels; width and stroke follow from it.
/// Any other character leaves an empty cell.
pub fn text_label(center: Vec2, text: &str, height: f32, color: [f32; 4]) -> Vec<Vertex> {
    let cells = text.chars().count();
    if cells == 0 {
        return Vec::new();
    }

    let width = height * 0.5;
    let stroke = (height * 0.12).max(1.0);
    let gap = height * 0.2;
    let total_width = cells as f32 * width + (cells as f32 - 1.0) * gap;

    let mut vertices = Vec::with_capacity(cells * 7 * 6);
    let top = center.y - height / 2.0;
    let mid = top + height / 2.0;
    let bottom = top + height;
    let mut left = center.x - total_width / 2.0;

    for ch in text.chars() {
        let right = left + width;

        if ch == '/' {
            vertices.extend_from_slice(&quad(
                Vec2::new(left, bottom),
                Vec2::new(left + stroke, bottom),
                Vec2::new(right, top),
                Vec2::new(right - stroke, top),
                color,
            ));
        } else if let Some(digit) = ch.to_digit(10) {
            // Segment rectangles (y grows downward)
            let bars = [
                (Vec2::new(left, top), Vec2::new(right, top + stroke)),
                (Vec2::new(right - stroke, top), Vec2::new(right, mid)),
                (Vec2::new(right - stroke, mid), Vec2::new(right, bottom)),
                (Vec2::new(left, bottom - stroke), Vec2::new(right, bottom)),
                (Vec2::new(left, mid), Vec2::new(left + stroke, bottom)),
                (Vec2::new(left, top), Vec2::new(left + stroke, mid)),
                (
                    Vec2::new(left, mid - stroke / 2.0),
                    Vec2::new(right, mid + stroke / 2.0),
                ),
            ];

            for (on, (min, max)) in DIGIT_SEGMENTS[digit as usize].iter().zip(bars) {
                if *on {
                    vertices.extend_from_slice(&rect(min, max, color));
                }
            }
        }

        left += width + gap;
    }

    vertices
}

/// Draw a non-negative integer centered on `center`
pub fn number_label(center: Vec2, value: u32, height: f32, color: [f32; 4]) -> Vec<Vertex> {
    text_label(center, &value.to_string(), height, color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_vertex_count() {
        let vertices = ring(Vec2::ZERO, 9.0, 10.0, [1.0; 4], 32);
        assert_eq!(vertices.len(), 32 * 6);
        for v in &vertices {
            let r = Vec2::from(v.position).length();
            assert!((9.0 - 1e-3..=10.0 + 1e-3).contains(&r));
        }
    }

    #[test]
    fn test_label_segment_counts() {
        // "8" lights all seven segments, "1" only two
        assert_eq!(number_label(Vec2::ZERO, 8, 20.0, [1.0; 4]).len(), 7 * 6);
        assert_eq!(number_label(Vec2::ZERO, 1, 20.0, [1.0; 4]).len(), 2 * 6);
        // "150" lights 2 + 5 + 6
        assert_eq!(number_label(Vec2::ZERO, 150, 20.0, [1.0; 4]).len(), 13 * 6);
    }

    #[test]
    fn test_label_is_centered() {
        let vertices = number_label(Vec2::new(100.0, 50.0), 88, 20.0, [1.0; 4]);
        let (min_x, max_x) = vertices.iter().fold((f32::MAX, f32::MIN), |(lo, hi), v| {
            (lo.min(v.position[0]), hi.max(v.position[0]))
        });
        assert!(((min_x + max_x) / 2.0 - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_text_label_fraction() {
        // 3 + slash + 1 + 5
        let vertices = text_label(Vec2::ZERO, "3/15", 20.0, [1.0; 4]);
        assert_eq!(vertices.len(), (5 + 1 + 2 + 5) * 6);
        assert!(text_label(Vec2::ZERO, "", 20.0, [1.0; 4]).is_empty());
        // Unknown characters only take up room
        assert_eq!(text_label(Vec2::ZERO, "1 1", 20.0, [1.0; 4]).len(), 4 * 6);
    }

    #[test]
    fn test_segments_for_radius_bounds() {
        assert_eq!(segments_for_radius(1.0), 24);
        assert_eq!(segments_for_radius(1000.0), 96);
        assert_eq!(segments_for_radius(40.0), 60);
    }
}
