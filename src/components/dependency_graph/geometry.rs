use std::ops::{Add, Mul, Sub};

/// Shorter than this, two centres are treated as coincident.
pub const MIN_EDGE_LENGTH: f64 = 0.001;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn length(self) -> f64 {
		(self.x * self.x + self.y * self.y).sqrt()
	}

	pub fn distance(self, other: Point) -> f64 {
		(other - self).length()
	}

	pub fn is_finite(self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}
}

impl Add for Point {
	type Output = Point;

	fn add(self, rhs: Point) -> Point {
		Point::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl Sub for Point {
	type Output = Point;

	fn sub(self, rhs: Point) -> Point {
		Point::new(self.x - rhs.x, self.y - rhs.y)
	}
}

impl Mul<f64> for Point {
	type Output = Point;

	fn mul(self, k: f64) -> Point {
		Point::new(self.x * k, self.y * k)
	}
}

/// Deterministic unit vector for a pair of coincident nodes.
pub fn fallback_direction(a: usize, b: usize) -> Point {
	let angle = ((a as f64) * 0.618_034 + (b as f64) * 0.414_214) * std::f64::consts::TAU;
	Point::new(angle.cos(), angle.sin())
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeLine {
	pub start: Point,
	pub end: Point,
}

impl EdgeLine {
	/// SVG path data for the segment.
	pub fn path_data(&self) -> String {
		format!(
			"M{},{}L{},{}",
			self.start.x, self.start.y, self.end.x, self.end.y
		)
	}
}

/// Segment from the rim of the source circle to just outside the target circle.
///
/// Returns `None` for coincident centres (self-loops, stacked nodes), which
/// have no direction to pad along.
pub fn padded_edge(
	source: Point,
	target: Point,
	source_padding: f64,
	target_padding: f64,
) -> Option<EdgeLine> {
	let delta = target - source;
	let dist = delta.length();
	if dist < MIN_EDGE_LENGTH {
		return None;
	}

	let unit = delta * (1.0 / dist);
	Some(EdgeLine {
		start: source + unit * source_padding,
		end: target - unit * target_padding,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn horizontal_edge_is_padded_at_both_ends() {
		let line = padded_edge(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 5.0, 7.0).unwrap();
		assert_eq!(line.start, Point::new(5.0, 0.0));
		assert_eq!(line.end, Point::new(3.0, 0.0));
		assert_eq!(line.path_data(), "M5,0L3,0");
	}

	#[test]
	fn diagonal_edge_follows_unit_vector() {
		let line = padded_edge(Point::new(0.0, 0.0), Point::new(30.0, 40.0), 5.0, 7.0).unwrap();
		assert!((line.start.x - 3.0).abs() < 1e-9);
		assert!((line.start.y - 4.0).abs() < 1e-9);
		assert!((line.end.x - (30.0 - 4.2)).abs() < 1e-9);
		assert!((line.end.y - (40.0 - 5.6)).abs() < 1e-9);
	}

	#[test]
	fn coincident_centres_have_no_geometry() {
		let p = Point::new(12.0, -3.0);
		assert_eq!(padded_edge(p, p, 5.0, 7.0), None);
	}

	#[test]
	fn fallback_direction_is_unit_length() {
		for (a, b) in [(0, 1), (3, 7), (12, 2)] {
			assert!((fallback_direction(a, b).length() - 1.0).abs() < 1e-9);
		}
	}
}
