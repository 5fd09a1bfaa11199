//! Rasterizer: points, fills, lines, rectangles, circles.
//!
//! Lines and circles are generated into a bounded [`PointList`] and then
//! handed to the run optimizer, which collapses same-row runs of
//! consecutive columns into single window fills. When the list fills up it
//! is flushed and generation continues; nothing is truncated.

use display_interface::WriteOnlyDataCommand;
use embedded_graphics::{pixelcolor::Rgb565, prelude::Point};
use heapless::Vec;

use crate::st7789::{Error, St7789};

/// Scratch capacity for generated points.
pub const POINT_LIST_CAPACITY: usize = 512;

/// Circle generation flushes once this many points are pending.
pub const CIRCLE_FLUSH_AT: usize = 500;

/// Line runs longer than this go straight to `fill_rect`.
pub const LINE_RUN_THRESHOLD: usize = 3;

const _: () = assert!(CIRCLE_FLUSH_AT + 8 <= POINT_LIST_CAPACITY);

/// Call-local point scratch.
pub type PointList = Vec<Point, POINT_LIST_CAPACITY>;

/// Integer Bresenham walk from `start` to `end`, both inclusive.
#[derive(Clone, Debug)]
pub struct Bresenham {
    cur: Point,
    end: Point,
    dx: i32,
    dy: i32,
    sx: i32,
    sy: i32,
    err: i32,
    done: bool,
}

impl Bresenham {
    pub fn new(start: Point, end: Point) -> Self {
        let dx = (end.x - start.x).abs();
        let dy = -(end.y - start.y).abs();
        Self {
            cur: start,
            end,
            dx,
            dy,
            sx: if start.x < end.x { 1 } else { -1 },
            sy: if start.y < end.y { 1 } else { -1 },
            err: dx + dy,
            done: false,
        }
    }
}

impl Iterator for Bresenham {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.done {
            return None;
        }
        let p = self.cur;
        if p == self.end {
            self.done = true;
        } else {
            let e2 = 2 * self.err;
            if e2 >= self.dy {
                self.err += self.dy;
                self.cur.x += self.sx;
            }
            if e2 <= self.dx {
                self.err += self.dx;
                self.cur.y += self.sy;
            }
        }
        Some(p)
    }
}

/// Midpoint circle steps; each item is the 8 symmetric points of one step.
#[derive(Clone, Debug)]
pub struct MidpointCircle {
    center: Point,
    a: i32,
    b: i32,
    d: i32,
}

impl MidpointCircle {
    pub fn new(center: Point, radius: u16) -> Self {
        let r = radius as i32;
        Self {
            center,
            a: 0,
            b: r,
            d: 3 - 2 * r,
        }
    }
}

impl Iterator for MidpointCircle {
    type Item = [Point; 8];

    fn next(&mut self) -> Option<[Point; 8]> {
        if self.a > self.b {
            return None;
        }
        let (a, b) = (self.a, self.b);
        let Point { x: cx, y: cy } = self.center;
        let step = [
            Point::new(cx + a, cy - b),
            Point::new(cx + b, cy - a),
            Point::new(cx + b, cy + a),
            Point::new(cx + a, cy + b),
            Point::new(cx - a, cy + b),
            Point::new(cx - b, cy + a),
            Point::new(cx - a, cy - b),
            Point::new(cx - b, cy - a),
        ];

        if self.d < 0 {
            self.d += 4 * a + 6;
        } else {
            self.d += 10 + 4 * (a - b);
            self.b -= 1;
        }
        self.a += 1;
        Some(step)
    }
}

/// Length of the run starting at `points[0]`: same y, x stepping by exactly 1.
pub fn run_length(points: &[Point]) -> usize {
    let Some(first) = points.first() else {
        return 0;
    };
    1 + points
        .windows(2)
        .take_while(|w| w[1].y == first.y && w[1].x == w[0].x + 1)
        .count()
}

impl<'buf, DI> St7789<'buf, DI>
where
    DI: WriteOnlyDataCommand,
{
    /// One pixel.
    pub fn draw_point(&mut self, x: u16, y: u16, color: Rgb565) -> Result<(), Error> {
        self.set_cursor(x, y)?;
        self.stream_solid(color, 1)
    }

    /// Solid rectangle between two inclusive corners, in any order.
    pub fn fill_rect(
        &mut self,
        x1: u16,
        y1: u16,
        x2: u16,
        y2: u16,
        color: Rgb565,
    ) -> Result<(), Error> {
        let (x0, x1) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let (y0, y1) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        self.set_window_corners(x0, y0, x1, y1)?;
        let count = (x1 - x0 + 1) as usize * (y1 - y0 + 1) as usize;
        self.stream_solid(color, count)
    }

    /// Straight line between two on-surface endpoints.
    ///
    /// Horizontal and vertical lines are a single fill. Anything else is
    /// walked with Bresenham and batched through the run optimizer.
    pub fn draw_line(
        &mut self,
        x1: u16,
        y1: u16,
        x2: u16,
        y2: u16,
        color: Rgb565,
    ) -> Result<(), Error> {
        let surface = *self.surface();
        if !surface.contains(x1, y1) || !surface.contains(x2, y2) {
            return Err(Error::OutOfBounds);
        }
        if x1 == x2 || y1 == y2 {
            return self.fill_rect(x1, y1, x2, y2, color);
        }

        let start = Point::new(x1 as i32, y1 as i32);
        let end = Point::new(x2 as i32, y2 as i32);
        let mut walk = Bresenham::new(start, end).peekable();
        while walk.peek().is_some() {
            let pts: PointList = walk.by_ref().take(POINT_LIST_CAPACITY).collect();
            self.draw_line_runs(&pts, color)?;
        }
        Ok(())
    }

    // Long runs become fills; everything between them goes through
    // draw_points in one slice.
    fn draw_line_runs(&mut self, pts: &[Point], color: Rgb565) -> Result<(), Error> {
        let mut pending = 0usize;
        let mut i = 0usize;
        while i < pts.len() {
            let len = run_length(&pts[i..]);
            if len > LINE_RUN_THRESHOLD {
                self.draw_points(&pts[pending..i], color)?;
                self.draw_run(pts[i], pts[i + len - 1], color)?;
                pending = i + len;
            }
            i += len;
        }
        self.draw_points(&pts[pending..], color)
    }

    /// Rectangle outline: top, left, bottom, right edges.
    pub fn draw_rect(
        &mut self,
        x1: u16,
        y1: u16,
        x2: u16,
        y2: u16,
        color: Rgb565,
    ) -> Result<(), Error> {
        self.draw_line(x1, y1, x2, y1, color)?;
        self.draw_line(x1, y1, x1, y2, color)?;
        self.draw_line(x1, y2, x2, y2, color)?;
        self.draw_line(x2, y1, x2, y2, color)
    }

    /// Circle outline (midpoint algorithm). Parts off the surface are dropped.
    pub fn draw_circle(&mut self, cx: u16, cy: u16, r: u16, color: Rgb565) -> Result<(), Error> {
        let center = Point::new(cx as i32, cy as i32);
        let mut pts = PointList::new();
        for step in MidpointCircle::new(center, r) {
            // below CIRCLE_FLUSH_AT before, so one step always fits
            pts.extend(step);
            if pts.len() >= CIRCLE_FLUSH_AT {
                self.draw_points(&pts, color)?;
                pts.clear();
            }
        }
        self.draw_points(&pts, color)
    }

    /// Draw a point set, collapsing runs.
    ///
    /// Off-surface points are discarded. A single left-to-right pass groups
    /// points that share y with x increasing by exactly 1; any break ends the
    /// run. Runs longer than one pixel are one fill, lone points one
    /// `draw_point`. Input order is kept as given.
    pub fn draw_points(&mut self, points: &[Point], color: Rgb565) -> Result<(), Error> {
        let surface = *self.surface();
        let mut run: Option<(Point, Point)> = None;

        for &p in points.iter().filter(|p| surface.contains_point(**p)) {
            run = match run {
                Some((start, last)) if p.y == start.y && p.x == last.x + 1 => Some((start, p)),
                Some((start, last)) => {
                    self.draw_run(start, last, color)?;
                    Some((p, p))
                }
                None => Some((p, p)),
            };
        }
        if let Some((start, last)) = run {
            self.draw_run(start, last, color)?;
        }
        Ok(())
    }

    // Caller guarantees both ends are on-surface and on the same row.
    fn draw_run(&mut self, start: Point, last: Point, color: Rgb565) -> Result<(), Error> {
        if start == last {
            self.draw_point(start.x as u16, start.y as u16, color)
        } else {
            self.fill_rect(start.x as u16, start.y as u16, last.x as u16, start.y as u16, color)
        }
    }
}
