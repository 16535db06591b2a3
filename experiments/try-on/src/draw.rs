use {base::Vec2, fit::BodyBounds};

/// Torso outline color.
pub const TORSO_COLOR: [u8; 3] = [34, 197, 94];
const JOINT_RADIUS: i32 = 24;
const LINE_WIDTH: i32 = 8;

/// Mutable view of an RGB8 frame buffer.
pub struct Canvas<'a> {
    buf: &'a mut [u8],
    width: i32,
    height: i32,
}

impl<'a> Canvas<'a> {
    pub fn new(buf: &'a mut [u8], size: Vec2<usize>) -> Self {
        debug_assert_eq!(buf.len(), size.x * size.y * 3);
        Self {
            buf,
            width: size.x as i32,
            height: size.y as i32,
        }
    }

    /// Filled circle, clipped to the frame.
    pub fn disc(&mut self, center: Vec2<i32>, radius: i32, color: [u8; 3]) {
        let r2 = radius * radius;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= r2 {
                    self.set_pixel(center.x + dx, center.y + dy, color);
                }
            }
        }
    }

    /// Bresenham line of the given thickness, clipped to the frame first.
    pub fn line(&mut self, from: Vec2<i32>, to: Vec2<i32>, thickness: i32, color: [u8; 3]) {
        let Some((mut p, end)) = self.clip(from, to) else {
            return;
        };

        let radius = (thickness / 2).max(0);
        let dx = (end.x - p.x).abs();
        let dy = (end.y - p.y).abs();
        let sx = if p.x < end.x { 1 } else { -1 };
        let sy = if p.y < end.y { 1 } else { -1 };
        let mut err = dx - dy;

        loop {
            if radius == 0 {
                self.set_pixel(p.x, p.y, color);
            } else {
                self.disc(p, radius, color);
            }

            if p == end {
                break;
            }

            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                p.x += sx;
            }
            if e2 < dx {
                err += dx;
                p.y += sy;
            }
        }
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: [u8; 3]) {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return;
        }
        let idx = ((y * self.width + x) * 3) as usize;
        self.buf[idx..idx + 3].copy_from_slice(&color);
    }

    // Cohen-Sutherland
    fn clip(&self, mut a: Vec2<i32>, mut b: Vec2<i32>) -> Option<(Vec2<i32>, Vec2<i32>)> {
        loop {
            let code_a = self.outcode(a);
            let code_b = self.outcode(b);

            if (code_a | code_b) == 0 {
                return Some((a, b));
            }
            if (code_a & code_b) != 0 {
                return None;
            }

            let code = if code_a != 0 { code_a } else { code_b };
            let clipped = self.clip_point(a, b, code);
            if code == code_a {
                a = clipped;
            } else {
                b = clipped;
            }
        }
    }

    fn outcode(&self, p: Vec2<i32>) -> u8 {
        let mut code = INSIDE;
        if p.x < 0 {
            code |= LEFT;
        } else if p.x >= self.width {
            code |= RIGHT;
        }
        if p.y < 0 {
            code |= TOP;
        } else if p.y >= self.height {
            code |= BOTTOM;
        }
        code
    }

    fn clip_point(&self, a: Vec2<i32>, b: Vec2<i32>, code: u8) -> Vec2<i32> {
        let d = b - a;
        if code & TOP != 0 {
            Vec2::new(a.x + d.x * (0 - a.y) / d.y, 0)
        } else if code & BOTTOM != 0 {
            Vec2::new(a.x + d.x * (self.height - 1 - a.y) / d.y, self.height - 1)
        } else if code & LEFT != 0 {
            Vec2::new(0, a.y + d.y * (0 - a.x) / d.x)
        } else {
            Vec2::new(self.width - 1, a.y + d.y * (self.width - 1 - a.x) / d.x)
        }
    }
}

const INSIDE: u8 = 0;
const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const BOTTOM: u8 = 4;
const TOP: u8 = 8;

fn to_pixel(p: Vec2<f32>) -> Vec2<i32> {
    Vec2::new(p.x.round() as i32, p.y.round() as i32)
}

/// Draw the torso outline through the four (expanded) anchors.
pub fn draw_torso(canvas: &mut Canvas<'_>, bounds: &BodyBounds) {
    let ls = to_pixel(bounds.left_shoulder);
    let rs = to_pixel(bounds.right_shoulder);
    let lh = to_pixel(bounds.left_hip);
    let rh = to_pixel(bounds.right_hip);

    for (from, to) in [(ls, rs), (lh, rh), (ls, lh), (rs, rh)] {
        canvas.line(from, to, LINE_WIDTH, TORSO_COLOR);
    }
    for joint in [ls, rs, lh, rh] {
        canvas.disc(joint, JOINT_RADIUS, TORSO_COLOR);
    }
}
