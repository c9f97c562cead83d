/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use meshview_core::projection::project_to_screen;
use meshview_core::{RenderState, Rgb, Triangle, TransformTriple};
use nalgebra::Matrix4;
use std::io::Write;

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// ASCII renderer that converts 3D meshes to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    background: Rgb,
    state: RenderState,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            background: Rgb::new(0, 0, 0),
            state: RenderState::default(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn set_render_state(&mut self, state: RenderState) {
        self.state = state;
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self {
            background: self.background,
            state: self.state,
            ..Self::new(width, height)
        };
    }

    pub fn clear(&mut self, background: Rgb) {
        self.background = background;
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
    }

    /// Character at `(x, y)`, `None` outside the buffer.
    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.char_buffer[y * self.width + x])
    }

    pub fn render_triangles(&mut self, triangles: &[Triangle], transforms: &TransformTriple) {
        let mvp = transforms.mvp();
        let model_view = transforms.view * transforms.world;
        for triangle in triangles {
            self.render_triangle(triangle, &mvp, &model_view);
        }
    }

    fn render_triangle(
        &mut self,
        triangle: &Triangle,
        mvp: &Matrix4<f32>,
        model_view: &Matrix4<f32>,
    ) {
        // Project vertices to screen space
        let mut screen_coords = [(0.0, 0.0, 0.0); 3];
        for (coord, vertex) in screen_coords.iter_mut().zip(&triangle.vertices) {
            match project_to_screen(mvp, &vertex.position, self.width, self.height) {
                Some(projected) => *coord = projected,
                None => return, // Triangle is clipped
            }
        }

        // Shade by how squarely the face looks at the camera (view-space Z)
        let normal = model_view.transform_vector(&triangle.calculate_normal());
        let facing = normal.try_normalize(f32::EPSILON).map_or(0.0, |n| n.z.abs());
        let ambient = self.state.ambient.clamp(0.0, 1.0);
        let brightness = ambient + (1.0 - ambient) * facing;

        // Map brightness to character
        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
        let char_index = char_index.min(LUMINOSITY_RAMP.len() - 1);
        let character = LUMINOSITY_RAMP[char_index];

        self.rasterize_triangle(&screen_coords, character);
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], character: char) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        // Scanline rasterization
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                // Barycentric coordinates
                if let Some((w0, w1, w2)) = barycentric(
                    (v0.0, v0.1),
                    (v1.0, v1.1),
                    (v2.0, v2.1),
                    (px, py),
                ) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        // Interpolate depth
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;

                        let idx = y as usize * self.width + x as usize;
                        if !self.state.depth_test || depth < self.depth_buffer[idx] {
                            self.depth_buffer[idx] = depth;
                            self.char_buffer[idx] = character;
                        }
                    }
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let background = to_color(self.background);
        let light_background = luminance(self.background) > 0.5;
        writer.queue(SetBackgroundColor(background))?;
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                let c = self.char_buffer[idx];

                // Color based on character intensity
                let color = match (c, light_background) {
                    (' ' | '.' | ':', false) => Color::DarkGrey,
                    ('-' | '=', false) => Color::Grey,
                    ('+' | '*', false) => Color::White,
                    ('#' | '%' | '@', false) => Color::Cyan,
                    (' ' | '.' | ':', true) => Color::Grey,
                    ('-' | '=', true) => Color::DarkGrey,
                    ('+' | '*', true) => Color::DarkBlue,
                    (_, true) => Color::Black,
                    _ => Color::White,
                };

                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
            writer.queue(Print("\r\n"))?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

fn luminance(rgb: Rgb) -> f32 {
    (0.2126 * rgb.r as f32 + 0.7152 * rgb.g as f32 + 0.0722 * rgb.b as f32) / 255.0
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshview_core::primitives::cuboid;
    use meshview_core::{Camera, Transform};
    use nalgebra::{Point3, Vector3};

    fn facing_box() -> TransformTriple {
        let camera =
            Camera::looking_at(Point3::new(0.0, 0.0, -5.0), Point3::origin()).with_aspect(2.0);
        TransformTriple {
            world: Transform::translation_matrix(&Vector3::zeros()),
            view: camera.view_matrix(),
            projection: camera.projection_matrix(),
        }
    }

    #[test]
    fn test_box_covers_center_with_bright_front_face() {
        let mut renderer = AsciiRenderer::new(40, 20);
        renderer.clear(Rgb::BLUE);
        renderer.render_triangles(&cuboid(2.0, 2.0, 2.0), &facing_box());

        assert!(matches!(renderer.char_at(20, 10), Some('%' | '@')));
        assert_eq!(renderer.char_at(0, 0), Some(' '));
        assert_eq!(renderer.char_at(40, 0), None);
    }

    #[test]
    fn test_clear_resets_buffers() {
        let mut renderer = AsciiRenderer::new(40, 20);
        renderer.render_triangles(&cuboid(2.0, 2.0, 2.0), &facing_box());
        renderer.clear(Rgb::WHITE);
        assert!((0..20).all(|y| (0..40).all(|x| renderer.char_at(x, y) == Some(' '))));
    }

    #[test]
    fn test_resize_keeps_state() {
        let mut renderer = AsciiRenderer::new(4, 4);
        renderer.set_render_state(RenderState {
            depth_test: false,
            ambient: 0.5,
        });
        renderer.resize(10, 3);
        assert_eq!((renderer.width(), renderer.height()), (10, 3));
        assert!(!renderer.state.depth_test);
    }

    #[test]
    fn test_draw_emits_every_row() {
        let renderer = AsciiRenderer::new(3, 2);
        let mut out = Vec::new();
        renderer.draw(&mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert_eq!(text.matches("\r\n").count(), 2);
    }

    #[test]
    fn test_barycentric_degenerate() {
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (0.5, 0.5)).is_none());
    }
}
