use std::f64::consts::{FRAC_PI_4, SQRT_2};

use crate::actor::Actor;
use crate::color::Rgb;
use crate::config::Config;
use crate::field::Field;
use crate::graphics::{draw_line, draw_triangle};
use crate::math::{self, Mat3, Vec3};
use crate::state::AppState;
use crate::vertex::Vertex;

const GRID_COLOR: Rgb = Rgb::new(210, 210, 210);

// Unit cube corners, half a cell out from the center in each axis
const CORNERS: [Vec3; 8] = [
    [-0.5, -0.5, -0.5],
    [0.5, -0.5, -0.5],
    [0.5, 0.5, -0.5],
    [-0.5, 0.5, -0.5],
    [-0.5, -0.5, 0.5],
    [0.5, -0.5, 0.5],
    [0.5, 0.5, 0.5],
    [-0.5, 0.5, 0.5],
];

// Define cube faces (each face is defined by 4 vertex indices)
const FACES: [(usize, usize, usize, usize); 6] = [
    (0, 1, 2, 3),
    (5, 4, 7, 6),
    (4, 0, 3, 7),
    (1, 5, 6, 2),
    (4, 5, 1, 0),
    (3, 2, 6, 7),
];

/// Isometric scene renderer. Owns the pixel and depth buffers and projects
/// the field into them; it never talks to the terminal itself.
pub struct Scene {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
    depth: Vec<f64>,
    view: Mat3,
    spawn_range: i64,
    grid_opacity: f64,
    ambient: f64,
    light_pos: Vec3,
}

impl Scene {
    pub fn new(width: usize, height: usize, config: &Config) -> Self {
        // Classic isometric view: yaw the camera 45 degrees, then pitch it
        // down by atan(1/sqrt(2)) so all three axes foreshorten equally
        let tilt = (1.0 / SQRT_2).atan();
        let view = math::multiply_matrices(
            &math::rotation_about_axis(&[1.0, 0.0, 0.0], tilt),
            &math::rotation_about_axis(&[0.0, 1.0, 0.0], -FRAC_PI_4),
        );
        let extent = (config.spawn_range + 1) as f64;
        Scene {
            width,
            height,
            pixels: vec![0u8; width * height * 4],
            depth: vec![f64::INFINITY; width * height],
            view,
            spawn_range: config.spawn_range,
            grid_opacity: config.grid_opacity,
            ambient: 1.0 / config.contrast,
            light_pos: [extent * 1.5, extent * 3.0, extent * 0.5],
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels = vec![0u8; width * height * 4];
        self.depth = vec![f64::INFINITY; width * height];
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Renders one frame: background, grid, then every actor's cube.
    pub fn render(&mut self, field: &Field, background: Rgb, state: &AppState) {
        if self.width == 0 || self.height == 0 {
            return;
        }

        for pixel in self.pixels.chunks_exact_mut(4) {
            pixel[0] = background.r;
            pixel[1] = background.g;
            pixel[2] = background.b;
            pixel[3] = 255;
        }
        for depth in &mut self.depth {
            *depth = f64::INFINITY;
        }

        let min_dim = self.width.min(self.height) as f64;
        let extent = (self.spawn_range + 1) as f64;
        let scale = state.zoom * min_dim / (2.0 * SQRT_2 * extent);
        let cx = self.width as f64 / 2.0;
        let cy = self.height as f64 / 2.0;
        let light = self.to_camera(&self.light_pos);

        if state.grid {
            self.draw_grid(scale, cx, cy);
        }
        for actor in field.actors() {
            self.draw_actor(actor, scale, cx, cy, light);
        }
    }

    /// World position into camera space; z grows away from the camera so the
    /// depth buffer keeps the smallest value.
    fn to_camera(&self, point: &Vec3) -> Vec3 {
        let v = math::multiply_matrix_vector(&self.view, point);
        [v[0], v[1], -v[2]]
    }

    fn project(&self, camera: &Vec3, scale: f64, cx: f64, cy: f64) -> [f64; 2] {
        [camera[0] * scale + cx, cy - camera[1] * scale]
    }

    /// Ground-plane grid at the resting height of the cube bottoms.
    fn draw_grid(&mut self, scale: f64, cx: f64, cy: f64) {
        let n = self.spawn_range;
        let lo = -(n as f64) - 0.5;
        let hi = n as f64 + 0.5;
        for i in -n..=(n + 1) {
            let c = i as f64 - 0.5;
            for (a, b) in [([c, -0.5, lo], [c, -0.5, hi]), ([lo, -0.5, c], [hi, -0.5, c])] {
                let p0 = self.project(&self.to_camera(&a), scale, cx, cy);
                let p1 = self.project(&self.to_camera(&b), scale, cx, cy);
                draw_line(
                    p0[0],
                    p0[1],
                    p1[0],
                    p1[1],
                    &mut self.pixels,
                    self.width,
                    self.height,
                    GRID_COLOR,
                    self.grid_opacity,
                );
            }
        }
    }

    fn draw_actor(&mut self, actor: &Actor, scale: f64, cx: f64, cy: f64, light: Vec3) {
        let orientation = actor.orientation();
        let position = actor.position();

        // Transform corners through the actor pose, then into camera space
        let camera_vertices: Vec<Vec3> = CORNERS
            .iter()
            .map(|corner| {
                let world = math::add(
                    &math::multiply_matrix_vector(&orientation, corner),
                    &position,
                );
                self.to_camera(&world)
            })
            .collect();

        // Compute vertex normals
        let mut vertex_normals = vec![[0.0; 3]; CORNERS.len()];
        for &(a, b, c, d) in FACES.iter() {
            let normal = math::calculate_normal(
                &camera_vertices[a],
                &camera_vertices[b],
                &camera_vertices[c],
            );
            for &index in &[a, b, c, d] {
                vertex_normals[index][0] += normal[0];
                vertex_normals[index][1] += normal[1];
                vertex_normals[index][2] += normal[2];
            }
        }
        for normal in vertex_normals.iter_mut() {
            let length =
                (normal[0] * normal[0] + normal[1] * normal[1] + normal[2] * normal[2]).sqrt();
            normal[0] /= length;
            normal[1] /= length;
            normal[2] /= length;
        }

        // Create vertices with normals and screen positions
        let vertices: Vec<Vertex> = camera_vertices
            .iter()
            .zip(vertex_normals.iter())
            .map(|(&position, &normal)| Vertex {
                position,
                screen_position: self.project(&position, scale, cx, cy),
                normal,
            })
            .collect();

        let color = actor.color();
        for &(a, b, c, d) in FACES.iter() {
            // Triangle 1: a, b, c
            draw_triangle(
                &vertices[a],
                &vertices[b],
                &vertices[c],
                &mut self.pixels,
                &mut self.depth,
                self.width,
                self.height,
                &light,
                color,
                self.ambient,
            );
            // Triangle 2: a, c, d
            draw_triangle(
                &vertices[a],
                &vertices[c],
                &vertices[d],
                &mut self.pixels,
                &mut self.depth,
                self.width,
                self.height,
                &light,
                color,
                self.ambient,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::SimParams;
    use clap::Parser;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn test_config() -> Config {
        Config::try_parse_from(["isoroll", "--spawn-range", "3", "--actors", "6"]).unwrap()
    }

    fn test_field(config: &Config) -> Field {
        let params = SimParams {
            speed: config.speed,
            max_wait_ms: config.max_wait_ms,
            spawn_range: config.spawn_range,
            palette: config.parse_palette().unwrap(),
        };
        Field::new(params, config.actors, StdRng::seed_from_u64(5))
    }

    #[test]
    fn render_fills_background_and_draws_cubes() {
        let config = test_config();
        let field = test_field(&config);
        let mut scene = Scene::new(80, 48, &config);
        let background = Rgb::new(20, 30, 40);
        scene.render(&field, background, &AppState::new(&config));

        // A corner pixel is outside the projected field and keeps the
        // background color
        assert_eq!(scene.pixels()[0..3], [20, 30, 40]);
        // Something other than the background was drawn somewhere
        let touched = scene
            .pixels()
            .chunks_exact(4)
            .any(|p| p[0..3] != [20, 30, 40]);
        assert!(touched, "no cube or grid pixels were drawn");
    }

    #[test]
    fn resize_reallocates_buffers() {
        let config = test_config();
        let field = test_field(&config);
        let mut scene = Scene::new(80, 48, &config);
        scene.resize(10, 6);
        assert_eq!(scene.pixels().len(), 10 * 6 * 4);
        scene.render(&field, Rgb::new(0, 0, 0), &AppState::new(&config));
        assert_eq!(scene.width(), 10);
        assert_eq!(scene.height(), 6);
    }

    #[test]
    fn zero_sized_surface_is_skipped() {
        let config = test_config();
        let field = test_field(&config);
        let mut scene = Scene::new(80, 48, &config);
        scene.resize(0, 0);
        scene.render(&field, Rgb::new(0, 0, 0), &AppState::new(&config));
        assert!(scene.pixels().is_empty());
    }
}
