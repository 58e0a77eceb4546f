use crate::color::Rgb;
use crate::math::{apply_lighting, calculate_light_intensity, edge_function};
use crate::vertex::Vertex;

/// Draws a triangle with per-pixel lighting
pub fn draw_triangle(
    v0: &Vertex,
    v1: &Vertex,
    v2: &Vertex,
    pixel_data: &mut [u8],
    z_buffer: &mut [f64],
    width: usize,
    height: usize,
    light_pos: &[f64; 3],
    base_color: Rgb,
    ambient: f64,
) {
    if width == 0 || height == 0 {
        return;
    }

    // Compute bounding box of the triangle
    let min_x = v0
        .screen_position[0]
        .min(v1.screen_position[0])
        .min(v2.screen_position[0])
        .floor()
        .max(0.0) as usize;
    let max_x = v0
        .screen_position[0]
        .max(v1.screen_position[0])
        .max(v2.screen_position[0])
        .ceil()
        .min(width as f64 - 1.0)
        .max(0.0) as usize;
    let min_y = v0
        .screen_position[1]
        .min(v1.screen_position[1])
        .min(v2.screen_position[1])
        .floor()
        .max(0.0) as usize;
    let max_y = v0
        .screen_position[1]
        .max(v1.screen_position[1])
        .max(v2.screen_position[1])
        .ceil()
        .min(height as f64 - 1.0)
        .max(0.0) as usize;

    // Precompute area of the triangle; skip edge-on faces
    let area = edge_function(&v0.screen_position, &v1.screen_position, &v2.screen_position);
    if area.abs() < 1e-9 {
        return;
    }

    // For each pixel in the bounding box
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let px = x as f64 + 0.5;
            let py = y as f64 + 0.5;
            let p = [px, py];

            let w0 = edge_function(&v1.screen_position, &v2.screen_position, &p);
            let w1 = edge_function(&v2.screen_position, &v0.screen_position, &p);
            let w2 = edge_function(&v0.screen_position, &v1.screen_position, &p);

            // Accept either winding; orientation flips as cubes tumble
            let inside = if area > 0.0 {
                w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0
            } else {
                w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0
            };
            if inside {
                // Normalize barycentric coordinates
                let w0 = w0 / area;
                let w1 = w1 / area;
                let w2 = w2 / area;

                // Interpolate position
                let px3d = v0.position[0] * w0 + v1.position[0] * w1 + v2.position[0] * w2;
                let py3d = v0.position[1] * w0 + v1.position[1] * w1 + v2.position[1] * w2;
                let pz3d = v0.position[2] * w0 + v1.position[2] * w1 + v2.position[2] * w2;

                // Depth test
                let offset = y * width + x;
                if pz3d < z_buffer[offset] {
                    z_buffer[offset] = pz3d;

                    // Interpolate normal
                    let nx = v0.normal[0] * w0 + v1.normal[0] * w1 + v2.normal[0] * w2;
                    let ny = v0.normal[1] * w0 + v1.normal[1] * w1 + v2.normal[1] * w2;
                    let nz = v0.normal[2] * w0 + v1.normal[2] * w1 + v2.normal[2] * w2;
                    let length = (nx * nx + ny * ny + nz * nz).sqrt();
                    let interpolated_normal = [nx / length, ny / length, nz / length];

                    // Compute lighting
                    let light_intensity = calculate_light_intensity(
                        &interpolated_normal,
                        &[px3d, py3d, pz3d],
                        light_pos,
                        ambient,
                    );

                    // Compute shaded color
                    let shaded_color = apply_lighting(base_color, light_intensity);

                    // Set pixel color
                    let pixel_offset = offset * 4;
                    pixel_data[pixel_offset] = shaded_color.r;
                    pixel_data[pixel_offset + 1] = shaded_color.g;
                    pixel_data[pixel_offset + 2] = shaded_color.b;
                    pixel_data[pixel_offset + 3] = 255;
                }
            }
        }
    }
}

/// Draws a line between two points in the pixel buffer using Bresenham's
/// algorithm, blending into the existing pixels by `opacity`.
pub fn draw_line(
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    pixel_data: &mut [u8],
    width: usize,
    height: usize,
    color: Rgb,
    opacity: f64,
) {
    let (mut x0, mut y0, x1, y1) = (
        x0.round() as isize,
        y0.round() as isize,
        x1.round() as isize,
        y1.round() as isize,
    );
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy; // error value e_xy

    loop {
        if x0 >= 0 && x0 < width as isize && y0 >= 0 && y0 < height as isize {
            let offset = (y0 as usize * width + x0 as usize) * 4;
            let existing = Rgb::new(
                pixel_data[offset],
                pixel_data[offset + 1],
                pixel_data[offset + 2],
            );
            let blended = existing.lerp(color, opacity);
            pixel_data[offset] = blended.r;
            pixel_data[offset + 1] = blended.g;
            pixel_data[offset + 2] = blended.b;
            pixel_data[offset + 3] = 255;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffers(width: usize, height: usize) -> (Vec<u8>, Vec<f64>) {
        (vec![0u8; width * height * 4], vec![f64::INFINITY; width * height])
    }

    fn vertex(x: f64, y: f64, z: f64) -> Vertex {
        Vertex {
            position: [x, y, z],
            screen_position: [x, y],
            normal: [0.0, 0.0, 1.0],
        }
    }

    #[test]
    fn triangle_fills_interior_pixels() {
        let (mut pixels, mut depth) = buffers(16, 16);
        draw_triangle(
            &vertex(1.0, 1.0, 0.0),
            &vertex(14.0, 1.0, 0.0),
            &vertex(1.0, 14.0, 0.0),
            &mut pixels,
            &mut depth,
            16,
            16,
            &[0.0, 0.0, 10.0],
            Rgb::new(200, 200, 200),
            0.2,
        );
        // A pixel well inside the triangle gets written
        let offset = (3 * 16 + 3) * 4;
        assert_ne!(pixels[offset], 0);
        assert_eq!(pixels[offset + 3], 255);
    }

    #[test]
    fn nearer_triangle_wins_depth_test() {
        let (mut pixels, mut depth) = buffers(8, 8);
        let draw = |pixels: &mut [u8], depth: &mut [f64], z: f64, color: Rgb| {
            draw_triangle(
                &vertex(0.0, 0.0, z),
                &vertex(7.0, 0.0, z),
                &vertex(0.0, 7.0, z),
                pixels,
                depth,
                8,
                8,
                &[0.0, 0.0, -10.0],
                color,
                1.0,
            );
        };
        draw(&mut pixels, &mut depth, 1.0, Rgb::new(10, 10, 10));
        draw(&mut pixels, &mut depth, 5.0, Rgb::new(250, 250, 250));
        // The farther (z = 5) triangle must not overwrite the nearer one
        assert_eq!(pixels[0], 10);
    }

    #[test]
    fn reversed_winding_still_rasterizes() {
        let (mut pixels, mut depth) = buffers(16, 16);
        draw_triangle(
            &vertex(1.0, 14.0, 0.0),
            &vertex(14.0, 1.0, 0.0),
            &vertex(1.0, 1.0, 0.0),
            &mut pixels,
            &mut depth,
            16,
            16,
            &[0.0, 0.0, 10.0],
            Rgb::new(200, 200, 200),
            0.2,
        );
        let offset = (3 * 16 + 3) * 4;
        assert_ne!(pixels[offset], 0);
    }

    #[test]
    fn line_clips_to_buffer_bounds() {
        let (mut pixels, _) = buffers(4, 4);
        draw_line(-10.0, -10.0, 20.0, 20.0, &mut pixels, 4, 4, Rgb::new(255, 255, 255), 1.0);
        assert_eq!(pixels[0], 255);
    }

    #[test]
    fn line_opacity_blends_with_background() {
        let (mut pixels, _) = buffers(2, 1);
        draw_line(0.0, 0.0, 0.0, 0.0, &mut pixels, 2, 1, Rgb::new(200, 200, 200), 0.5);
        assert_eq!(pixels[0], 100);
    }
}
