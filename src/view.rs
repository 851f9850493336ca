use image::RgbImage;
use log::debug;
use rand::Rng;
use rayon::prelude::*;

use crate::camera::Camera;
use crate::color::Color;
use crate::direction::Direction;
use crate::error::{Result, RtError};
use crate::output::{ImageOutputSink, OutputSink};
use crate::point::Point;
use crate::ray::Ray;
use crate::scene::Scene;
use crate::shader::LightingModel;

/// Pixel-space render bounds (§3, §4.I): `[left, right) x [top, bottom)`.
#[derive(Debug, Clone, Copy)]
pub struct PixelRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl PixelRect {
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> PixelRect {
        PixelRect { left, top, right, bottom }
    }

    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }
}

/// View-plane world-space bounds a `PixelRect` maps onto (§3, §4.I).
#[derive(Debug, Clone, Copy)]
pub struct ViewRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl ViewRect {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> ViewRect {
        ViewRect { left, top, right, bottom }
    }
}

/// Antialiasing strategy (§4.I). `EdgeDetect` forces the single-threaded path
/// in `render`, since its `rerender` pass depends on already-finalized
/// neighbour colours (§5).
#[derive(Debug, Clone, Copy)]
pub enum AntiAlias {
    None,
    Grid { nx: u32, ny: u32 },
    Stochastic { samples: u32 },
    EdgeDetect { nx: u32, ny: u32, stochastic: bool, threshold: f64 },
}

pub const DEFAULT_EDGE_DETECT_THRESHOLD: f64 = 0.3;

/// A camera plus the rectangle mapping it renders into and how. Grounded on
/// the legacy `system::Camera`'s pixel-sampling loop, generalized into its
/// own type since a `Scene` can now own more than one (§3, §4.F).
pub struct View {
    camera: Camera,
    screen_distance: f64,
    physical_rect: PixelRect,
    view_rect: ViewRect,
    antialias: AntiAlias,
    lighting_model: LightingModel,
    multiprocessing: bool,
    max_processes: Option<usize>,
}

impl View {
    /// The "centered" form (§6 `view_create`): eye on the -z axis at `eye_z`.
    pub fn centered(eye_z: f64, physical_rect: PixelRect, view_rect: ViewRect, lighting_model: LightingModel) -> View {
        View {
            camera: Camera::centered(eye_z),
            screen_distance: eye_z,
            physical_rect,
            view_rect,
            antialias: AntiAlias::None,
            lighting_model,
            multiprocessing: false,
            max_processes: None,
        }
    }

    /// The look-at form (§4.I): `view_width` is the world width of the
    /// view-plane rectangle at the screen; its height follows the physical
    /// rect's aspect ratio.
    #[allow(clippy::too_many_arguments)]
    pub fn look_at(
        eye: Point,
        look_at: Point,
        view_width: f64,
        eye_distance_to_screen: f64,
        z_rotation: Option<f64>,
        scale: Option<Direction>,
        physical_rect: PixelRect,
        lighting_model: LightingModel,
    ) -> View {
        let aspect = physical_rect.height() as f64 / physical_rect.width().max(1) as f64;
        let half_w = view_width * 0.5;
        let half_h = half_w * aspect;
        let view_rect = ViewRect::new(-half_w, -half_h, half_w, half_h);
        View {
            camera: Camera::look_at(eye, look_at, z_rotation, scale),
            screen_distance: eye_distance_to_screen,
            physical_rect,
            view_rect,
            antialias: AntiAlias::None,
            lighting_model,
            multiprocessing: false,
            max_processes: None,
        }
    }

    pub fn with_antialias(mut self, antialias: AntiAlias) -> View {
        self.antialias = antialias;
        self
    }

    /// Enables rayon-parallel pixel dispatch, optionally pinned to
    /// `max_processes` worker threads (§6 `view_set_multiprocessing`). Has no
    /// effect on an `EdgeDetect` view, which always renders single-threaded.
    pub fn with_multiprocessing(mut self, max_processes: Option<usize>) -> View {
        self.multiprocessing = true;
        self.max_processes = max_processes;
        self
    }

    /// Generates the primary ray through pixel-space point `(px, py)`
    /// (fractional for antialiasing sub-samples), per §4.I's formula: map the
    /// point onto the view rectangle in the camera's canonical local space
    /// (eye at the local origin, looking down +z) and let the camera's
    /// transform carry both origin and direction into world space.
    fn primary_ray(&self, px: f64, py: f64) -> Ray {
        let u = (px - self.physical_rect.left as f64) / self.physical_rect.width() as f64;
        let v = (py - self.physical_rect.top as f64) / self.physical_rect.height() as f64;
        let vx = self.view_rect.left + u * (self.view_rect.right - self.view_rect.left);
        let vy = self.view_rect.top + v * (self.view_rect.bottom - self.view_rect.top);
        let local_direction = Direction::new(vx, vy, self.screen_distance);
        let origin = self.camera.transform.point_to_world(Point::zero());
        let direction = self.camera.transform.direction_to_world(local_direction);
        Ray::primary(origin, direction)
    }
}

fn shade_at(scene: &Scene, view: &View, px: f64, py: f64) -> Color {
    let ray = view.primary_ray(px, py);
    match scene.test_intersect(&ray, &[]) {
        Some(hit) => view.lighting_model.shade(scene, hit),
        None => view.lighting_model.background(),
    }
}

fn grid_sample(scene: &Scene, view: &View, x: u32, y: u32, nx: u32, ny: u32) -> Color {
    let mut total = Color::black();
    for j in 0..ny {
        for i in 0..nx {
            let px = x as f64 + (i as f64 + 0.5) / nx as f64;
            let py = y as f64 + (j as f64 + 0.5) / ny as f64;
            total += shade_at(scene, view, px, py);
        }
    }
    total / (nx * ny) as f64
}

fn stochastic_sample(scene: &Scene, view: &View, x: u32, y: u32, samples: u32) -> Color {
    let mut rng = rand::thread_rng();
    let mut total = Color::black();
    for _ in 0..samples {
        let px = x as f64 + rng.gen::<f64>();
        let py = y as f64 + rng.gen::<f64>();
        total += shade_at(scene, view, px, py);
    }
    total / samples as f64
}

fn sample_pixel(scene: &Scene, view: &View, x: u32, y: u32) -> Color {
    match view.antialias {
        AntiAlias::None | AntiAlias::EdgeDetect { .. } => shade_at(scene, view, x as f64 + 0.5, y as f64 + 0.5),
        AntiAlias::Grid { nx, ny } => grid_sample(scene, view, x, y, nx, ny),
        AntiAlias::Stochastic { samples } => stochastic_sample(scene, view, x, y, samples),
    }
}

fn render_flat(scene: &Scene, view: &View, width: u32, height: u32) -> Vec<(u32, u32, Color)> {
    let coords: Vec<(u32, u32)> = (0..height).flat_map(|y| (0..width).map(move |x| (x, y))).collect();
    let compute = |&(x, y): &(u32, u32)| (x, y, sample_pixel(scene, view, x, y));
    if !view.multiprocessing {
        return coords.iter().map(compute).collect();
    }
    match view.max_processes {
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build().expect("failed to build thread pool");
            pool.install(|| coords.par_iter().map(compute).collect())
        }
        None => coords.par_iter().map(compute).collect(),
    }
}

fn channel_delta(a: Color, b: Color) -> f64 {
    (a.r - b.r).abs().max((a.g - b.g).abs()).max((a.b - b.b).abs())
}

fn neighbours(x: u32, y: u32, width: u32, height: u32) -> Vec<(u32, u32)> {
    let mut out = Vec::with_capacity(8);
    for dy in -1i32..=1 {
        for dx in -1i32..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if nx >= 0 && ny >= 0 && (nx as u32) < width && (ny as u32) < height {
                out.push((nx as u32, ny as u32));
            }
        }
    }
    out
}

/// Single-threaded edge-detect AA (§4.I, §5): render a no-AA base pass, then
/// walk it in raster order re-rendering (with the grid/stochastic sampler)
/// any pixel whose base colour differs from a neighbour's by more than
/// `threshold`, blending the AA result in at weight `n/(n+1)` against the
/// original sample's `1/(n+1)`. A pixel is re-rendered at most once: once
/// finalized, its blended colour is authoritative even if a later neighbour
/// would have flagged it again, which is what keeps the strategy
/// deterministic. Re-rendering a pixel can newly exceed the threshold against
/// a neighbour that itself hasn't been checked yet; those are queued onto
/// `deferred` and swept after the main pass.
#[allow(clippy::too_many_arguments)]
fn render_edge_detect(scene: &Scene, view: &View, nx: u32, ny: u32, stochastic: bool, threshold: f64, width: u32, height: u32) -> Vec<Vec<Color>> {
    let mut base = vec![vec![Color::black(); width as usize]; height as usize];
    for y in 0..height {
        for x in 0..width {
            base[y as usize][x as usize] = shade_at(scene, view, x as f64 + 0.5, y as f64 + 0.5);
        }
    }
    let mut final_colours = base.clone();
    let mut finalized = vec![vec![false; width as usize]; height as usize];
    let samples = (nx * ny).max(1) as f64;
    let aa_weight = samples / (samples + 1.0);
    let orig_weight = 1.0 / (samples + 1.0);

    let rerender_one = |x: u32, y: u32, final_colours: &mut Vec<Vec<Color>>, finalized: &mut Vec<Vec<bool>>| {
        if finalized[y as usize][x as usize] {
            return;
        }
        let aa_colour = if stochastic { stochastic_sample(scene, view, x, y, nx * ny) } else { grid_sample(scene, view, x, y, nx, ny) };
        final_colours[y as usize][x as usize] = aa_colour * aa_weight + base[y as usize][x as usize] * orig_weight;
        finalized[y as usize][x as usize] = true;
    };

    let mut deferred: Vec<(u32, u32)> = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let c = base[y as usize][x as usize];
            let exceeds = neighbours(x, y, width, height).iter().any(|&(nx2, ny2)| channel_delta(c, base[ny2 as usize][nx2 as usize]) > threshold);
            if !exceeds {
                continue;
            }
            rerender_one(x, y, &mut final_colours, &mut finalized);
            let new_colour = final_colours[y as usize][x as usize];
            for (nx2, ny2) in neighbours(x, y, width, height) {
                if !finalized[ny2 as usize][nx2 as usize] && channel_delta(new_colour, base[ny2 as usize][nx2 as usize]) > threshold {
                    deferred.push((nx2, ny2));
                }
            }
        }
    }
    for (x, y) in deferred {
        rerender_one(x, y, &mut final_colours, &mut finalized);
    }
    final_colours
}

/// Renders `view` against `scene` into a fresh `RgbImage` (§4.F, §4.I). Every
/// non-`EdgeDetect` strategy computes the whole pixel grid as a flat buffer —
/// in parallel via rayon when the view asked for it — before any pixel is
/// committed to the `OutputSink`, so distinct-coordinate writes never race
/// (§5). `EdgeDetect` always runs single-threaded (see `render_edge_detect`).
pub fn render(scene: &Scene, view: &View) -> Result<RgbImage> {
    let width = view.physical_rect.width();
    let height = view.physical_rect.height();
    if width == 0 || height == 0 {
        return Err(RtError::Construction("view has an empty pixel rectangle".to_string()));
    }

    let mut sink = ImageOutputSink::new();
    sink.set_rectangle(width, height);

    match view.antialias {
        AntiAlias::EdgeDetect { nx, ny, stochastic, threshold } => {
            debug!("rendering {}x{} single-threaded with edge-detect AA ({}x{} samples)", width, height, nx, ny);
            let grid = render_edge_detect(scene, view, nx, ny, stochastic, threshold, width, height);
            for (y, row) in grid.into_iter().enumerate() {
                for (x, colour) in row.into_iter().enumerate() {
                    sink.set_pixel(x as u32, y as u32, colour);
                }
            }
        }
        _ => {
            debug!("rendering {}x{}, multiprocessing={}", width, height, view.multiprocessing);
            for (x, y, colour) in render_flat(scene, view, width, height) {
                sink.set_pixel(x, y, colour);
            }
        }
    }

    Ok(sink.get_output().clone())
}
