use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use pbr::ProgressBar;
use rayon::ThreadPoolBuilder;

use raytracer::color::Color;
use raytracer::direction::Direction;
use raytracer::lights::{PointLight, Spotlight};
use raytracer::object::{Material, Object};
use raytracer::point::Point;
use raytracer::scene::Scene;
use raytracer::shader::{LightingModel, LightingModelOptions};
use raytracer::shapes::{Rectangle, Sphere};
use raytracer::texture::Texture;
use raytracer::transform::{Transform, TransformOptions};
use raytracer::view::{AntiAlias, PixelRect, View};

#[derive(Parser)]
#[command(version = "0.1.0", author = "Gordon Tyler <gordon@doxxx.net>", about = "Simple ray tracer")]
struct CommandLineOptions {
    /// Image width
    #[arg(long, default_value = "1024", value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,

    /// Image height
    #[arg(long, default_value = "768", value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,

    /// Number of render threads
    #[arg(short('t'), long, value_parser = clap::value_parser!(usize))]
    threads: Option<usize>,

    /// Output file path
    #[arg(short('o'), long, default_value = "out.png")]
    output: String,
}

/// Thin CLI boundary: `raytracer::error::RtError` covers the library's own
/// construction/I-O failures, `anyhow` adds the context a human reads when
/// one of those — or a poisoned thread join — reaches the top level.
fn main() -> Result<()> {
    env_logger::init();

    let opts: CommandLineOptions = CommandLineOptions::parse();
    let num_threads = opts.threads.unwrap_or_else(num_cpus::get);

    ThreadPoolBuilder::new().num_threads(num_threads).build_global().context("could not configure render thread pool")?;

    let scene = build_demo_scene(opts.width, opts.height);

    println!("Rendering {}x{} using up to {} threads.", opts.width, opts.height, num_threads);
    let start = Instant::now();

    let mut pb = ProgressBar::new(1);
    pb.show_tick = true;
    pb.message("Rendering ");

    let (done_tx, done_rx) = mpsc::channel();
    let render_thread = thread::spawn(move || {
        let result = scene.render("Main");
        done_tx.send(()).ok();
        result
    });

    while done_rx.try_recv().is_err() {
        pb.tick();
        thread::sleep(Duration::from_millis(120));
    }
    let image = render_thread
        .join()
        .map_err(|_| anyhow::anyhow!("render thread panicked"))?
        .context("render failed")?;

    pb.finish_println(&format!("Finished in {}", format_duration(start.elapsed())));

    image.save(&opts.output).with_context(|| format!("could not write output file {}", opts.output))?;
    Ok(())
}

/// A small hardcoded scene standing in for the legacy SDL-file demo (§3):
/// a diffuse floor, a mirrored sphere, a glass sphere, a point light, and a
/// spotlight, viewed with a look-at camera and grid antialiasing.
fn build_demo_scene(width: u32, height: u32) -> Scene {
    let mut scene = Scene::new(true, raytracer::scene::DEFAULT_SPLIT_THRESHOLD).with_max_reflections(4);

    let floor = Object::new(
        Box::new(Rectangle::new(-20.0, 20.0, -20.0, 20.0)),
        Transform::new(TransformOptions::new().rotate(Direction::new(1.0, 0.0, 0.0), 90.0).translate(Direction::new(0.0, -2.0, 0.0))),
        vec![Material::new(
            Texture::ColourBands(vec![Color::new(0.8, 0.8, 0.8), Color::new(0.2, 0.2, 0.2)]),
            Texture::Solid(Color::black()),
        )],
    )
    .expect("floor material list is non-empty");
    scene.add_shape(floor, Some("Floor"));

    let mirror_sphere = Object::new(
        Box::new(Sphere::new()),
        Transform::new(TransformOptions::new().scale(Direction::new(1.5, 1.5, 1.5)).translate(Direction::new(-2.5, 0.0, 0.0))),
        vec![Material::new(Texture::Solid(Color::new(0.05, 0.05, 0.05)), Texture::Solid(Color::new(0.9, 0.9, 0.9)))],
    )
    .expect("mirror sphere material list is non-empty");
    scene.add_shape(mirror_sphere, Some("MirrorSphere"));

    let glass_sphere = Object::new(
        Box::new(Sphere::new()),
        Transform::new(TransformOptions::new().translate(Direction::new(2.0, -0.5, -1.0))),
        vec![Material::new(Texture::Solid(Color::new(0.05, 0.05, 0.1)), Texture::Solid(Color::new(0.2, 0.2, 0.2))).with_transparency(Texture::Solid(Color::new(0.85, 0.85, 0.9)))],
    )
    .expect("glass sphere material list is non-empty");
    scene.add_shape(glass_sphere, Some("GlassSphere"));

    scene.add_light(Box::new(PointLight::new(Color::white(), 0.8, Point::new(-5.0, 8.0, -6.0))), Some("Key"));
    scene.add_light(
        Box::new(Spotlight::new(
            Color::new(0.6, 0.7, 1.0),
            0.6,
            Transform::new(TransformOptions::new().rotate(Direction::new(1.0, 0.0, 0.0), 120.0).translate(Direction::new(4.0, 6.0, -8.0))),
            8,
        )),
        Some("Fill"),
    );

    let model = LightingModel::new(Color::new(0.05, 0.05, 0.06), LightingModelOptions::default());
    let view = View::look_at(
        Point::new(0.0, 2.0, -10.0),
        Point::new(0.0, 0.0, 0.0),
        8.0,
        12.0,
        None,
        None,
        PixelRect::new(0, 0, width, height),
        model,
    )
    .with_antialias(AntiAlias::Grid { nx: 2, ny: 2 })
    .with_multiprocessing(None);
    scene.add_view(view, Some("Main"));

    scene
}

fn format_duration(d: Duration) -> String {
    let total_seconds = d.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let millis = d.subsec_millis();

    let mut s = String::new();
    if hours > 0 {
        s += &format!("{}h ", hours);
    }
    if hours > 0 || minutes > 0 {
        s += &format!("{}m ", minutes);
    }
    s += &format!("{}.{:03}s", seconds, millis);
    s
}
