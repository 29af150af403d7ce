use std::path::PathBuf;

use clap::Parser;
use hexglow::prelude::*;

mod icons;

/// Animated hexagonal doodle backdrop
#[derive(Parser, Debug)]
#[command(name = "hexglow-viewer")]
#[command(version, about, long_about = None)]
struct Args {
    /// Engine config (YAML); reloaded whenever it changes on disk
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Start in this theme instead of the saved or system one
    #[arg(short = 't', long, value_name = "light|dark")]
    theme: Option<Theme>,

    /// Fixed RNG seed for reproducible layouts
    #[arg(long)]
    seed: Option<u64>,

    /// Frames per second
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Logical window width
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Logical window height
    #[arg(long, requires = "width")]
    height: Option<u32>,
}

fn main() {
    let args = Args::parse();
    init_logger();

    let mut config = match args.config.as_ref() {
        Some(path) => EngineConfig::load(path).unwrap_or_else(|err| {
            error!("{}", err);
            std::process::exit(1);
        }),
        None => EngineConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let mut options = RunOptions::new(icons::catalog());
    options.config = config;
    options.config_path = args.config;
    options.theme = args.theme;
    options.fps = args.fps;
    options.size = args.width.zip(args.height);

    if let Err(err) = run(options) {
        error!("runtime failed: {}", err);
        std::process::exit(1);
    }
}
