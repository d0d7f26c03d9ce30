/// Orbscape Terminal - the orb, ring, shards and starfield as ASCII art
///
/// Controls:
///   - Mouse: tilt the orb and ring
///   - Q/ESC/Ctrl-C: Quit

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use orbscape_core::{Scene, SceneConfig};
use orbscape_terminal::cli::Cli;
use orbscape_terminal::TerminalApp;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> Result<()> {
    // Keep the alternate screen clean unless RUST_LOG asks for more
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let scene = Scene::compose(&SceneConfig::default(), &mut rng);

    let mut app = TerminalApp::new(scene, cli.app_options()).context("Failed to open terminal")?;
    let frames = app.run().map_err(|e| {
        error!("Terminal host failed: {}", e);
        e
    })?;

    info!("Rendered {} frames", frames);
    println!("Orbscape rendered {} frames.", frames);
    Ok(())
}
