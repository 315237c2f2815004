mod assets;
mod demo;
mod input;

use clap::{Parser, ValueEnum};
use duo_core::hardware::sim::SimEngine;
use duo_core::{EngineConfig, SpriteEngine, SpriteMapping, Surface};
use tracing::{info, Level};
use tracing_subscriber::util::SubscriberInitExt;

use crate::demo::Demo;
use crate::input::Script;

#[derive(Parser)]
#[command(name = "duo")]
#[command(version, about = "Headless dual-screen sprite engine demo", long_about = None)]
struct Cli {
    /// Frames to simulate
    #[arg(short, long, default_value_t = 600)]
    frames: u32,

    /// Scripted input to play
    #[arg(short, long, value_enum, default_value_t = ScriptKind::Tour)]
    script: ScriptKind,

    /// Spawn and drop debris sprites to fragment the palettes
    #[arg(long)]
    churn: bool,

    /// Use 1D/128 sprite mapping instead of 1D/32
    #[arg(long)]
    wide_mapping: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, default_value_t = Level::INFO)]
    log_level: Level,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ScriptKind {
    /// Steer the ship around, drop it, respawn it and cross screens
    Tour,
    /// No input, only the planet moves
    Idle,
}

fn setup_logging(level: Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .compact()
        .finish()
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log_level);

    let mapping = if cli.wide_mapping {
        SpriteMapping::OneD128
    } else {
        SpriteMapping::OneD32
    };
    let config = EngineConfig::default().with_mapping(mapping);
    let engine = SpriteEngine::new(SimEngine::new(), config);

    let mut demo = Demo::new(engine, cli.churn)?;
    let mut script = match cli.script {
        ScriptKind::Tour => Script::tour(),
        ScriptKind::Idle => Script::idle(),
    };

    for _ in 0..cli.frames {
        demo.tick(script.next_frame());
    }
    info!("ran {} frames", demo.engine.hardware().vblank_count());
    if demo.ship().is_none() {
        info!("the ship ended the run destroyed");
    }

    demo.engine.log_palette_offsets();
    for surface in Surface::ALL {
        println!("{} palette: {}", surface, demo.engine.palette_report(surface));
        for (_, sprite) in demo.engine.sprites_on(surface) {
            println!(
                "  {:<12} ({:4}, {:4})  slot {:3}  palette {:3}..{:3}",
                sprite.name(),
                sprite.x(),
                sprite.y(),
                sprite.slot().index(),
                sprite.palette_offset(),
                sprite.palette_offset() + sprite.palette_len()
            );
        }
    }

    Ok(())
}
