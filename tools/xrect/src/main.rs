mod demo;
mod render;

use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, info, Level};
use tracing_subscriber::util::SubscriberInitExt;

use xemu_core::{Adapter, SimConfig};
use xosera::blitter::{Blitter, FillRect};
use xosera::bus::{Registers, Transport, WaitPolicy};
use xosera::playfield::{Playfield, Repeat};
use xosera::surface::{PixelDepth, Surface};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Depth {
    #[value(name = "4")]
    Four,
    #[value(name = "8")]
    Eight,
}

impl From<Depth> for PixelDepth {
    fn from(depth: Depth) -> Self {
        match depth {
            Depth::Four => PixelDepth::Bpp4,
            Depth::Eight => PixelDepth::Bpp8,
        }
    }
}

#[derive(Parser)]
#[command(name = "xrect")]
#[command(version, about = "Fill rectangles with the Xosera blitter on a simulated adapter", long_about = None)]
struct Cli {
    /// Bitmap width in pixels
    #[arg(long, default_value_t = 320)]
    width: u16,

    /// Bitmap height in lines
    #[arg(long, default_value_t = 240)]
    height: u16,

    /// Bits per pixel
    #[arg(long, value_enum, default_value_t = Depth::Eight)]
    depth: Depth,

    /// VRAM word address of the bitmap
    #[arg(long, default_value = "0x0000", value_parser = demo::parse_u16)]
    base: u16,

    /// VRAM words the simulated blitter writes per bus access (0 = never finishes)
    #[arg(long, default_value_t = 8)]
    rate: u32,

    /// Give up after this many status polls instead of waiting forever
    #[arg(long)]
    spins: Option<u32>,

    /// Extra rectangle to fill after the demo, as `x,y,w,h,color`
    #[arg(long = "rect", value_parser = demo::parse_rect)]
    rects: Vec<FillRect>,

    /// Skip the staircase demo
    #[arg(long)]
    no_demo: bool,

    /// Write the bitmap to this PNG file
    #[arg(long)]
    png: Option<PathBuf>,

    /// -v for debug, -vv for trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .compact()
        .finish()
        .init();
}

/// Fill every rectangle in order, waiting for each one.
fn draw<T: Transport>(
    blitter: &mut Blitter<T>,
    surface: &Surface,
    rects: impl IntoIterator<Item = FillRect>,
) -> Result<usize> {
    let mut count = 0;
    for rect in rects {
        debug!(
            "fill_rect({}, {}, {}, {}, {:#04x})",
            rect.x, rect.y, rect.width, rect.height, rect.color
        );
        blitter
            .fill_rectangle(surface, &rect)
            .map_err(|e| anyhow!("fill {:?}: {}", rect, e))?;
        count += 1;
    }
    Ok(count)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let depth = PixelDepth::from(cli.depth);
    if cli.width % depth.pixels_per_word() != 0 {
        bail!(
            "width {} is not a whole number of words at {} pixels per word",
            cli.width,
            depth.pixels_per_word()
        );
    }
    let surface = Surface::new(cli.base, cli.width, depth);

    let mut sim = Adapter::new(SimConfig {
        words_per_access: cli.rate,
        ..Default::default()
    });

    let mut regs = Registers::new(&mut sim);
    if let Some(spins) = cli.spins {
        regs.set_policy(WaitPolicy::Spins(spins));
    }

    Playfield::A.show_bitmap(&mut regs, &surface, Repeat::X2, Repeat::X2);
    Playfield::B.blank(&mut regs);
    info!(
        "playfield A: {}x{} at {:#06x}, {} words per line",
        cli.width,
        cli.height,
        surface.base_address(),
        surface.stride_words()
    );

    let demo = if cli.no_demo {
        None
    } else {
        Some(demo::staircase(cli.height))
    };
    let rects = demo.into_iter().flatten().chain(cli.rects.iter().copied());

    let mut blitter = Blitter::new(regs);
    let drawn = draw(&mut blitter, &surface, rects)?;
    drop(blitter);

    info!(
        "filled {} rectangles in {} bus ticks ({} blitter words, {} overruns)",
        drawn,
        sim.tick(),
        sim.engine().words_written,
        sim.overruns()
    );

    if let Some(path) = &cli.png {
        render::write_png(&sim, &surface, cli.height, path)?;
        info!("wrote {}", path.display());
    }

    Ok(())
}
