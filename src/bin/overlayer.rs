use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use overlayer::{
    EditorOpts, EditorSession, InteractionEvent, PointerEvent, SceneDoc, WheelEvent,
};

#[derive(Parser, Debug)]
#[command(name = "overlayer", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a scene as a PNG, replaying its interaction script first.
    Frame(FrameArgs),
    /// Parse and validate a scene without rendering.
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Available layout width; overrides the scene's `layout_width`.
    #[arg(long)]
    width: Option<f64>,

    /// Device pixel ratio; overrides the scene's `dpr`.
    #[arg(long)]
    dpr: Option<f64>,

    /// Font file for text overlays and the placeholder label.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Override decode worker threads.
    #[arg(long)]
    threads: Option<usize>,

    /// How long to wait for image decodes to settle, in milliseconds.
    #[arg(long, default_value_t = 5000)]
    wait_ms: u64,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let scene = SceneDoc::from_path(&args.in_path)?;
    let assets_root = args
        .in_path
        .parent()
        .unwrap_or_else(|| std::path::Path::new("."));

    let opts = EditorOpts {
        assets_root: assets_root.to_path_buf(),
        decode_threads: args.threads,
        font_path: args.font.clone(),
        device_pixel_ratio: args.dpr.or(scene.dpr).unwrap_or(1.0),
        ..EditorOpts::default()
    };
    let mut sess = EditorSession::new(opts)?;
    if let Some(w) = args.width.or(scene.layout_width) {
        sess.set_layout_width(w);
    }
    sess.set_base_source(scene.base.as_deref());
    sess.set_overlays(scene.overlays)?;

    let wait = Duration::from_millis(args.wait_ms);
    if !sess.pump_until_idle(wait) {
        tracing::warn!(wait_ms = args.wait_ms, "decodes still pending; rendering anyway");
    }

    for ev in &scene.interactions {
        replay(&mut sess, ev);
    }
    sess.pump_until_idle(wait);

    sess.export_png(&args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let scene = SceneDoc::from_path(&args.in_path)?;
    eprintln!(
        "ok: {} overlays, {} interactions",
        scene.overlays.len(),
        scene.interactions.len()
    );
    Ok(())
}

fn replay(sess: &mut EditorSession, ev: &InteractionEvent) {
    match *ev {
        InteractionEvent::PointerDown { x, y } => {
            sess.pointer_down(PointerEvent::at(x, y));
        }
        InteractionEvent::PointerMove { x, y } => {
            sess.pointer_move(PointerEvent::at(x, y));
        }
        InteractionEvent::PointerUp => sess.pointer_up(PointerEvent::at(0.0, 0.0)),
        InteractionEvent::Wheel { delta_y, modifier } => {
            sess.wheel(WheelEvent { delta_y, modifier });
        }
    }
}
