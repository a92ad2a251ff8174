use clap::Parser;
use relm4::prelude::*;
use segring::config;
use segring_gtk::gui::app::AppModel;
use segring_gtk::gui::ring;
use segring_gtk::sys::runtime;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Image shown inside the ring
    #[arg(short, long)]
    avatar: Option<PathBuf>,

    /// Segments to start with (overrides the config)
    #[arg(short = 'n', long)]
    segments: Option<usize>,

    /// Render the ring once to this PNG file and exit
    #[arg(long)]
    export: Option<PathBuf>,

    /// Total progress spread over the exported ring, as the single slider would
    #[arg(long, requires = "export", allow_negative_numbers = true)]
    total: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = config::load_or_default();
    if let Some(segments) = args.segments {
        config.initial_segments = segments;
    }
    let store = Arc::new(config.build_store());
    let avatar = args.avatar.as_deref().and_then(ring::load_avatar);

    if let Some(path) = &args.export {
        if let Some(total) = args.total {
            store.set_aggregate_progress(total);
        }
        ring::render_png(path, &store.snapshot(), avatar.as_ref())?;
        log::info!("Wrote {}", path.display());
        return Ok(());
    }

    let (tx, rx) = async_channel::unbounded();

    runtime::start_background_services(tx.clone(), config.ring);

    // clap already consumed our arguments; keep GTK from parsing them again
    let app = RelmApp::new("com.mstf.segring").with_args(Vec::new());

    app.run::<AppModel>((store, avatar, tx, rx));
    Ok(())
}
