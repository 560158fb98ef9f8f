mod app;
mod map;
mod roster;
mod util;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON roster of candidate profiles; the built-in demo roster when omitted.
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Start with the layout simulation frozen.
    #[arg(long)]
    frozen: bool,

    /// Show every matching builder instead of the top-ranked subset.
    #[arg(long)]
    show_all: bool,

    /// Profile ids to mark as saved on startup.
    #[arg(long = "saved", value_name = "ID", num_args = 1..)]
    saved: Vec<String>,

    #[arg(long, default_value_t = 1440.0)]
    width: f32,

    #[arg(long, default_value_t = 920.0)]
    height: f32,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([args.width, args.height]),
        ..Default::default()
    };
    let settings = app::StartupSettings {
        frozen: args.frozen,
        show_all: args.show_all,
        saved: args.saved,
    };
    let roster_path = args.roster;

    eframe::run_native(
        "TalentMap",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::TalentMapApp::new(
                cc,
                roster_path.clone(),
                settings.clone(),
            )))
        }),
    )
}
