use clap::Args;
use keytrace::api::AnalysisSession;
use keytrace::config::Config;
use keytrace::geometry::{Fingermap, Layout};
use keytrace::keymap::Keymap;
use keytrace::KtResult;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    #[command(flatten)]
    pub config: Config,

    #[arg(short, long)]
    pub keymap: String,

    #[arg(short, long)]
    pub text: String,

    /// Show modifiers and named keys as <name>...</name>.
    #[arg(long, default_value_t = false)]
    pub annotate: bool,
}

pub fn run(
    args: ReplayArgs,
    layout: Arc<Layout>,
    fingermap: &Fingermap,
    config: Config,
) -> KtResult<()> {
    let keymap = Keymap::load_from_file(&args.keymap)?;
    let text = super::read_text(&args.text)?;

    let session = AnalysisSession::new(layout, fingermap, &keymap, config)?;
    let mut sequencer = session.sequencer()?;
    let events = sequencer.build(&text)?.len();
    info!("🎹 {} events", events);

    let replay = sequencer.play(!args.annotate);
    if sequencer.play(true) != text {
        warn!("⚠️  Replayed text differs from the input");
    }

    println!("{}", replay);
    Ok(())
}
