use crate::reports;
use clap::Args;
use keytrace::api::compare_keymap_files;
use keytrace::config::Config;
use keytrace::error::KeyTraceError;
use keytrace::geometry::{Fingermap, Layout};
use keytrace::KtResult;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    #[command(flatten)]
    pub config: Config,

    #[arg(short, long, num_args = 1.., required = true)]
    pub keymaps: Vec<String>,

    #[arg(short, long)]
    pub text: String,
}

pub fn run(
    args: CompareArgs,
    layout: Arc<Layout>,
    fingermap: &Fingermap,
    config: Config,
) -> KtResult<()> {
    let text = super::read_text(&args.text)?;

    info!("⚖️  Comparing {} keymaps...", args.keymaps.len());
    let start = Instant::now();
    let results = compare_keymap_files(layout, fingermap, &args.keymaps, &config, &text);
    info!("    Done in {:.2?}", start.elapsed());

    println!("\n🔎 === KEYMAP COMPARISON === 🔎");
    reports::print_comparison_report(&results);

    if let Some((name, Err(e))) = results
        .iter()
        .find(|(_, r)| matches!(r, Err(e) if e.is_fatal()))
    {
        return Err(KeyTraceError::Validation(format!(
            "Keymap '{}' is malformed: {}",
            name, e
        )));
    }

    Ok(())
}
