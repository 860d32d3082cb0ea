use crate::reports;
use clap::Args;
use keytrace::api::AnalysisSession;
use keytrace::config::Config;
use keytrace::geometry::{Fingermap, Layout};
use keytrace::keymap::Keymap;
use keytrace::KtResult;
use std::sync::Arc;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub config: Config,

    #[arg(short, long)]
    pub keymap: String,

    /// File holding the text to type.
    #[arg(short, long)]
    pub text: String,

    /// Print the analysis as JSON instead of tables.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Write every same-finger bigram to a CSV file.
    #[arg(long)]
    pub export_sfbs: Option<String>,
}

pub fn run(
    args: AnalyzeArgs,
    layout: Arc<Layout>,
    fingermap: &Fingermap,
    config: Config,
) -> KtResult<()> {
    let keymap = Keymap::load_from_file(&args.keymap)?;
    let text = super::read_text(&args.text)?;
    let top_sfbs = config.analysis.top_sfbs;

    let session = AnalysisSession::new(layout, fingermap, &keymap, config)?;
    let report = session.run(&text)?;

    if let Some(path) = &args.export_sfbs {
        info!("💾 Exporting SFBs to {}", path);
        reports::export_sfbs(path, &report.analysis)?;
    }

    if args.json {
        println!("{}", serde_json::to_string(&report.analysis)?);
        return Ok(());
    }

    println!("\n📊 === ANALYSIS: {} === 📊", report.keymap);
    reports::print_summary_report(&report);
    reports::print_finger_report(&report.analysis);
    reports::print_layer_report(&report.analysis);
    reports::print_sfb_report(&report.analysis, top_sfbs);
    Ok(())
}
