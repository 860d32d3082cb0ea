pub mod analyze;
pub mod compare;
pub mod replay;

use keytrace::KtResult;
use std::fs;
use tracing::info;

pub fn read_text(path: &str) -> KtResult<String> {
    info!("📄 Loading Text: {}", path);
    let content = fs::read_to_string(path)?;
    // Editors append a final newline that nobody meant to type
    Ok(content.trim_end_matches(['\n', '\r']).to_string())
}
