use keytrace::analyzer::AnalysisData;
use keytrace::KtResult;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct SfbRow<'a> {
    bigram: &'a str,
    count: u32,
    percent: f32,
}

/// Writes every same-finger bigram, most frequent first.
pub fn write_sfbs<P: AsRef<Path>>(path: P, data: &AnalysisData) -> KtResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    let total = data.sfb_total.max(1) as f32;

    for entry in &data.sfb_counts {
        writer.serialize(SfbRow {
            bigram: &entry.label,
            count: entry.value,
            percent: entry.value as f32 / total * 100.0,
        })?;
    }

    writer.flush()?;
    Ok(())
}
