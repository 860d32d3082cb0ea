use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use keytrace::analyzer::AnalysisData;
use keytrace::api::SessionReport;
use keytrace::consts::FINGER_COUNT;
use keytrace::KtResult;

const FINGER_NAMES: [&str; FINGER_COUNT] = [
    "L Pinky", "L Ring", "L Middle", "L Index", "L Thumb", "R Thumb", "R Index", "R Middle",
    "R Ring", "R Pinky",
];

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn align_right(table: &mut Table, columns: std::ops::RangeInclusive<usize>) {
    for i in columns {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

fn percent(part: u32, whole: u32) -> f32 {
    if whole > 0 {
        part as f32 / whole as f32 * 100.0
    } else {
        0.0
    }
}

pub fn summary(report: &SessionReport) {
    let d = &report.analysis;
    let presses = d.total_presses();

    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Keymap").add_attribute(Attribute::Bold),
        Cell::new("Chars"),
        Cell::new("Events"),
        Cell::new("Presses"),
        Cell::new("SFB").fg(Color::Red),
        Cell::new("SFB%").fg(Color::Red),
        Cell::new("Layer Sw"),
        Cell::new("Travel (mm)").fg(Color::Cyan),
    ]);
    align_right(&mut table, 1..=7);

    table.add_row(vec![
        Cell::new(&report.keymap).add_attribute(Attribute::Bold),
        Cell::new(report.text.chars().count()),
        Cell::new(report.events),
        Cell::new(presses),
        Cell::new(d.sfb_total).fg(Color::Red),
        Cell::new(format!("{:.2}", percent(d.sfb_total, presses.saturating_sub(1)))).fg(Color::Red),
        Cell::new(d.layer_switches),
        Cell::new(format!("{:.0}", d.total_travel())).fg(Color::Cyan),
    ]);
    println!("\n{}", table);
}

pub fn fingers(d: &AnalysisData) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Finger").add_attribute(Attribute::Bold),
        Cell::new("SFB").fg(Color::Red),
        Cell::new("Travel (mm)"),
    ]);
    align_right(&mut table, 1..=2);

    for (i, name) in FINGER_NAMES.iter().enumerate() {
        table.add_row(vec![
            Cell::new(format!("{} ({})", name, i + 1)),
            Cell::new(d.sfb_finger_counts[i]),
            Cell::new(format!("{:.0}", d.finger_travel[i])),
        ]);
    }
    println!("\n{}", table);
}

pub fn layers(d: &AnalysisData) {
    let total = d.total_presses();

    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Layer").add_attribute(Attribute::Bold),
        Cell::new("Presses"),
        Cell::new("Share"),
    ]);
    align_right(&mut table, 1..=2);

    for (layer, &count) in d.layer_counts.iter().enumerate() {
        table.add_row(vec![
            Cell::new(layer),
            Cell::new(count),
            Cell::new(format!("{:.1}%", percent(count, total))),
        ]);
    }
    println!("\n{}", table);
}

pub fn sfbs(d: &AnalysisData, limit: usize) {
    if d.sfb_counts.is_empty() {
        println!("\nNo same-finger bigrams.");
        return;
    }

    let mut table = new_table();
    table.add_row(vec![
        Cell::new(format!("Top SFBs ({} of {})", limit.min(d.sfb_counts.len()), d.sfb_counts.len()))
            .add_attribute(Attribute::Bold),
        Cell::new("Count"),
        Cell::new("Share"),
    ]);
    align_right(&mut table, 1..=2);

    for entry in d.sfb_counts.iter().take(limit) {
        table.add_row(vec![
            Cell::new(&entry.label),
            Cell::new(entry.value).fg(Color::Red),
            Cell::new(format!("{:.1}%", percent(entry.value, d.sfb_total))),
        ]);
    }
    println!("\n{}", table);
}

pub fn comparison(results: &[(String, KtResult<SessionReport>)]) {
    let best = results
        .iter()
        .filter_map(|(name, r)| r.as_ref().ok().map(|r| (name, r.analysis.sfb_total)))
        .min_by_key(|&(_, sfb)| sfb);

    let mut table = new_table();
    table.add_row(vec![
        Cell::new(match best {
            Some((name, _)) => format!("Comparison vs Best ({})", name),
            None => "Comparison".to_string(),
        })
        .add_attribute(Attribute::Bold),
        Cell::new("SFB").fg(Color::Red),
        Cell::new("Delta"),
        Cell::new("Layer Sw"),
        Cell::new("Travel (mm)").fg(Color::Cyan),
    ]);
    align_right(&mut table, 1..=4);

    for (name, result) in results {
        match result {
            Ok(report) => {
                let d = &report.analysis;
                let best_sfb = best.map(|(_, sfb)| sfb).unwrap_or(0);
                let name_cell = if best.is_some_and(|(b, _)| b == name) {
                    Cell::new(name).fg(Color::Green).add_attribute(Attribute::Bold)
                } else {
                    Cell::new(name).add_attribute(Attribute::Bold)
                };

                table.add_row(vec![
                    name_cell,
                    Cell::new(d.sfb_total).fg(Color::Red),
                    Cell::new(format!("+{}", d.sfb_total - best_sfb)),
                    Cell::new(d.layer_switches),
                    Cell::new(format!("{:.0}", d.total_travel())).fg(Color::Cyan),
                ]);
            }
            Err(e) => {
                table.add_row(vec![
                    Cell::new(name).add_attribute(Attribute::Bold),
                    Cell::new(format!("error: {}", e)).fg(Color::Yellow),
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new("-"),
                ]);
            }
        }
    }
    println!("\n{}", table);
}
