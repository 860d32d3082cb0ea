mod export;
mod tables;

pub use self::export::write_sfbs as export_sfbs;
pub use self::tables::{
    comparison as print_comparison_report, fingers as print_finger_report,
    layers as print_layer_report, sfbs as print_sfb_report, summary as print_summary_report,
};
