//! Text and JSON reports

pub mod report_writer;

pub use report_writer::{
    render_removal_report, render_scan_report, write_json_report, write_removal_report, write_scan_report,
};
