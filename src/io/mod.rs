mod readers;

pub use readers::conflict_report_reader::*;
