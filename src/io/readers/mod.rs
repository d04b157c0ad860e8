pub mod conflict_report_reader;
