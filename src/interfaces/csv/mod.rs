//! CSV adapters: recorded call logs in, funder reports out.

pub mod call_reader;
pub mod report_writer;
