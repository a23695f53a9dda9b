pub mod account_reader;
pub mod attempt_reader;
pub mod outcome_writer;
