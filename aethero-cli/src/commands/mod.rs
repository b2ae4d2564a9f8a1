pub mod monitor;
pub mod parse;
pub mod run;
