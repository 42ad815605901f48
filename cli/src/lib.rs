pub mod history;

pub use history::Cli;
pub use history::run;
