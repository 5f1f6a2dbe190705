pub mod aggregate;
pub mod cli;
pub mod config;
pub mod due_date;
pub mod error;
pub mod gate;
pub mod github;
pub mod output;
pub mod plan;
pub mod resolver;
pub mod run;
pub mod warning;
