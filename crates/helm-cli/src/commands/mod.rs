pub mod config;
pub mod item;
pub mod poll;
pub mod run;
