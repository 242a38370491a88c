pub mod config;
pub mod rank;
pub mod score;
