pub mod backup;
pub mod core;
pub mod curriculum;
pub mod generator;
pub mod lessons;
pub mod setup;
