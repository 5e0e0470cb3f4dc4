mod builder;
mod walker;

pub use builder::{WalkBuilder, WalkSummary, Walker};
