pub mod jobs;
pub mod roster;
