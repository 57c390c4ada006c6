pub mod continuity;
pub mod creation;
pub mod topology;
