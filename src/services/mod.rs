pub mod ai;
pub mod insights;
