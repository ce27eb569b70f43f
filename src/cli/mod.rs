pub mod confirm;
pub mod enable;
pub mod report;
