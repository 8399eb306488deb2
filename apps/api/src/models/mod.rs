pub mod order;
pub mod resume;
