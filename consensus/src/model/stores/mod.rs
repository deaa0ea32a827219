pub mod errors;
pub mod tangle;
pub mod tips;
