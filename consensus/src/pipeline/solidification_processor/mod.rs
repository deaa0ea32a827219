pub mod double_buffer;
pub mod processor;

pub use double_buffer::DoubleBufferedSet;
pub use processor::TransactionSolidifier;
