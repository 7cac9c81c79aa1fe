pub mod alert_processor;

pub use alert_processor::AlertProcessor;
