pub mod recorder;
pub mod scene;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use recorder::CallLog;
#[allow(unused_imports)]
pub use scene::{Chain, TestEntity};
