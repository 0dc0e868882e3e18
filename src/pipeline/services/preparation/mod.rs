pub mod resizing_preparer;

pub use resizing_preparer::ResizingPreparer;
