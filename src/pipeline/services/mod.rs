pub mod classification;
pub mod preparation;

pub use classification::{SampleClassifier, VisionClassifier, VisionModel};
pub use preparation::ResizingPreparer;
