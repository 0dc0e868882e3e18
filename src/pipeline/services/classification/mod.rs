pub mod reply_parser;
pub mod sample_classifier;
pub mod vision_classifier;

pub use reply_parser::{NUTRITION_PROMPT, parse_reply};
pub use sample_classifier::SampleClassifier;
pub use vision_classifier::{VisionClassifier, VisionModel};
