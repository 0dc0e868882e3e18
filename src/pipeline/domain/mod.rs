pub mod analysis_result;
pub mod classification;
pub mod prepared_image;

pub use analysis_result::{AnalysisResult, Macros, Micronutrient};
pub use classification::Classification;
pub use prepared_image::PreparedImage;
