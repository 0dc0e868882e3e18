pub mod classification_service;
pub mod preparation_service;

pub use classification_service::ClassificationService;
pub use preparation_service::PreparationService;
