pub mod classification_service;
pub mod observation_service;
pub mod verification_service;

pub use classification_service::ClassificationService;
pub use observation_service::ObservationService;
pub use verification_service::VerificationService;
