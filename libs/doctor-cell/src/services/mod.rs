pub mod credential;
pub mod doctor;
pub mod specialty;

pub use credential::CredentialService;
pub use doctor::DoctorService;
pub use specialty::SpecialtyService;
