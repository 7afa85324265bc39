pub mod requests;
pub mod responses;

pub use requests::UploadForm;
pub use responses::HealthResponse;
