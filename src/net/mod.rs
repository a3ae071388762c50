pub mod fetch;
pub mod upload;

// Re-export key types for convenience
#[allow(unused_imports)]
pub use fetch::{AjaxResponse, FetchRequest, FetchResult, FetchWorker};
#[allow(unused_imports)]
pub use upload::UploadClient;
