pub mod announcement;
pub mod document;
pub mod leave_request;
pub mod principal;

pub use announcement::*;
pub use document::*;
pub use leave_request::*;
pub use principal::*;
