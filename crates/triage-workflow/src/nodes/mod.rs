mod categorize;
mod draft;
mod priority;

pub use categorize::CategorizeEmail;
pub use draft::DraftResponse;
pub use priority::{priority_guidance, AssignPriority};

pub const CATEGORIZE_EMAIL: &str = "categorize_email";
pub const ASSIGN_PRIORITY: &str = "assign_priority";
pub const DRAFT_RESPONSE: &str = "draft_response";
