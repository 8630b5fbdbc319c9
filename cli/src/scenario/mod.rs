pub mod assertions;
pub mod auth;
pub mod cypress_spec;
pub mod feature;
mod feature_reader;
pub mod handlers;
pub mod registry;
pub mod request;

pub use assertions::extract_assertions;
pub use auth::AuthResolver;
pub use cypress_spec::{render_case, request_url, CypressSpecs, SpecBody};
pub use feature::{AppendOutcome, FeatureBook, Scenario};
pub use handlers::{synthesize, write_step_file, HandlerStyle};
pub use registry::{AuthRegistry, MethodRegistry};
pub use request::{normalize_request, PathMode};
