pub mod environment;
pub mod http_method;
pub mod model;
pub mod placeholder;

pub use environment::{load_environment_document, EnvStore};
pub use http_method::HttpMethod;
pub use model::{Collection, Item, ItemKind};
