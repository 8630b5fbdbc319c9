pub mod converter;
pub mod converter_models;

pub use converter::Converter;
pub use converter_models::ConvertConfig;
