pub mod convert;
pub mod shared;
pub mod validators;
