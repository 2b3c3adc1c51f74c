pub mod conversion;
pub mod json_array;
pub mod value;
