#[allow(non_upper_case_globals, non_camel_case_types, non_snake_case, dead_code)]
pub mod bind;

pub mod api;
pub mod enums;
pub mod error;
pub mod functions;
pub mod statics;
pub mod types;
pub mod utils;
