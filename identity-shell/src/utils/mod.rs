pub mod validation;

pub use validation::{is_valid_code, is_valid_dispatch_phone};
