mod draw;
mod json_result;

pub use draw::*;
pub use json_result::*;
