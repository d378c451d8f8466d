pub mod forecast;
pub mod variable;

pub use forecast::*;
pub use variable::*;
