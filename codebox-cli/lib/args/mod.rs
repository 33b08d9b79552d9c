mod codebox;
mod codeboxd;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use codebox::*;
pub use codeboxd::*;
