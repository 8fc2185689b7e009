pub mod defaults;
pub mod error;
pub mod fallback;
pub mod traits;
pub mod types;

pub use error::*;
pub use traits::*;
pub use types::*;
