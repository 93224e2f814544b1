pub mod category;
pub mod document;
pub mod enums;
pub mod profile;

pub use category::*;
pub use document::*;
pub use enums::*;
pub use profile::*;
