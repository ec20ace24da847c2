pub mod build;
pub mod extract;
pub mod info;
pub mod list;
pub mod protect;

pub use build::*;
pub use extract::*;
pub use info::*;
pub use list::*;
pub use protect::*;
