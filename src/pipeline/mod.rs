pub mod cipher;
pub mod digest;

pub use cipher::*;
pub use digest::*;
