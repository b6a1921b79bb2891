pub mod coerce;
pub mod core;
pub mod decoder;
pub mod loader;

pub use self::core::{Compilation, Compiler, compile};
pub use self::decoder::{Decoder, LayoutOptions, decode};
