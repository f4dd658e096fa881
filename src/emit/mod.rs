//! Portable C11 backend: one translation unit and header per module,
//! built exclusively on the fixed runtime symbol table.

pub mod c_emitter;
pub mod config;
pub mod runtime_symbols;

pub use c_emitter::{CEmitter, EmittedModule};
pub use config::EmitConfig;
pub use runtime_symbols::{RuntimeSymbol, MAX_FILE_SIZE_BYTES, MAX_NETWORK_READ_BYTES, SYMBOLS};
