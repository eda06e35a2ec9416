//! IR core for the translation engine: value types, opcodes, temps,
//! labels, the per-unit translation context and its builder methods,
//! translation-unit metadata and the `Stop` non-local-exit type.

pub mod context;
pub mod dump;
pub mod env;
pub mod ir_builder;
pub mod label;
pub mod op;
pub mod opcode;
pub mod stop;
pub mod temp;
pub mod types;
pub mod unit;
