// paudit library surface: table loading and terminal rendering.
// The binary in main.rs wires these to the audit engine.

pub mod load;
pub mod render;
