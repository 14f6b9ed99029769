//! DSP: the per-sample crusher chain.
//!
//! Everything reachable from `CrusherEngine::process_block` is real-time
//! safe: no allocation, no locks, no I/O.

pub mod bytebeat;
pub mod engine;
pub mod mixer;
pub mod quantizer;
pub mod reducer;
pub mod renderer;
pub mod shifter;
