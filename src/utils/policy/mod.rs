//! Policy tooling: parsing, compilation into linear secret sharing
//! matrices, and the engine handle bundling both.
pub mod engine;
pub mod msp;
pub mod pest;
