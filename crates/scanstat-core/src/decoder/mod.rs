//! Typed buffer decoding.
//!
//! The decoder follows the same layering as the rest of the crate:
//! - `layout`: column positions, bit fields and shifts (source of truth)
//! - `reader`: mark field access, RGB unpacking and sentinel-aware means
//! - `parser`: walks channels/sub-channels and builds the report
//! - `error`: explicit, per-entry errors
//!
//! The mark (control) sub-channel is read for row 0 only: its first row holds
//! the session counter and status flags. Every other sub-channel is reduced
//! to the mean of its non-zero samples; zero is the missing-data sentinel.
//! Decoding is pure and keeps no state between calls, so independent buffers
//! may be decoded from several threads at once.
//!
//! Version française (résumé):
//! Le sous-canal Mark n'est lu que sur la première ligne (compteur, overtrig,
//! enable). Les autres sous-canaux donnent une moyenne des échantillons non
//! nuls. Les erreurs sont rattachées à leur entrée, jamais fatales.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::decode_buffer;
