//! Text drift metrics over the generated token stream.
//!
//! Uses the same window plan as the spectral metrics so that the external
//! series joins the internal series index-for-index.

pub mod divergence;
pub mod entropy;
pub mod ngrams;
pub mod repetition;
pub mod tokens;
pub mod windows;

pub use divergence::jensen_shannon;
pub use entropy::char_entropy;
pub use repetition::{detect_repetition, RepetitionSpec};
pub use tokens::TokenStream;
pub use windows::{compute_external_series, TextSpec};
