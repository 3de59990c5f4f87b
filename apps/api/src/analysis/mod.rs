// DISC analysis: input normalisation, provider cascade, response
// normalisation and the local heuristic fallback.

pub mod disc;
pub mod handlers;
pub mod heuristic;
pub mod input;
pub mod normalizer;
pub mod pipeline;
