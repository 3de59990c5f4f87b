// Communication tools: message drafting, email composition, meeting prep.
// Drafts go through the same provider cascade as analysis and fall back to
// a deterministic template built from the stored DISC tips.

pub mod generator;
pub mod handlers;
pub mod prompts;
