// Decay & classification engine.
// Pure functions (decay, status, growth) are the single source of the
// health formula; the recorder is the only writer of derived contact state
// and the ranker only ever reads.

pub mod contacts;
pub mod decay;
pub mod growth;
pub mod handlers;
pub mod ranking;
pub mod recorder;
pub mod status;
