//! XSLT 3.0 streamability analysis: classify expressions by their
//! data-flow posture, and track buffering during a streamed evaluation.

mod analysis;
mod buffer;

pub use analysis::{
    analyze, is_grounded, is_motionless, is_streamable, memory_footprint, Posture, Streamability,
    Sweep,
};
pub use buffer::{NodeBuffer, StreamingConfig, StreamingContext, StreamingStats};
