//! Record linkage and issue synthesis.
//!
//! Commits are matched to change sets through their git-tfs footer, change
//! sets to work items through TFS links; the composed map feeds the
//! synthesizer, which creates one issue per work item.

pub mod cache;
pub mod correlate;
pub mod driver;
pub mod index;
pub mod linkage;
pub mod render;
pub mod state;
pub mod synth;
