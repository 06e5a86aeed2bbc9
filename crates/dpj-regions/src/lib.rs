//! Region paths and effect summaries.
//!
//! These are plain immutable values. The type representation in `dpj-types` only compares,
//! clones, displays and substitutes them; it never looks inside.

#![forbid(unsafe_code)]

mod effects;
mod rpl;

pub use crate::effects::{Effect, Effects};
pub use crate::rpl::{Rpl, RplElement};
