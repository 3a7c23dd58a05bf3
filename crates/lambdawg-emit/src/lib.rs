// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! JavaScript emitter for the Lambdawg language.
//!
//! Purely syntax-directed lowering: the emitter never consults inferred
//! types. A fixed runtime prelude is prepended so the emitted artifact
//! is self-contained.

mod emitter;
mod prelude;
mod reserved;

pub use emitter::{EmitOptions, Emitter};
pub use prelude::PRELUDE;
