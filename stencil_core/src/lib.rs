//! `stencil_core` is the core library for the [stencil](https://github.com/stencil-rs/stencil) project-scaffolding engine. It streams template files through a byte-level transformation pipeline (conditional regions and variable substitution) and materializes whole template directories into new projects.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Template file (byte stream)
//!   → Stream cursor (chunked reads, bounded look-ahead, torn-token carry-over)
//!   → Token trie (multi-pattern match: region markers + variable tokens)
//!   → Operations (region include/exclude/toggle, variable substitution)
//!   → Output sink (whitespace fixup, buffered writes)
//! ```
//!
//! Correctness is independent of how the input is chunked: a marker split
//! across any number of buffer refills, down to one-byte buffers, is still
//! recognized exactly once, with byte-identical output.
//!
//! ## Modules
//!
//! - [`config`] — Template manifest (`stencil.json`): parameters, regions,
//!   sources, and variable framing.
//! - [`project`] — Template discovery: walking a directory tree for
//!   manifests.
//! - [`runner`] — Parameter resolution and file orchestration: planning and
//!   materializing one template instantiation.
//!
//! ## Key Types
//!
//! - [`Processor`] — The scan loop. Built once from operation providers and
//!   an [`EngineConfig`], reusable across runs.
//! - [`Region`] — A paired-marker conditional region operation.
//! - [`VariableCollection`] / [`VariableFormat`] — Case-insensitive
//!   substitution values and the `${name}$` framing around them.
//! - [`OperationProvider`] / [`Operation`] — The seam for new operation
//!   kinds: immutable definitions minting fresh per-run state.
//!
//! ## Quick Start
//!
//! ```rust
//! use stencil_core::EngineConfig;
//! use stencil_core::Processor;
//! use stencil_core::Region;
//! use stencil_core::StencilResult;
//! use stencil_core::VariableCollection;
//! use stencil_core::VariableFormat;
//!
//! # fn main() -> StencilResult<()> {
//! let variables: VariableCollection = [("name", "World")].into_iter().collect();
//! let config = EngineConfig::new(variables, VariableFormat::default());
//! let region = Region::new("#begin", "#end", false, true, true);
//! let processor = Processor::create(config, vec![Box::new(region)])?;
//!
//! let input = "Hello ${name}$!\n#begin\nsecret\n#end\n";
//! let mut output = Vec::new();
//! let changed = processor.run(input.as_bytes(), &mut output)?;
//! assert!(changed);
//! assert_eq!(output, b"Hello World!\n");
//! # Ok(())
//! # }
//! ```

pub use config::*;
pub use engine::*;
pub use error::*;
pub use project::*;
pub use region::*;
pub use runner::*;
pub use variables::*;

pub mod config;
pub(crate) mod cursor;
mod engine;
mod error;
pub mod project;
mod region;
pub mod runner;
pub(crate) mod tokens;
mod variables;

#[cfg(test)]
mod __fixtures;
