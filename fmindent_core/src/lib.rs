//! `fmindent_core` re-indents YAML literal block scalars (`key: |`) inside the
//! frontmatter of markdown documents whose indentation was mangled by earlier
//! tooling. Everything outside the configured block scalars is left
//! byte-identical.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Document
//!   → Line splitter (logical lines, terminators kept aside)
//!   → Normalizer (Scanning → InFrontmatter ⇄ InBlockScalar → AfterFrontmatter)
//!   → Flush strategy (flatten or dedent the buffered block scalar body)
//!   → Re-joined document
//! ```
//!
//! ## Modules
//!
//! - [`config`] — `fmindent.toml` loading and the validated [`NormalizeOptions`].
//! - [`normalizer`] — the line-classifying state machine.
//! - [`project`] — document discovery by extension and batch check/fix.
//!
//! ## Quick Start
//!
//! ```rust
//! use fmindent_core::NormalizeOptions;
//! use fmindent_core::normalize_document;
//!
//! let input = "---\nlicense: |\n      MIT\n   Copyright 2024\n---\nbody\n";
//! let output = normalize_document(input, &NormalizeOptions::default());
//!
//! assert_eq!(output, "---\nlicense: |\n  MIT\n  Copyright 2024\n---\nbody\n");
//! ```

pub use config::*;
pub use error::*;
pub use normalizer::*;
pub use project::*;

pub mod config;
#[allow(unused_assignments)]
mod error;
pub mod normalizer;
pub mod project;

#[cfg(test)]
mod __fixtures;
