//! # Templates
//!
//! Loading, composing and discovering work-item templates.
//!
//! ## Template Format
//!
//! ```yaml
//! version: "1"
//! includes:
//!   - common/review.yaml      # relative to the template directory
//! tasks:
//!   - title: Setup
//!     description: Prepare the environment
//!     labels: [infra]
//!     prefixable: true
//!     subtasks:
//!       - title: Provision hosts
//! ```
//!
//! ## Resolution
//!
//! [`Resolver`] flattens an entry template and its includes depth-first,
//! reading each canonical path at most once per call. Unreadable files are
//! logged and treated as empty; malformed YAML aborts resolution.
//!
//! ## Key Types
//!
//! - [`TemplateSource`] - Reads raw template bytes (filesystem or memory)
//! - [`Resolver`] - Flattens include graphs into a task list
//! - [`list_templates`] - Enumerates template files on disk

mod catalog;
mod paths;
mod resolver;
mod source;

pub use catalog::{list_templates, TemplateEntry};
pub use paths::{canonical_path, expand_home};
pub use resolver::{Resolution, Resolver, TemplateError};
pub use source::{FsTemplateSource, MemoryTemplateSource, SourceError, TemplateSource};
