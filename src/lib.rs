//! Template workflow engine for Game Idea Document prompt templates.
//!
//! Drafts are parsed against a template schema, a workflow mode is resolved
//! from how many core decisions are still open, and cross-section rules
//! report contradictions between sections.

pub mod config;
pub mod draft;
pub mod error;
pub mod interface_doc;
pub mod interface_map;
pub mod logging;
pub mod mode;
pub mod registry;
pub mod report;
pub mod rules;
pub mod templates;
pub mod text;
pub mod validator;

pub use draft::{Draft, Pillar, SectionContent};
pub use error::{GidError, Result};
pub use mode::{Mode, ModeResolution, ModeResolver, resolve_mode};
pub use registry::{Template, TemplateId, TemplateRegistry};
pub use rules::{Finding, Tag};
pub use validator::{ValidationReport, Validator, validate};
