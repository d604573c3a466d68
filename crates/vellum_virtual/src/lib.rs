//! # vellum_virtual
//!
//! Virtual code generation for component documents.
//!
//! ## Architecture
//!
//! ```text
//! document ──► LanguageSession ──► Plugin::parse_sections ──► Sections
//!                    │
//!                    ├─► compile_template (html / pug) ──► TemplateSource
//!                    │        └─► generate_template ──┐
//!                    ├─► generate_script ◄────────────┘ ──► script_ts
//!                    └─► resolve_embedded ──► template, style_<i>, customBlock_<i>
//! ```
//!
//! Every generated code carries a [`Mapper`](vellum_mapping::Mapper) back to
//! the document. Pug templates resolve through an extra stage with
//! [`MappingComposer`](vellum_mapping::MappingComposer).

pub mod codes;
pub mod error;
pub mod global_types;
pub mod options;
pub mod plugins;
pub mod script;
pub mod session;
pub mod template;
pub mod virtual_code;

pub use codes::{Codes, END_OF_LINE, NEW_LINE};
pub use error::{ConfigError, PugError};
pub use options::CompilerOptions;
pub use plugins::{
    EmbeddedCodeId, LanguagePlugin, MarkdownPlugin, Plugin, PugPlugin, VuePlugin,
};
pub use script::{generate_script, ScriptCodegenOptions};
pub use session::{LanguageSession, SCRIPT_CODE_ID};
pub use template::{
    generate_template, HtmlTemplate, RemappedTemplate, TemplateCodegen, TemplateCodegenOptions,
    TemplateSource,
};
pub use virtual_code::VirtualCode;
