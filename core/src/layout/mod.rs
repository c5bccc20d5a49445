//! Per-artifact project directories.
//!
//! A project directory is named after the input artifact (`./model` for
//! `model.onnx`) and holds the copied artifact, the generated build script
//! and the `out_*` directories produced by the compiler.

mod project;
mod retention;

pub use project::{
    derive_project_name, locate_output_dir, ProjectLayout, ProjectName, BUILD_SCRIPT_NAME,
    TEMPLATE_PLACEHOLDER,
};
pub use retention::RetentionPolicy;
