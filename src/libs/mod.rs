// Core installer components: platform detection, release resolution, artifact
// download with format fallback, archive extraction, per-binary install
// orchestration, shell PATH configuration and the final report.

pub mod archive;
pub mod artifact;
pub mod install;
pub mod platform;
pub mod release;
pub mod report;
pub mod shell;
