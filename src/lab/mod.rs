//! Lab lifecycle: the ordered operational sequences behind each CLI
//! subcommand. Every sequence runs synchronously and without rollback;
//! teardown steps are best-effort by design.

pub mod lifecycle;
pub mod setup;
pub mod ssh;
pub mod status;
pub mod ux;
