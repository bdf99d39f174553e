//! Standalone image builder for the lab node images.
//!
//! Takes no arguments: runtime, base image and account are compile-time
//! constants in [`anslab::imgbuild`].

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> anyhow::Result<()> {
    anslab::infra::logging::init();
    anslab::imgbuild::build_all(&anslab::imgbuild::BuildParams::default())
}
