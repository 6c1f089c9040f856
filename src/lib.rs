//! Library entrypoint for `spvbuf`.
//!
//! The crate exposes pooled instruction buffers, the operand codec and
//! module assembly for SPIR-V style binaries.

pub mod spirv;
