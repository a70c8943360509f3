//! Motion and auxiliary dispatch (spec §4.5, §4.6). Both submodules add
//! `impl CanonEngine` blocks rather than exporting free functions — the
//! engine is the single seam every dispatch call passes through.

pub mod auxiliary;
pub mod motion;
