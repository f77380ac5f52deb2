//! Core bundling logic for docbundle.
//!
//! This crate walks a documentation root, renders the table of contents and
//! assembles every file into one combined document. [`pipeline::bundle`]
//! ties it together with the archive fetch step.

pub mod assembler;
pub mod collector;
pub mod pipeline;
pub mod toc;
