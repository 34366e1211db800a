//! Floor-plan editor core for venue halls.
//!
//! This crate owns the interactive part of the hall layout editor: placing,
//! dragging, resizing and rotating tables and partitions on a fixed-size
//! canvas, snapping rotations to right angles, autosaving unsynced edits to a
//! local draft store, and reconciling those drafts with the layouts persisted
//! by the hall gateway. The host UI layer is responsible only for wiring
//! pointer events to the [`editor::Editor`] and rendering its state.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`editor`] | Editor shell: hall selection, object palette, save/reset orchestration |
//! | [`model`] | Plan objects, halls, layouts, and the in-memory [`model::LayoutModel`] |
//! | [`interaction`] | Single-slot drag/resize/rotate state machine |
//! | [`geometry`] | Angle normalization, right-angle snapping, minimum-size clamping |
//! | [`draft`] | Local draft keys, validated reads, and the autosave debouncer |
//! | [`store`] | Key-value local store contract with memory and file backends |
//! | [`gateway`] | Async hall/layout gateway contract and an in-memory gateway |
//! | [`clock`] | Millisecond wall clock, swappable for tests |
//! | [`config`] | Editor configuration loaded from environment variables |
//! | [`consts`] | Shared numeric constants (minimum sizes, snap threshold, defaults) |

pub mod clock;
pub mod config;
pub mod consts;
pub mod draft;
pub mod editor;
pub mod gateway;
pub mod geometry;
pub mod interaction;
pub mod model;
pub mod store;
