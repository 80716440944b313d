//! Decoder for TGX geometry containers.
//!
//! A TGX file is a directory of named sub-files. Geometry containers carry a
//! `render_metadata.js` sidecar that describes how the vertex, index and skin
//! sub-files are laid out; everything in this crate turns those raw bytes into
//! flat vertex channels and per-part triangle lists.
//!
//! All decoding is synchronous and works on borrowed, fully resident buffers.
//! Every call only writes to its own freshly allocated output, so callers are
//! free to decode several containers or meshes on separate threads.

pub mod binaries;
pub mod config;
pub mod container;
pub mod error;
pub mod index;
pub mod layout;
pub mod meshes;
pub mod metadata;
pub mod prelude;
pub mod skin;
pub mod stage_part;
pub mod vertex;

pub use error::{TgxError, TgxResult};
