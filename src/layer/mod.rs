//! Layers: slices resolved into a dependency graph
//!
//! `resolve` builds the graph for a request and merges it into ordered,
//! section-tagged lines; `compose` wraps that into the end-to-end
//! resolve, render and output steps used by the commands.

pub mod compose;
pub mod resolve;

pub use compose::{
    compute_image_tag, output_path, parse_layer_list, prepare_build_dir, render, resolve,
    resolve_registry, state_dir, Resolution,
};
pub use resolve::{Layer, LayerRegistry, LayerState};
