//! Configuration types for the Trellis pipeline.
//!
//! All types implement [`serde::Deserialize`] so embedders can load
//! them from external configuration.

use serde::Deserialize;

use trellis_parser::{ParseOptions, ValidateOptions};

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Maximum container nesting depth accepted by validation.
    pub max_nesting_depth: usize,

    /// Layout engine settings.
    pub layout: LayoutOptions,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            max_nesting_depth: ValidateOptions::default().max_nesting_depth,
            layout: LayoutOptions::default(),
        }
    }
}

impl CompileOptions {
    pub(crate) fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            validate: ValidateOptions {
                max_nesting_depth: self.max_nesting_depth,
            },
        }
    }
}

/// Spacing and routing knobs for the layout engine.
///
/// Every field has a usable default; identical options and input
/// always produce identical geometry.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Distance between successive ranks along the primary flow axis.
    pub rank_spacing: f32,

    /// Distance between neighboring nodes within one rank.
    pub node_spacing: f32,

    /// Padding between a container's border and its content, unless
    /// the container declares its own.
    pub container_padding: f32,

    /// Upper bound on barycenter ordering sweeps per layout unit. The
    /// sweep alternates downward and upward and stops early when an
    /// iteration changes nothing.
    pub ordering_passes: usize,

    /// Lateral offset between parallel edges of the same node pair,
    /// and between successive self-loops.
    pub parallel_edge_offset: f32,

    /// Control-point offset for curved edges, as a fraction of the
    /// anchor-to-anchor distance.
    pub curve_tension: f32,

    /// Margin around the finished diagram.
    pub margin: f32,

    /// Canvas size used by profiles that place nodes on a fixed map
    /// (wardley evolution/visibility coordinates).
    pub canvas_width: f32,
    pub canvas_height: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            rank_spacing: 80.0,
            node_spacing: 50.0,
            container_padding: 20.0,
            ordering_passes: 4,
            parallel_edge_offset: 14.0,
            curve_tension: 0.25,
            margin: 20.0,
            canvas_width: 800.0,
            canvas_height: 600.0,
        }
    }
}
