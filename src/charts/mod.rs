//! Charts module - Static chart rendering

mod renderer;

pub use renderer::{
    ChartArtifact, ChartFormat, ChartKind, ChartRenderer, RenderError, RenderOptions,
};
