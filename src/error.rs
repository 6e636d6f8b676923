use thiserror::Error;

/// The dataset could not be acquired. Shown in place of the charts.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("CSV must contain columns: {}.", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error(transparent)]
    Malformed(#[from] anyhow::Error),
}

/// A chart specification cannot be drawn as configured.
#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error("invalid chart dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("axis range [{lo}, {hi}] is not finite")]
    NonFiniteRange { lo: f64, hi: f64 },
}

/// Export of the current chart failed. Shown next to the export control only.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PNG export requires a build with the `png-export` feature (skia rasterizer)")]
    RasterizerUnavailable,

    #[error("nothing to export: {0}")]
    NothingToExport(&'static str),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("{0} failed")]
    Raster(&'static str),

    #[error("writing export: {0}")]
    Io(#[from] std::io::Error),

    #[error("writing CSV: {0}")]
    Csv(#[from] csv::Error),
}
