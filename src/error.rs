use thiserror::Error;

/// Typed error taxonomy (§7, §10.2). Degeneracy inside the hot path — a
/// discriminant below zero, `det ~= 0` in the triangle test, a UV outside
/// [0,1], the reflection budget running out — is never represented here:
/// those are expected per-pixel outcomes and stay `Option::None` / clamped
/// fallbacks. `RtError` only covers construction and I/O, which legitimately
/// fail before a render starts.
#[derive(Error, Debug)]
pub enum RtError {
    #[error("invalid construction: {0}")]
    Construction(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse mesh: {0}")]
    MeshParse(String),

    #[error("render requested on a view with no output sink attached")]
    MissingOutput,
}

pub type Result<T> = std::result::Result<T, RtError>;
