//! Position signal abstraction

/// Anything that can report the current position of a tracked view
///
/// Scroll metrics report pixels, media elements report seconds. Closures
/// returning `f64` work as ad-hoc providers.
pub trait PositionSource {
    /// Current position, read at sample time
    fn position(&self) -> f64;
}

impl<F> PositionSource for F
where
    F: Fn() -> f64,
{
    fn position(&self) -> f64 {
        self()
    }
}
