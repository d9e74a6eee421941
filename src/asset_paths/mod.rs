//! Turning manifest output paths into the paths a browser should request.
//!
//! Manifest keys may be absolute or relative to the bundler's working directory, and the
//! configured output directory may be written either way too. Everything is made absolute and
//! folded lexically before the output directory prefix is stripped, so the result does not
//! depend on how the caller spelled either path.

mod normalize;
mod resolver;

pub use normalize::{absolutize, normalize, relative_to, to_slash};
pub use resolver::PathResolver;
