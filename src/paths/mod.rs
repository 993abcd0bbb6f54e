/**
 * Paths Module
 *
 * Where the bundled runtime lives inside the app's resources directory.
 */
mod runtime_dirs;

pub use runtime_dirs::*;
