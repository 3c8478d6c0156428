// Adapters layer: concrete implementations of the ports for files and terminals.

pub mod notifier;
pub mod pixel_file;

pub use notifier::StderrNotifier;
pub use pixel_file::{load_grid, load_pixel_source, GridFormat};
