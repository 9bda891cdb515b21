mod directory;
mod memory;

pub use directory::DirectorySink;
pub use memory::{Download, MemorySink};

/// Reduce a suggested filename to its last path component.
pub(crate) fn sanitize_filename(filename: &str) -> String {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    match name {
        "" | "." | ".." => "download.png".to_string(),
        name => name.to_string(),
    }
}
