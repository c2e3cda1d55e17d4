use std::io;
use std::path::{Path, PathBuf};

/// A loaded font. The terminal backend draws one cell per character, so the
/// metrics are in cells and `size` is only carried along for scripts.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    path: PathBuf,
    size: f64,
    tab_size: usize,
}

impl Font {
    /// Check that the font file exists and remember it.
    pub fn load(path: impl AsRef<Path>, size: f64) -> io::Result<Self> {
        let path = path.as_ref();
        let meta = std::fs::metadata(path)?;
        if !meta.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a font file: {}", path.display()),
            ));
        }
        Ok(Self {
            path: path.to_path_buf(),
            size,
            tab_size: 4,
        })
    }

    /// Same face at another size
    pub fn with_size(&self, size: f64) -> Self {
        Self {
            size,
            ..self.clone()
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn set_tab_size(&mut self, n: usize) {
        self.tab_size = n.max(1);
    }

    pub fn height(&self) -> i64 {
        1
    }

    pub fn width(&self, text: &str) -> i64 {
        text.chars()
            .map(|c| if c == '\t' { self.tab_size as i64 } else { 1 })
            .sum()
    }
}
