//! Loader-scoped resources.
//!
//! A `ResourceLoader` stands for the resource view of a loading context:
//! service manifests are looked up through it by name.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::PathBuf;

/// Environment variable listing the global classpath roots.
pub const CLASSPATH_ENV: &str = "EL_CLASSPATH";

/// Resource access for a loading context.
pub trait ResourceLoader: Send + Sync {
	/// Opens the resource called `name`.
	///
	/// `Ok(None)` means the resource does not exist. An error means it exists
	/// but could not be opened. The returned reader is released on drop.
	fn open(&self, name: &str) -> io::Result<Option<Box<dyn Read + Send>>>;
}

/// Resources resolved against an ordered list of root directories.
#[derive(Debug, Clone, Default)]
pub struct ClasspathLoader {
	roots: Vec<PathBuf>,
}

impl ClasspathLoader {
	pub fn new(roots: Vec<PathBuf>) -> Self {
		Self { roots }
	}

	/// Roots taken from `EL_CLASSPATH`, using the platform path separator.
	/// An unset variable yields a loader without roots.
	pub fn from_env() -> Self {
		let roots = std::env::var_os(CLASSPATH_ENV)
			.map(|paths| std::env::split_paths(&paths).collect())
			.unwrap_or_default();
		Self { roots }
	}

	pub fn roots(&self) -> &[PathBuf] {
		&self.roots
	}
}

impl ResourceLoader for ClasspathLoader {
	fn open(&self, name: &str) -> io::Result<Option<Box<dyn Read + Send>>> {
		for root in &self.roots {
			let path = root.join(name);
			if !path.is_file() {
				continue;
			}
			return match File::open(&path) {
				Ok(file) => {
					tracing::debug!("Opened resource {}", path.display());
					Ok(Some(Box::new(file)))
				},
				Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
				Err(e) => Err(e),
			};
		}
		Ok(None)
	}
}

/// In-memory resources, for embedding manifests in a binary or for tests.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedLoader {
	resources: HashMap<String, Vec<u8>>,
}

impl EmbeddedLoader {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds or replaces the resource `name`.
	pub fn with_resource(mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
		self.resources.insert(name.into(), content.into());
		self
	}
}

impl ResourceLoader for EmbeddedLoader {
	fn open(&self, name: &str) -> io::Result<Option<Box<dyn Read + Send>>> {
		Ok(self
			.resources
			.get(name)
			.map(|content| Box::new(Cursor::new(content.clone())) as Box<dyn Read + Send>))
	}
}
