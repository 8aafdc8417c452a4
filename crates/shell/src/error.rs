use crate::PidlAbsolute;

use std::{fmt, io, path::Path};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NamespaceError {
	#[error("item not found: <pidl='{0}'>")]
	NotFound(PidlAbsolute),
	#[error("item is not a container: <pidl='{0}'>")]
	NotAContainer(PidlAbsolute),
	#[error("item has no parent: <pidl='{0}'>")]
	NoParent(PidlAbsolute),
	#[error("item is not a file system location: <pidl='{0}'>")]
	NotFileSystem(PidlAbsolute),
	#[error("unable to parse display name: <name='{0}'>")]
	ParseDisplayName(String),
	#[error("enumeration was stopped")]
	Stopped,
	#[error(transparent)]
	FileIO(#[from] FileIOError),
}

/// File I/O error that includes the path that caused the error
#[derive(Debug, Error)]
pub struct FileIOError {
	pub path: Box<Path>,
	#[source]
	pub source: io::Error,
	pub maybe_context: Option<&'static str>,
}

impl fmt::Display for FileIOError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"file I/O error{}: {}; path: '{}'",
			self.maybe_context
				.map(|ctx| format!(" ({ctx})"))
				.unwrap_or_default(),
			self.source,
			self.path.display()
		)
	}
}

impl<P: AsRef<Path>> From<(P, io::Error)> for FileIOError {
	fn from((path, source): (P, io::Error)) -> Self {
		Self {
			path: path.as_ref().into(),
			source,
			maybe_context: None,
		}
	}
}

impl<P: AsRef<Path>> From<(P, io::Error, &'static str)> for FileIOError {
	fn from((path, source, context): (P, io::Error, &'static str)) -> Self {
		Self {
			path: path.as_ref().into(),
			source,
			maybe_context: Some(context),
		}
	}
}
