use std::path::PathBuf;

use sn_shell::PidlAbsolute;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatcherError {
	#[error("location can't be watched as it isn't on the file system: <pidl='{0}'>")]
	NotFileSystem(PidlAbsolute),
	#[error("failed to watch directory: <path='{}'>", .path.display())]
	Watch {
		path: PathBuf,
		#[source]
		source: notify::Error,
	},
	#[error("failed to start the watcher backend: {0}")]
	Backend(#[from] notify::Error),
}
