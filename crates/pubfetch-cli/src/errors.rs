//! Error types for the `get-papers-list` command.
//!
//! The errors are transparent so the underlying library or file system message
//! is what the user sees.

use thiserror::Error;

/// Errors that can end a command run.
#[derive(Error, Debug)]
pub enum CliErrors {
  /// Errors from the underlying pubfetch library
  #[error(transparent)]
  Pubfetch(#[from] pubfetch::errors::PubfetchError),

  /// File system and IO operation errors
  #[error(transparent)]
  IO(#[from] std::io::Error),
}
