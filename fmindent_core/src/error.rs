use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum FmindentError {
	#[error(transparent)]
	#[diagnostic(code(fmindent::io_error))]
	Io(#[from] std::io::Error),

	#[error("invalid configuration: {0}")]
	#[diagnostic(
		code(fmindent::invalid_config),
		help("block scalar keys must be a non-empty list of bare top-level key names")
	)]
	InvalidConfig(String),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(fmindent::config_parse),
		help("check that fmindent.toml is valid TOML with [normalize], [scan] and/or [exclude] sections")
	)]
	ConfigParse(String),

	#[error("file too large: `{path}` is {size} bytes (limit: {limit} bytes)")]
	#[diagnostic(
		code(fmindent::file_too_large),
		help("increase `scan.max_file_size` in fmindent.toml or exclude this file")
	)]
	FileTooLarge { path: String, size: u64, limit: u64 },

	#[error("file is not valid UTF-8: `{path}`")]
	#[diagnostic(
		code(fmindent::non_utf8),
		help("only UTF-8 encoded documents can be normalized")
	)]
	NonUtf8 { path: String },

	#[error("symlink cycle detected at: `{path}`")]
	#[diagnostic(
		code(fmindent::symlink_cycle),
		help("remove the circular symlink or exclude this path")
	)]
	SymlinkCycle { path: String },
}

pub type FmindentResult<T> = Result<T, FmindentError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
