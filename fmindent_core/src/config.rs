use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::FmindentError;
use crate::FmindentResult;

/// Default maximum file size in bytes (10 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default number of spaces applied to block scalar content lines.
pub const DEFAULT_INDENT_WIDTH: usize = 2;

/// Keys treated as literal block scalars when none are configured.
pub const DEFAULT_BLOCK_SCALAR_KEYS: [&str; 2] = ["license", "description"];

/// Document extensions scanned when none are configured.
pub const DEFAULT_EXTENSIONS: [&str; 1] = ["md"];

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"fmindent.toml",
	".fmindent.toml",
	".config/fmindent.toml",
];

/// How a buffered block scalar body is re-indented when it is flushed.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlushStrategy {
	/// Strip every line and prepend the configured indentation. Robust against
	/// ragged input but discards nested structure.
	#[default]
	Flatten,
	/// Remove the whitespace shared by every non-blank line, then prepend the
	/// configured indentation. Keeps relative nesting.
	Dedent,
}

/// Validated configuration consumed by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
	/// Top-level keys whose `<key>: |` lines open a block scalar.
	pub block_scalar_keys: BTreeSet<String>,
	/// Spaces prepended to each non-blank block scalar line.
	pub indent_width: usize,
	/// Re-indentation applied to a block scalar body.
	pub strategy: FlushStrategy,
}

impl Default for NormalizeOptions {
	fn default() -> Self {
		Self {
			block_scalar_keys: DEFAULT_BLOCK_SCALAR_KEYS
				.iter()
				.map(ToString::to_string)
				.collect(),
			indent_width: DEFAULT_INDENT_WIDTH,
			strategy: FlushStrategy::default(),
		}
	}
}

impl NormalizeOptions {
	/// Build options from a key list, rejecting keys that could never match a
	/// top-level `<key>: |` line.
	pub fn new<I, S>(keys: I, indent_width: usize) -> FmindentResult<Self>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let block_scalar_keys: BTreeSet<String> = keys.into_iter().map(Into::into).collect();

		if block_scalar_keys.is_empty() {
			return Err(FmindentError::InvalidConfig(
				"at least one block scalar key is required".to_string(),
			));
		}

		for key in &block_scalar_keys {
			if key.is_empty() {
				return Err(FmindentError::InvalidConfig(
					"block scalar keys cannot be empty".to_string(),
				));
			}

			if key.contains(':') || key.chars().any(char::is_whitespace) {
				return Err(FmindentError::InvalidConfig(format!(
					"block scalar key `{key}` cannot contain whitespace or `:`"
				)));
			}
		}

		Ok(Self {
			block_scalar_keys,
			indent_width,
			strategy: FlushStrategy::default(),
		})
	}

	#[must_use]
	pub fn with_strategy(mut self, strategy: FlushStrategy) -> Self {
		self.strategy = strategy;
		self
	}
}

/// Configuration loaded from an `fmindent.toml` file.
///
/// ```toml
/// [normalize]
/// keys = ["license", "description"]
/// indent_width = 2
/// strategy = "flatten"
///
/// [scan]
/// extensions = ["md", "mdx"]
/// max_file_size = 10485760
/// disable_gitignore = false
///
/// [exclude]
/// patterns = ["vendor/", "*.generated.md"]
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct FmindentConfig {
	/// Which keys are normalized and how.
	#[serde(default)]
	pub normalize: NormalizeConfig,
	/// Which documents are discovered.
	#[serde(default)]
	pub scan: ScanConfig,
	/// Exclusion configuration using gitignore-style patterns.
	#[serde(default)]
	pub exclude: ExcludeConfig,
}

/// The `[normalize]` section.
#[derive(Debug, Default, Deserialize)]
pub struct NormalizeConfig {
	/// Block scalar key names. Defaults to `license` and `description`.
	#[serde(default)]
	pub keys: Option<Vec<String>>,
	/// Target indentation width. Defaults to 2.
	#[serde(default)]
	pub indent_width: Option<usize>,
	#[serde(default)]
	pub strategy: FlushStrategy,
}

/// The `[scan]` section.
#[derive(Debug, Deserialize)]
pub struct ScanConfig {
	/// File extensions (without the dot) treated as documents.
	#[serde(default = "default_extensions")]
	pub extensions: Vec<String>,
	/// Maximum file size in bytes. Larger files are reported and skipped.
	#[serde(default = "default_max_file_size")]
	pub max_file_size: u64,
	/// When true, `.gitignore` files are not used for filtering.
	#[serde(default)]
	pub disable_gitignore: bool,
}

impl Default for ScanConfig {
	fn default() -> Self {
		Self {
			extensions: default_extensions(),
			max_file_size: DEFAULT_MAX_FILE_SIZE,
			disable_gitignore: false,
		}
	}
}

/// The `[exclude]` section.
#[derive(Debug, Default, Deserialize)]
pub struct ExcludeConfig {
	/// Gitignore-style patterns for files and directories to skip.
	#[serde(default)]
	pub patterns: Vec<String>,
}

fn default_extensions() -> Vec<String> {
	DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect()
}

fn default_max_file_size() -> u64 {
	DEFAULT_MAX_FILE_SIZE
}

impl FmindentConfig {
	/// Resolve the config file path in `root`, if any candidate exists.
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from `root`. Returns `Ok(None)` when no config file
	/// exists.
	pub fn load(root: &Path) -> FmindentResult<Option<FmindentConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		tracing::debug!(path = %config_path.display(), "loading config");
		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::parse(&content)?;

		Ok(Some(config))
	}

	pub fn parse(content: &str) -> FmindentResult<FmindentConfig> {
		toml::from_str(content).map_err(|e| FmindentError::ConfigParse(e.to_string()))
	}

	/// Convert the `[normalize]` section into validated options.
	pub fn normalize_options(&self) -> FmindentResult<NormalizeOptions> {
		let defaults = NormalizeOptions::default();
		let indent_width = self.normalize.indent_width.unwrap_or(defaults.indent_width);
		let options = match &self.normalize.keys {
			Some(keys) => NormalizeOptions::new(keys.iter().cloned(), indent_width)?,
			None => NormalizeOptions {
				indent_width,
				..defaults
			},
		};

		Ok(options.with_strategy(self.normalize.strategy))
	}
}
