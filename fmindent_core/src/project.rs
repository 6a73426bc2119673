use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;

use crate::FmindentError;
use crate::FmindentResult;
use crate::config::DEFAULT_EXTENSIONS;
use crate::config::DEFAULT_MAX_FILE_SIZE;
use crate::config::FmindentConfig;
use crate::config::NormalizeOptions;
use crate::normalizer::normalize_document_with_report;

/// Options for controlling which documents are discovered.
///
/// Use [`ScanOptions::default()`] for sensible defaults or
/// [`ScanOptions::from_config`] to construct from an [`FmindentConfig`].
#[derive(Debug, Clone)]
pub struct ScanOptions {
	/// Lowercase file extensions (without the dot) treated as documents.
	pub extensions: Vec<String>,
	/// Gitignore-style patterns to exclude from scanning.
	pub exclude_patterns: Vec<String>,
	/// Whether to disable `.gitignore` integration.
	pub disable_gitignore: bool,
	/// Maximum file size to read in bytes.
	pub max_file_size: u64,
}

impl Default for ScanOptions {
	fn default() -> Self {
		Self {
			extensions: DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect(),
			exclude_patterns: Vec::new(),
			disable_gitignore: false,
			max_file_size: DEFAULT_MAX_FILE_SIZE,
		}
	}
}

impl ScanOptions {
	/// Construct [`ScanOptions`] from an [`FmindentConfig`].
	pub fn from_config(config: Option<&FmindentConfig>) -> Self {
		let Some(config) = config else {
			return Self::default();
		};

		Self {
			extensions: config
				.scan
				.extensions
				.iter()
				.map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
				.collect(),
			exclude_patterns: config.exclude.patterns.clone(),
			disable_gitignore: config.scan.disable_gitignore,
			max_file_size: config.scan.max_file_size,
		}
	}

	fn matches_extension(&self, path: &Path) -> bool {
		path.extension()
			.and_then(|ext| ext.to_str())
			.is_some_and(|ext| {
				self.extensions
					.iter()
					.any(|wanted| wanted.eq_ignore_ascii_case(ext))
			})
	}
}

/// A discovered project root with its loaded configuration, ready for
/// checking or fixing.
#[derive(Debug, Clone)]
pub struct ProjectContext {
	/// The directory documents are discovered under.
	pub root: PathBuf,
	/// The config file that was loaded, if any.
	pub config_path: Option<PathBuf>,
	/// Discovery options.
	pub scan: ScanOptions,
	/// Normalizer options.
	pub normalize: NormalizeOptions,
}

impl ProjectContext {
	/// Load configuration discovered in `root`.
	pub fn load(root: &Path) -> FmindentResult<Self> {
		let config = FmindentConfig::load(root)?;
		let scan = ScanOptions::from_config(config.as_ref());
		let normalize = match &config {
			Some(config) => config.normalize_options()?,
			None => NormalizeOptions::default(),
		};

		Ok(Self {
			root: root.to_path_buf(),
			config_path: FmindentConfig::resolve_path(root),
			scan,
			normalize,
		})
	}

	/// Discover every document under the project root.
	pub fn collect_documents(&self) -> FmindentResult<Vec<PathBuf>> {
		collect_documents(&self.root, &self.scan)
	}

	/// Normalize every discovered document without writing anything.
	pub fn process(&self) -> FmindentResult<BatchResult> {
		process_documents(&self.root, &self.scan, &self.normalize)
	}
}

/// A document whose normalized form differs from its current content.
#[derive(Debug, Clone)]
pub struct DocumentChange {
	/// Path of the document.
	pub path: PathBuf,
	/// The content currently on disk.
	pub original: String,
	/// The normalized content.
	pub normalized: String,
	/// Number of configured block scalars in the frontmatter.
	pub block_scalars: usize,
	/// Number of lines that were re-indented.
	pub changed_lines: usize,
}

/// A document that could not be read or written.
#[derive(Debug)]
pub struct DocumentFailure {
	/// Path of the document.
	pub path: PathBuf,
	/// Why it failed.
	pub error: FmindentError,
}

/// Result of normalizing a batch of documents.
#[derive(Debug, Default)]
pub struct BatchResult {
	/// Number of documents read and normalized successfully.
	pub processed: usize,
	/// Documents whose content would change.
	pub changed: Vec<DocumentChange>,
	/// Documents that failed. A failure never stops the rest of the batch.
	pub failures: Vec<DocumentFailure>,
}

impl BatchResult {
	/// Returns true if no document needs changing and nothing failed.
	pub fn is_ok(&self) -> bool {
		self.changed.is_empty() && self.failures.is_empty()
	}

	/// Total number of lines re-indented across the batch.
	pub fn changed_lines(&self) -> usize {
		self.changed.iter().map(|change| change.changed_lines).sum()
	}
}

/// Discover documents under `root` and normalize each of them. Directories
/// that could not be walked are reported alongside unreadable documents.
pub fn process_documents(
	root: &Path,
	scan: &ScanOptions,
	options: &NormalizeOptions,
) -> FmindentResult<BatchResult> {
	let documents = scan_documents(root, scan)?;
	tracing::debug!(count = documents.files.len(), root = %root.display(), "discovered documents");
	let mut result = process_paths(&documents.files, options, scan.max_file_size);
	result.failures.extend(documents.failures);
	Ok(result)
}

/// Read and normalize each path independently. Failures are collected per
/// document.
pub fn process_paths(
	paths: &[PathBuf],
	options: &NormalizeOptions,
	max_file_size: u64,
) -> BatchResult {
	let mut result = BatchResult::default();

	for path in paths {
		match process_document(path, options, max_file_size) {
			Ok(change) => {
				result.processed += 1;
				if let Some(change) = change {
					tracing::debug!(
						path = %path.display(),
						lines = change.changed_lines,
						"document needs normalizing"
					);
					result.changed.push(change);
				} else {
					tracing::debug!(path = %path.display(), "document already normalized");
				}
			}
			Err(error) => {
				tracing::warn!(path = %path.display(), %error, "failed to process document");
				result.failures.push(DocumentFailure {
					path: path.clone(),
					error,
				});
			}
		}
	}

	result
}

/// Normalize a single document from disk. Returns `None` if it is already
/// normalized.
pub fn process_document(
	path: &Path,
	options: &NormalizeOptions,
	max_file_size: u64,
) -> FmindentResult<Option<DocumentChange>> {
	let original = read_document(path, max_file_size)?;
	let report = normalize_document_with_report(&original, options);

	if !report.is_changed() {
		return Ok(None);
	}

	Ok(Some(DocumentChange {
		path: path.to_path_buf(),
		original,
		normalized: report.content,
		block_scalars: report.block_scalars,
		changed_lines: report.changed_lines,
	}))
}

fn read_document(path: &Path, max_file_size: u64) -> FmindentResult<String> {
	let size = std::fs::metadata(path)?.len();
	if size > max_file_size {
		return Err(FmindentError::FileTooLarge {
			path: path.display().to_string(),
			size,
			limit: max_file_size,
		});
	}

	let bytes = std::fs::read(path)?;
	String::from_utf8(bytes).map_err(|_| {
		FmindentError::NonUtf8 {
			path: path.display().to_string(),
		}
	})
}

/// Write every changed document back in place. Each write is independent; the
/// failures are returned rather than aborting the remaining writes.
pub fn write_changes(result: &BatchResult) -> Vec<DocumentFailure> {
	let mut failures = Vec::new();

	for change in &result.changed {
		if let Err(e) = std::fs::write(&change.path, &change.normalized) {
			tracing::warn!(path = %change.path.display(), error = %e, "failed to write document");
			failures.push(DocumentFailure {
				path: change.path.clone(),
				error: e.into(),
			});
		}
	}

	failures
}

/// Documents found under a root, plus the directories that could not be
/// walked.
#[derive(Debug, Default)]
pub struct DocumentScan {
	/// Matching documents, sorted.
	pub files: Vec<PathBuf>,
	/// Unreadable directories and symlink cycles. None of them stop the walk.
	pub failures: Vec<DocumentFailure>,
}

/// Collect every document under `root` whose extension is configured.
///
/// When `disable_gitignore` is false (the default), files matched by the
/// root `.gitignore` are skipped. Exclude patterns follow gitignore syntax and
/// are always applied on top. Directories that cannot be walked are logged
/// and skipped; use [`scan_documents`] to receive them as failures.
pub fn collect_documents(root: &Path, options: &ScanOptions) -> FmindentResult<Vec<PathBuf>> {
	Ok(scan_documents(root, options)?.files)
}

/// Walk `root` like [`collect_documents`], keeping per-directory failures.
///
/// A directory reached a second time through a symlink is skipped. Only a
/// symlink back to a directory currently being descended is a cycle.
pub fn scan_documents(root: &Path, options: &ScanOptions) -> FmindentResult<DocumentScan> {
	let gitignore = if options.disable_gitignore {
		Gitignore::empty()
	} else {
		build_gitignore(root)
	};
	let custom_exclude = build_exclude_matcher(root, &options.exclude_patterns)?;

	let mut walker = Walker {
		options,
		gitignore: &gitignore,
		custom_exclude: &custom_exclude,
		visited: HashSet::new(),
		ancestors: Vec::new(),
		scan: DocumentScan::default(),
	};
	walker.walk(root);

	let mut scan = walker.scan;
	// Sort for deterministic ordering.
	scan.files.sort();
	Ok(scan)
}

/// Build a `Gitignore` matcher from `[exclude]` patterns.
fn build_exclude_matcher(root: &Path, patterns: &[String]) -> FmindentResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			FmindentError::ConfigParse(format!("invalid exclude pattern `{pattern}`: {e}"))
		})?;
	}
	builder
		.build()
		.map_err(|e| FmindentError::ConfigParse(format!("failed to build exclude rules: {e}")))
}

/// Build a `Gitignore` matcher from the root `.gitignore` file (if any).
fn build_gitignore(root: &Path) -> Gitignore {
	let mut builder = GitignoreBuilder::new(root);
	let gitignore_path = root.join(".gitignore");
	if gitignore_path.exists() {
		let _ = builder.add(gitignore_path);
	}
	builder.build().unwrap_or_else(|_| Gitignore::empty())
}

fn is_ignored_directory_name(name: &str) -> bool {
	name.starts_with('.') || name == "node_modules" || name == "target"
}

struct Walker<'a> {
	options: &'a ScanOptions,
	gitignore: &'a Gitignore,
	custom_exclude: &'a Gitignore,
	/// Canonical paths of every directory walked so far.
	visited: HashSet<PathBuf>,
	/// Canonical paths of the directories currently being descended.
	ancestors: Vec<PathBuf>,
	scan: DocumentScan,
}

impl Walker<'_> {
	fn walk(&mut self, dir: &Path) {
		if !dir.is_dir() {
			return;
		}

		let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
		if self.ancestors.contains(&canonical) {
			tracing::warn!(path = %dir.display(), "symlink cycle, skipping directory");
			self.fail(dir, FmindentError::SymlinkCycle {
				path: dir.display().to_string(),
			});
			return;
		}
		if !self.visited.insert(canonical.clone()) {
			tracing::trace!(path = %dir.display(), "directory already walked");
			return;
		}

		let entries = match std::fs::read_dir(dir) {
			Ok(entries) => entries,
			Err(error) => {
				tracing::warn!(path = %dir.display(), %error, "failed to read directory");
				self.fail(dir, error.into());
				return;
			}
		};

		self.ancestors.push(canonical);
		for entry in entries {
			let path = match entry {
				Ok(entry) => entry.path(),
				Err(error) => {
					tracing::warn!(path = %dir.display(), %error, "failed to read directory entry");
					self.fail(dir, error.into());
					continue;
				}
			};
			let is_dir = path.is_dir();

			if is_dir
				&& path
					.file_name()
					.and_then(|n| n.to_str())
					.is_some_and(is_ignored_directory_name)
			{
				continue;
			}

			if self.gitignore.matched(&path, is_dir).is_ignore()
				|| self.custom_exclude.matched(&path, is_dir).is_ignore()
			{
				tracing::trace!(path = %path.display(), "excluded");
				continue;
			}

			if is_dir {
				self.walk(&path);
			} else if self.options.matches_extension(&path) {
				self.scan.files.push(path);
			}
		}
		self.ancestors.pop();
	}

	fn fail(&mut self, path: &Path, error: FmindentError) {
		self.scan.failures.push(DocumentFailure {
			path: path.to_path_buf(),
			error,
		});
	}
}
