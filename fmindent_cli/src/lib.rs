use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use fmindent_core::FlushStrategy;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Repair ragged indentation inside YAML frontmatter block scalars.",
	long_about = "fmindent finds `key: |` literal block scalars in the YAML frontmatter of \
	              markdown documents and rewrites their bodies to a single, uniform \
	              indentation. Everything else in the document is left byte-identical.\n\nQuick \
	              start:\n  fmindent check   Report documents that need fixing\n  fmindent fix     \
	              Rewrite documents in place\n  fmindent stdin   Normalize standard input\n  \
	              fmindent init    Create an fmindent.toml"
)]
pub struct FmindentCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,

	/// Block scalar key to normalize. Repeat to pass several keys. Replaces
	/// the keys from fmindent.toml.
	#[arg(long = "key", global = true, value_name = "KEY")]
	pub keys: Vec<String>,

	/// Number of spaces applied to each block scalar line.
	#[arg(long, global = true, value_name = "WIDTH")]
	pub indent: Option<usize>,

	/// How block scalar bodies are re-indented.
	#[arg(long, global = true, value_enum)]
	pub strategy: Option<StrategyArg>,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Create a sample `fmindent.toml` in the project root.
	///
	/// If a config file already exists this command is a no-op and exits
	/// successfully.
	Init,
	/// Check that every document's frontmatter block scalars are normalized.
	///
	/// Exits with a non-zero status code if any document would change or
	/// could not be read. Ideal for CI pipelines.
	Check {
		/// Show a diff for each document that would change.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format for check results. Use `text` for human-readable
		/// output, `json` for programmatic consumption, or `github` for
		/// GitHub Actions annotations.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,

		/// Documents to check. Defaults to every document under the project
		/// root.
		files: Vec<PathBuf>,
	},
	/// Rewrite documents in place with normalized block scalars.
	///
	/// Use `--dry-run` to list the documents that would change without
	/// writing, or `--watch` to re-run whenever files change.
	Fix {
		/// Preview changes without writing files.
		#[arg(long, default_value_t = false)]
		dry_run: bool,

		/// Watch for file changes and re-run automatically.
		#[arg(long, default_value_t = false)]
		watch: bool,

		/// Documents to fix. Defaults to every document under the project
		/// root.
		files: Vec<PathBuf>,
	},
	/// Normalize a document read from stdin and write it to stdout.
	Stdin,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
	/// GitHub Actions annotation format.
	Github,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StrategyArg {
	/// Strip every line and apply the indent (default).
	Flatten,
	/// Remove the shared margin and apply the indent, keeping nesting.
	Dedent,
}

impl From<StrategyArg> for FlushStrategy {
	fn from(value: StrategyArg) -> Self {
		match value {
			StrategyArg::Flatten => Self::Flatten,
			StrategyArg::Dedent => Self::Dedent,
		}
	}
}
