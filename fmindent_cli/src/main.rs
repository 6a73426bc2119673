use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::mpsc;
use std::time::Duration;

use clap::Parser;
use fmindent_cli::Commands;
use fmindent_cli::FmindentCli;
use fmindent_cli::OutputFormat;
use fmindent_core::BatchResult;
use fmindent_core::DocumentFailure;
use fmindent_core::FmindentConfig;
use fmindent_core::NormalizeOptions;
use fmindent_core::ProjectContext;
use fmindent_core::normalize_document;
use fmindent_core::process_paths;
use fmindent_core::write_changes;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = FmindentCli::parse();

	// Respect NO_COLOR env var, --no-color flag, and non-terminal output.
	let use_color = !args.no_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(supports_color::Stream::Stderr).is_some();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match &args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Check {
			diff,
			format,
			files,
		}) => run_check(&args, *diff, *format, files),
		Some(Commands::Fix {
			dry_run,
			watch,
			files,
		}) => run_fix(&args, *dry_run, *watch, files),
		Some(Commands::Stdin) => run_stdin(&args),
		None => {
			eprintln!("No subcommand specified. Run `fmindent --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<fmindent_core::FmindentError>() {
			Ok(err) => {
				let report: miette::Report = (*err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Log to stderr. `FMINDENT_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_env("FMINDENT_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.init();
}

fn resolve_root(args: &FmindentCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Load the project config and apply command line overrides.
fn load_context(args: &FmindentCli) -> Result<ProjectContext, Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let mut ctx = ProjectContext::load(&root)?;

	if !args.keys.is_empty() {
		ctx.normalize = NormalizeOptions::new(args.keys.iter().cloned(), ctx.normalize.indent_width)?
			.with_strategy(ctx.normalize.strategy);
	}
	if let Some(indent) = args.indent {
		ctx.normalize.indent_width = indent;
	}
	if let Some(strategy) = args.strategy {
		ctx.normalize.strategy = strategy.into();
	}

	tracing::debug!(
		root = %ctx.root.display(),
		config = ?ctx.config_path,
		"loaded project"
	);

	if args.verbose {
		let keys: Vec<_> = ctx.normalize.block_scalar_keys.iter().cloned().collect();
		eprintln!(
			"Normalizing `{}` with {} space(s) ({:?})",
			keys.join("`, `"),
			ctx.normalize.indent_width,
			ctx.normalize.strategy
		);
	}

	Ok(ctx)
}

/// Normalize either the explicitly listed files or every document in the
/// project.
fn run_batch(
	ctx: &ProjectContext,
	files: &[PathBuf],
) -> Result<BatchResult, Box<dyn std::error::Error>> {
	if files.is_empty() {
		return Ok(ctx.process()?);
	}

	Ok(process_paths(files, &ctx.normalize, ctx.scan.max_file_size))
}

fn run_init(args: &FmindentCli) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);

	if let Some(existing) = FmindentConfig::resolve_path(&root) {
		println!("Config file already exists: {}", existing.display());
		return Ok(());
	}

	let config_path = root.join("fmindent.toml");
	let sample_config = "# fmindent configuration\n\n[normalize]\n# Top-level keys whose `key: |` \
	                     block scalars are re-indented.\nkeys = [\"license\", \"description\"]\n# \
	                     Spaces applied to every block scalar line.\nindent_width = 2\n# \
	                     `flatten` strips every line; `dedent` keeps relative nesting.\nstrategy = \
	                     \"flatten\"\n\n[scan]\nextensions = [\"md\"]\n\n# [exclude]\n# patterns \
	                     = [\"vendor/\"]\n";

	std::fs::write(&config_path, sample_config)?;
	println!("Created {}", config_path.display());

	Ok(())
}

fn run_check(
	args: &FmindentCli,
	show_diff: bool,
	format: OutputFormat,
	files: &[PathBuf],
) -> Result<(), Box<dyn std::error::Error>> {
	let ctx = load_context(args)?;
	let result = run_batch(&ctx, files)?;
	let root = &ctx.root;

	match format {
		OutputFormat::Json => {
			let changed: Vec<serde_json::Value> = result
				.changed
				.iter()
				.map(|change| {
					serde_json::json!({
						"file": make_relative(&change.path, root),
						"block_scalars": change.block_scalars,
						"changed_lines": change.changed_lines,
					})
				})
				.collect();
			let failures: Vec<serde_json::Value> = result
				.failures
				.iter()
				.map(|failure| {
					serde_json::json!({
						"file": make_relative(&failure.path, root),
						"message": failure.error.to_string(),
					})
				})
				.collect();
			let output = serde_json::json!({
				"ok": result.is_ok(),
				"processed": result.processed,
				"changed": changed,
				"failures": failures,
			});
			println!("{output}");
		}
		OutputFormat::Github => {
			for failure in &result.failures {
				let rel = make_relative(&failure.path, root);
				println!("::error file={rel}::{}", failure.error);
			}
			for change in &result.changed {
				let rel = make_relative(&change.path, root);
				println!(
					"::warning file={rel}::{} frontmatter line(s) need re-indenting",
					change.changed_lines
				);
			}
			if result.is_ok() {
				println!("All frontmatter block scalars are normalized.");
			} else {
				eprintln!("{}", check_summary(&result));
			}
		}
		OutputFormat::Text => {
			print_failures(&result.failures, root);

			if result.is_ok() {
				println!(
					"Check passed: {} document(s) have normalized frontmatter.",
					result.processed
				);
			} else {
				eprintln!("Check failed.");
				if !result.changed.is_empty() {
					eprintln!();
					eprintln!("Documents needing fixes:");
					for change in &result.changed {
						let rel = make_relative(&change.path, root);
						eprintln!("  {rel} ({} line(s))", change.changed_lines);

						if show_diff {
							print_diff(&change.original, &change.normalized);
						}
					}
				}
				eprintln!();
				eprintln!("{}", check_summary(&result));
			}
		}
	}

	if !result.is_ok() {
		process::exit(1);
	}

	Ok(())
}

fn check_summary(result: &BatchResult) -> String {
	let mut parts = Vec::new();
	if !result.changed.is_empty() {
		parts.push(format!(
			"{} document(s) need re-indenting. Run `fmindent fix` to fix",
			result.changed.len()
		));
	}
	if !result.failures.is_empty() {
		parts.push(format!(
			"{} document(s) could not be read",
			result.failures.len()
		));
	}
	format!("{}.", parts.join("; "))
}

fn run_fix(
	args: &FmindentCli,
	dry_run: bool,
	watch: bool,
	files: &[PathBuf],
) -> Result<(), Box<dyn std::error::Error>> {
	// Run the initial fix.
	run_fix_once(args, dry_run, files)?;

	if !watch || dry_run {
		return Ok(());
	}

	// Watch mode
	println!("\nWatching for file changes... (press Ctrl+C to stop)");

	let root = resolve_root(args);
	let (tx, rx) = mpsc::channel();

	let mut watcher =
		notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
			if let Ok(event) = res {
				if matches!(
					event.kind,
					notify::EventKind::Modify(_) | notify::EventKind::Create(_)
				) {
					let _ = tx.send(());
				}
			}
		})?;

	use notify::Watcher;
	watcher.watch(&root, notify::RecursiveMode::Recursive)?;

	loop {
		rx.recv()?;
		// Debounce: drain additional events within 200ms.
		while rx.recv_timeout(Duration::from_millis(200)).is_ok() {}

		println!("\nFile change detected, fixing...");
		if let Err(e) = run_fix_once(args, false, files) {
			eprintln!("{} {e}", colored!("error:", red));
		}

		// Our own writes trigger events too; drop them.
		while rx.recv_timeout(Duration::from_millis(200)).is_ok() {}
	}
}

fn run_fix_once(
	args: &FmindentCli,
	dry_run: bool,
	files: &[PathBuf],
) -> Result<(), Box<dyn std::error::Error>> {
	let ctx = load_context(args)?;
	let result = run_batch(&ctx, files)?;
	let root = &ctx.root;

	print_failures(&result.failures, root);

	if result.changed.is_empty() {
		println!("All documents are already normalized.");
	} else if dry_run {
		println!(
			"Dry run: would fix {} line(s) in {} document(s):",
			result.changed_lines(),
			result.changed.len()
		);
		for change in &result.changed {
			println!("  {}", make_relative(&change.path, root));
		}
	} else {
		let write_failures = write_changes(&result);
		print_failures(&write_failures, root);

		let fixed = result.changed.len() - write_failures.len();
		println!("{} {fixed} document(s).", colored!("Fixed", green));

		if args.verbose {
			for change in &result.changed {
				println!("  {}", make_relative(&change.path, root));
			}
		}

		if !write_failures.is_empty() {
			return Err(format!("{} document(s) could not be written", write_failures.len()).into());
		}
	}

	if !result.failures.is_empty() {
		return Err(format!("{} document(s) could not be read", result.failures.len()).into());
	}

	Ok(())
}

fn run_stdin(args: &FmindentCli) -> Result<(), Box<dyn std::error::Error>> {
	let ctx = load_context(args)?;
	let mut input = String::new();
	std::io::stdin().read_to_string(&mut input)?;

	let output = normalize_document(&input, &ctx.normalize);
	let mut stdout = std::io::stdout().lock();
	stdout.write_all(output.as_bytes())?;
	stdout.flush()?;

	Ok(())
}

fn print_failures(failures: &[DocumentFailure], root: &Path) {
	for failure in failures {
		let rel = make_relative(&failure.path, root);
		eprintln!("{} {rel}: {}", colored!("warning:", yellow), failure.error);
	}
}

/// Print a unified diff between two strings, colorized.
fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
