mod common;

use common::NORMALIZED;
use common::RAGGED;
use fmindent_core::AnyEmptyResult;
use similar_asserts::assert_eq;

#[test]
fn fix_rewrites_documents_in_place() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir_all(tmp.path().join("data"))?;
	std::fs::write(tmp.path().join("data/barchart.md"), RAGGED)?;
	std::fs::write(tmp.path().join("notes.txt"), RAGGED)?;

	common::fmindent_cmd()
		.arg("fix")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Fixed 1 document(s)."));

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("data/barchart.md"))?,
		NORMALIZED
	);
	// Only configured extensions are touched.
	assert_eq!(std::fs::read_to_string(tmp.path().join("notes.txt"))?, RAGGED);

	common::fmindent_cmd()
		.arg("fix")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("already normalized"));

	Ok(())
}

#[test]
fn fix_dry_run_does_not_write() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("doc.md"), RAGGED)?;

	common::fmindent_cmd()
		.arg("fix")
		.arg("--dry-run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("would fix 2 line(s) in 1 document(s)"))
		.stdout(predicates::str::contains("doc.md"));

	assert_eq!(std::fs::read_to_string(tmp.path().join("doc.md"))?, RAGGED);

	Ok(())
}

#[test]
fn fix_uses_indent_and_strategy_flags() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("doc.md"),
		"---\ndescription: |\n      Steps:\n        - one\n---\n",
	)?;

	common::fmindent_cmd()
		.arg("fix")
		.arg("--indent")
		.arg("4")
		.arg("--strategy")
		.arg("dedent")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("doc.md"))?,
		"---\ndescription: |\n    Steps:\n      - one\n---\n"
	);

	Ok(())
}

#[test]
fn fix_reads_config_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("fmindent.toml"),
		"[normalize]\nkeys = [\"summary\"]\nindent_width = 3\n",
	)?;
	std::fs::write(
		tmp.path().join("doc.md"),
		"---\nsummary: |\n text\nlicense: |\n        MIT\n---\n",
	)?;

	common::fmindent_cmd()
		.arg("fix")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("doc.md"))?,
		"---\nsummary: |\n   text\nlicense: |\n        MIT\n---\n"
	);

	Ok(())
}

#[test]
fn fix_continues_past_unreadable_documents() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("a.md"), [0xff, 0xfe, 0x00])?;
	std::fs::write(tmp.path().join("b.md"), RAGGED)?;

	common::fmindent_cmd()
		.arg("fix")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("a.md"))
		.stderr(predicates::str::contains("1 document(s) could not be read"));

	assert_eq!(std::fs::read_to_string(tmp.path().join("b.md"))?, NORMALIZED);

	Ok(())
}

#[cfg(unix)]
#[test]
fn fix_continues_past_unwritable_documents() -> AnyEmptyResult {
	use std::os::unix::fs::PermissionsExt;

	let tmp = tempfile::tempdir()?;
	let locked = tmp.path().join("a.md");
	std::fs::write(&locked, RAGGED)?;
	std::fs::write(tmp.path().join("b.md"), RAGGED)?;
	std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o444))?;

	// Permission bits do not bind a privileged user.
	if std::fs::OpenOptions::new().write(true).open(&locked).is_ok() {
		return Ok(());
	}

	common::fmindent_cmd()
		.arg("fix")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stdout(predicates::str::contains("Fixed 1 document(s)."))
		.stderr(predicates::str::contains("a.md"))
		.stderr(predicates::str::contains("1 document(s) could not be written"));

	assert_eq!(std::fs::read_to_string(&locked)?, RAGGED);
	assert_eq!(std::fs::read_to_string(tmp.path().join("b.md"))?, NORMALIZED);

	Ok(())
}

#[test]
fn fix_only_listed_files() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let listed = tmp.path().join("listed.md");
	let other = tmp.path().join("other.md");
	std::fs::write(&listed, RAGGED)?;
	std::fs::write(&other, RAGGED)?;

	common::fmindent_cmd()
		.arg("fix")
		.arg("--path")
		.arg(tmp.path())
		.arg(&listed)
		.assert()
		.success();

	assert_eq!(std::fs::read_to_string(&listed)?, NORMALIZED);
	assert_eq!(std::fs::read_to_string(&other)?, RAGGED);

	Ok(())
}

#[test]
fn fix_leaves_documents_without_frontmatter() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let content = "title: X\nlicense: |\n      MIT\n";
	std::fs::write(tmp.path().join("doc.md"), content)?;

	common::fmindent_cmd()
		.arg("fix")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("already normalized"));

	assert_eq!(std::fs::read_to_string(tmp.path().join("doc.md"))?, content);

	Ok(())
}
