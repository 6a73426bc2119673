mod common;

use common::NORMALIZED;
use common::RAGGED;
use fmindent_core::AnyEmptyResult;

#[test]
fn stdin_writes_normalized_document() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::fmindent_cmd()
		.arg("stdin")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin(RAGGED)
		.assert()
		.success()
		.stdout(NORMALIZED);

	Ok(())
}

#[test]
fn stdin_keeps_crlf_line_endings() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::fmindent_cmd()
		.arg("stdin")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("---\r\nlicense: |\r\n\r\n         MIT\r\n---\r\n")
		.assert()
		.success()
		.stdout("---\r\nlicense: |\r\n\r\n  MIT\r\n---\r\n");

	Ok(())
}
