#![allow(dead_code)]

use assert_cmd::Command;

pub const RAGGED: &str = "---\ntitle: X\nlicense: |\n    MIT\n      Copyright 2024\n---\nbody\n";

pub const NORMALIZED: &str = "---\ntitle: X\nlicense: |\n  MIT\n  Copyright 2024\n---\nbody\n";

pub fn fmindent_cmd() -> Command {
	let mut cmd = Command::cargo_bin("fmindent").unwrap_or_else(|e| panic!("binary: {e}"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("FMINDENT_LOG");
	cmd
}
