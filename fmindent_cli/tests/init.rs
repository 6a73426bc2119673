mod common;

use fmindent_core::AnyEmptyResult;
use fmindent_core::FmindentConfig;
use fmindent_core::NormalizeOptions;

#[test]
fn init_creates_loadable_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::fmindent_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Created"));

	let config = FmindentConfig::load(tmp.path())?.ok_or("config should exist")?;
	assert_eq!(config.normalize_options()?, NormalizeOptions::default());

	Ok(())
}

#[test]
fn init_is_noop_when_config_exists() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join(".fmindent.toml"), "# custom\n")?;

	common::fmindent_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("already exists"));

	assert!(!tmp.path().join("fmindent.toml").exists());
	assert_eq!(
		std::fs::read_to_string(tmp.path().join(".fmindent.toml"))?,
		"# custom\n"
	);

	Ok(())
}
