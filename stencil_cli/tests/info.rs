mod common;

use stencil_core::AnyEmptyResult;

#[test]
fn info_shows_parameters_and_sources() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let root = tmp.path().join("tpl");
	std::fs::create_dir_all(&root)?;
	std::fs::write(
		root.join("stencil.json"),
		r#"{
			"name": "demo",
			"shortName": "d",
			"parameters": {
				"projectName": { "requirement": "required" },
				"flavor": { "type": "choice", "choices": ["mild", "hot"], "default": "mild" }
			}
		}"#,
	)?;

	let mut cmd = common::stencil_cmd();
	let _ = cmd
		.arg("info")
		.arg("demo")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("projectName"))
		.stdout(predicates::str::contains("required"))
		.stdout(predicates::str::contains("mild|hot"))
		.stdout(predicates::str::contains("./ -> ./"));

	Ok(())
}

#[test]
fn info_fails_for_unknown_templates() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::stencil_cmd();
	let _ = cmd
		.arg("info")
		.arg("ghost")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.failure()
		.stderr(predicates::str::contains("ghost"));

	Ok(())
}
