mod common;

use stencil_core::AnyEmptyResult;

#[test]
fn list_shows_discovered_templates() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let root = tmp.path().join("tpl");
	std::fs::create_dir_all(&root)?;
	std::fs::write(
		root.join("stencil.json"),
		r#"{ "name": "demo", "shortName": "d", "tags": ["starter"] }"#,
	)?;

	let mut cmd = common::stencil_cmd();
	let _ = cmd
		.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("demo"))
		.stdout(predicates::str::contains("starter"));

	Ok(())
}

#[test]
fn list_reports_empty_roots() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::stencil_cmd();
	let _ = cmd
		.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("No templates found"));

	Ok(())
}

#[test]
fn list_emits_json() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let root = tmp.path().join("tpl");
	std::fs::create_dir_all(&root)?;
	std::fs::write(root.join("stencil.json"), r#"{ "name": "demo" }"#)?;

	let mut cmd = common::stencil_cmd();
	let assert = cmd
		.arg("list")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	let output: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout)?;
	assert_eq!(output["templates"][0]["name"], "demo");

	Ok(())
}

#[test]
fn list_warns_about_broken_manifests() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let root = tmp.path().join("tpl");
	std::fs::create_dir_all(&root)?;
	std::fs::write(root.join("stencil.json"), "{ not json")?;

	let mut cmd = common::stencil_cmd();
	let _ = cmd
		.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stderr(predicates::str::contains("warning:"));

	Ok(())
}
