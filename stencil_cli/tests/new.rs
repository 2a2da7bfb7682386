mod common;

use std::path::Path;

use stencil_core::AnyEmptyResult;

const MANIFEST: &str = r##"{
	"name": "demo",
	"parameters": {
		"projectName": { "requirement": "required" }
	},
	"regions": [
		{
			"start": "#begin",
			"end": "#end",
			"include": false,
			"wholeLine": true,
			"trimWhitespace": true
		}
	]
}
"##;

fn write_template(root: &Path) -> std::io::Result<()> {
	std::fs::create_dir_all(root)?;
	std::fs::write(root.join("stencil.json"), MANIFEST)?;
	std::fs::write(
		root.join("readme.md"),
		"# ${projectName}$\n#begin\nhidden\n#end\nbody\n",
	)?;
	Ok(())
}

#[test]
fn new_creates_the_target_files() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_template(&tmp.path().join("tpl"))?;
	let target = tmp.path().join("out");

	let mut cmd = common::stencil_cmd();
	let _ = cmd
		.arg("new")
		.arg("demo")
		.arg("--path")
		.arg(tmp.path())
		.arg("--output")
		.arg(&target)
		.arg("--param")
		.arg("projectName=Demo")
		.assert()
		.success()
		.stdout(predicates::str::contains("Created 1 file(s)"));

	assert_eq!(
		std::fs::read_to_string(target.join("readme.md"))?,
		"# Demo\nbody\n"
	);

	Ok(())
}

#[test]
fn new_requires_required_parameters() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_template(&tmp.path().join("tpl"))?;

	let mut cmd = common::stencil_cmd();
	let _ = cmd
		.arg("new")
		.arg("demo")
		.arg("--path")
		.arg(tmp.path())
		.arg("--output")
		.arg(tmp.path().join("out"))
		.assert()
		.failure()
		.stderr(predicates::str::contains("projectName"));

	Ok(())
}

#[test]
fn new_dry_run_writes_nothing() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_template(&tmp.path().join("tpl"))?;
	let target = tmp.path().join("out");

	let mut cmd = common::stencil_cmd();
	let _ = cmd
		.arg("new")
		.arg("demo")
		.arg("--path")
		.arg(tmp.path())
		.arg("--output")
		.arg(&target)
		.arg("--param")
		.arg("projectName=Demo")
		.arg("--dry-run")
		.assert()
		.success()
		.stdout(predicates::str::contains("Dry run"))
		.stdout(predicates::str::contains("transform"));

	assert!(!target.exists());

	Ok(())
}

#[test]
fn new_refuses_to_overwrite_without_force() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_template(&tmp.path().join("tpl"))?;
	let target = tmp.path().join("out");

	let mut first = common::stencil_cmd();
	let _ = first
		.arg("new")
		.arg("demo")
		.arg("--path")
		.arg(tmp.path())
		.arg("--output")
		.arg(&target)
		.arg("--param")
		.arg("projectName=Demo")
		.assert()
		.success();

	let mut repeat = common::stencil_cmd();
	let _ = repeat
		.arg("new")
		.arg("demo")
		.arg("--path")
		.arg(tmp.path())
		.arg("--output")
		.arg(&target)
		.arg("--param")
		.arg("projectName=Demo")
		.assert()
		.failure()
		.stderr(predicates::str::contains("already exists"));

	let mut forced = common::stencil_cmd();
	let _ = forced
		.arg("new")
		.arg("demo")
		.arg("--path")
		.arg(tmp.path())
		.arg("--output")
		.arg(&target)
		.arg("--param")
		.arg("projectName=Demo")
		.arg("--force")
		.assert()
		.success();

	Ok(())
}

#[test]
fn new_rejects_malformed_param_flags() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_template(&tmp.path().join("tpl"))?;

	let mut cmd = common::stencil_cmd();
	let _ = cmd
		.arg("new")
		.arg("demo")
		.arg("--path")
		.arg(tmp.path())
		.arg("--output")
		.arg(tmp.path().join("out"))
		.arg("--param")
		.arg("projectName")
		.assert()
		.failure()
		.stderr(predicates::str::contains("NAME=VALUE"));

	Ok(())
}
