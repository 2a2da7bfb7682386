use assert_cmd::Command;

pub fn stencil_cmd() -> Command {
	let mut cmd = Command::cargo_bin("stencil").expect("stencil binary builds");
	cmd.env("NO_COLOR", "1");
	cmd
}
