use std::path::Path;

use crate::EngineConfig;
use crate::Processor;
use crate::Region;
use crate::StencilResult;
use crate::engine::Operation;
use crate::engine::OperationProvider;
use crate::engine::RunState;

/// Run `providers` over `input` with an explicit buffer size, returning the
/// output text and the changed flag.
pub(crate) fn transform(
	providers: Vec<Box<dyn OperationProvider>>,
	input: &str,
	buffer_size: usize,
) -> StencilResult<(String, bool)> {
	transform_with_config(EngineConfig::default(), providers, input, buffer_size)
}

pub(crate) fn transform_with_config(
	config: EngineConfig,
	providers: Vec<Box<dyn OperationProvider>>,
	input: &str,
	buffer_size: usize,
) -> StencilResult<(String, bool)> {
	let processor = Processor::create(config, providers)?;
	let mut output = Vec::new();
	let changed = processor.run_with_buffer_size(input.as_bytes(), &mut output, buffer_size)?;
	let text = String::from_utf8(output).expect("engine output is valid utf-8");
	Ok((text, changed))
}

pub(crate) fn region(
	start: &str,
	end: &str,
	include: bool,
	whole_line: bool,
	trim_whitespace: bool,
) -> Vec<Box<dyn OperationProvider>> {
	vec![Box::new(Region::new(
		start,
		end,
		include,
		whole_line,
		trim_whitespace,
	))]
}

/// Minimal operation replacing one fixed token with fixed text; used to
/// probe matcher dispatch rules directly.
pub(crate) struct ReplaceToken {
	pub(crate) token: &'static str,
	pub(crate) replacement: &'static str,
}

impl OperationProvider for ReplaceToken {
	fn tokens(&self) -> Vec<Vec<u8>> {
		vec![self.token.as_bytes().to_vec()]
	}

	fn create_operation(&self) -> Box<dyn Operation> {
		Box::new(ReplaceTokenOperation {
			replacement: self.replacement,
		})
	}
}

struct ReplaceTokenOperation {
	replacement: &'static str,
}

impl Operation for ReplaceTokenOperation {
	fn handle_match(
		&mut self,
		state: &mut RunState<'_>,
		_token: usize,
		_length: usize,
	) -> StencilResult<()> {
		state.write(self.replacement.as_bytes())
	}
}

/// The multi-line region input shared by the whole-line and torn-buffer
/// tests.
pub(crate) const MARKER_LINES: &str = "Hello\n    #begin foo\nvalue\n    #end\nThere";

pub(crate) const DEMO_MANIFEST: &str = r##"{
	"name": "demo",
	"shortName": "d",
	"parameters": {
		"projectName": { "requirement": "required" },
		"useDocs": { "type": "bool", "default": "false" }
	},
	"regions": [
		{
			"start": "#if-docs",
			"end": "#end-docs",
			"condition": "useDocs",
			"wholeLine": true,
			"trimWhitespace": true
		}
	],
	"sources": [{ "copyOnly": ["assets/**"] }]
}
"##;

pub(crate) fn demo_manifest() -> crate::TemplateManifest {
	serde_json::from_str(DEMO_MANIFEST).expect("demo manifest parses")
}

/// Lay out a small on-disk template under `root`: a manifest, a
/// transformable readme, and a copy-only asset.
pub(crate) fn write_demo_template(root: &Path) -> std::io::Result<()> {
	std::fs::create_dir_all(root.join("assets"))?;
	std::fs::write(root.join("stencil.json"), DEMO_MANIFEST)?;
	std::fs::write(
		root.join("readme.md"),
		"# ${projectName}$\n#if-docs\ndocs here\n#end-docs\nbody\n",
	)?;
	std::fs::write(root.join("assets/logo.txt"), "raw ${projectName}$\n")?;
	Ok(())
}
