use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Scaffold new projects from stencil templates.",
	long_about = "stencil materializes project templates: directories of files with \
	              variable tokens and conditional regions, described by a `stencil.json` \
	              manifest.\n\nQuick start:\n  stencil list          Show available \
	              templates\n  stencil info <name>   Show a template's parameters\n  \
	              stencil new <name>    Create a project from a template"
)]
pub struct StencilCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Directory searched for template manifests.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// List the templates discovered under the search root.
	///
	/// Walks the search root for `stencil.json` manifests and prints each
	/// template with its short name, tags, and parameter count. Manifests
	/// that fail to parse are reported as warnings without hiding the rest.
	List {
		/// Output format. Use `text` for human-readable output or `json`
		/// for programmatic consumption.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Show one template's parameters, regions, and sources.
	Info {
		/// Template name or short name, case-insensitive.
		name: String,
	},
	/// Materialize a template into a target directory.
	///
	/// Resolves parameters from `--param` overrides and manifest defaults,
	/// then streams every template file through the engine: variable tokens
	/// are substituted and conditional regions kept or dropped. Files
	/// matching the manifest's `copyOnly` patterns are copied verbatim.
	New {
		/// Template name or short name, case-insensitive.
		name: String,

		/// Target directory. Defaults to the current directory.
		#[arg(long, short)]
		output: Option<PathBuf>,

		/// Parameter overrides as `name=value` pairs. Repeatable.
		#[arg(long = "param", short = 'p', value_name = "NAME=VALUE")]
		params: Vec<String>,

		/// Overwrite existing files in the target directory.
		#[arg(long, default_value_t = false)]
		force: bool,

		/// Print the planned files without writing anything. Combine with
		/// `--verbose` to preview transformed content as a diff.
		#[arg(long, default_value_t = false)]
		dry_run: bool,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}
