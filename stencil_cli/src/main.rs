use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use stencil_cli::Commands;
use stencil_cli::OutputFormat;
use stencil_cli::StencilCli;
use stencil_core::ActionKind;
use stencil_core::CreateOptions;
use stencil_core::ResolvedParameters;
use stencil_core::Template;
use stencil_core::build_processor;
use stencil_core::create_template;
use stencil_core::find_template;
use stencil_core::plan_template;
use stencil_core::resolve_parameters;
use stencil_core::scan_templates;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = StencilCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match args.command {
		Some(Commands::List { format }) => run_list(&args, format),
		Some(Commands::Info { ref name }) => run_info(&args, name),
		Some(Commands::New {
			ref name,
			ref output,
			ref params,
			force,
			dry_run,
		}) => run_new(&args, name, output.clone(), params, force, dry_run),
		None => {
			eprintln!("No subcommand specified. Run `stencil --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<stencil_core::StencilError>() {
			Ok(stencil_err) => {
				let report: miette::Report = (*stencil_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

fn resolve_root(args: &StencilCli) -> PathBuf {
	args
		.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn print_section(title: &str) {
	println!();
	println!("{}", colored!(title, bold));
}

fn print_field(label: &str, value: impl std::fmt::Display) {
	println!("{label:<16} {value}");
}

/// Parse `name=value` override pairs from `--param` flags.
fn parse_params(params: &[String]) -> Result<Vec<(String, String)>, Box<dyn std::error::Error>> {
	let mut overrides = Vec::with_capacity(params.len());
	for param in params {
		let Some((name, value)) = param.split_once('=') else {
			return Err(format!("invalid --param `{param}`: expected NAME=VALUE").into());
		};
		overrides.push((name.to_string(), value.to_string()));
	}
	Ok(overrides)
}

fn warn_diagnostics(diagnostics: &[stencil_core::ScanDiagnostic], root: &Path) {
	for diagnostic in diagnostics {
		eprintln!(
			"{} skipping `{}`: {}",
			colored!("warning:", yellow),
			make_relative(&diagnostic.file, root),
			diagnostic.message
		);
	}
}

fn run_list(args: &StencilCli, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let scan = scan_templates(&root)?;
	warn_diagnostics(&scan.diagnostics, &root);

	match format {
		OutputFormat::Json => {
			let templates: Vec<serde_json::Value> = scan
				.templates
				.iter()
				.map(|template| {
					serde_json::json!({
						"name": template.manifest.name,
						"shortName": template.manifest.short_name,
						"tags": template.manifest.tags,
						"parameters": template.manifest.parameters.len(),
						"path": make_relative(&template.config_file, &root),
					})
				})
				.collect();
			println!("{}", serde_json::json!({ "templates": templates }));
		}
		OutputFormat::Text => {
			if scan.templates.is_empty() {
				println!("No templates found under {}.", root.display());
				return Ok(());
			}

			println!("{}", colored!("Templates:", bold));
			for template in &scan.templates {
				let mut line = format!("  {}", template.manifest.name);
				if let Some(short) = &template.manifest.short_name {
					line.push_str(&format!(" ({short})"));
				}
				if !template.manifest.tags.is_empty() {
					line.push_str(&format!(" [{}]", template.manifest.tags.join(", ")));
				}
				line.push_str(&format!(
					" — {} parameter(s)",
					template.manifest.parameters.len()
				));
				println!("{line}");

				if args.verbose {
					println!("    {}", make_relative(&template.config_file, &root));
				}
			}
			println!("\n{} template(s)", scan.templates.len());
		}
	}

	Ok(())
}

fn run_info(args: &StencilCli, name: &str) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let template = find_template(&root, name)?;
	let manifest = &template.manifest;

	println!("{}", colored!(&manifest.name, bold));

	print_section("Template");
	print_field("Manifest", make_relative(&template.config_file, &root));
	if let Some(short) = &manifest.short_name {
		print_field("Short name", short);
	}
	if let Some(author) = &manifest.author {
		print_field("Author", author);
	}
	if !manifest.tags.is_empty() {
		print_field("Tags", manifest.tags.join(", "));
	}

	print_section("Parameters");
	if manifest.parameters.is_empty() {
		println!("  none");
	}
	for (parameter_name, parameter) in &manifest.parameters {
		let mut details = format!("{} ({})", parameter.kind, parameter.requirement);
		if let Some(default) = &parameter.default {
			details.push_str(&format!(", default: {default}"));
		}
		if !parameter.choices.is_empty() {
			details.push_str(&format!(", choices: {}", parameter.choices.join("|")));
		}
		println!("  {parameter_name:<16} {details}");
		if args.verbose {
			if let Some(description) = &parameter.description {
				println!("  {:<16} {description}", "");
			}
		}
	}

	print_section("Content");
	print_field("Regions", manifest.regions.len());
	for source in manifest.effective_sources() {
		print_field("Source", format!("{} -> {}", source.source, source.target));
	}

	Ok(())
}

fn run_new(
	args: &StencilCli,
	name: &str,
	output: Option<PathBuf>,
	params: &[String],
	force: bool,
	dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let overrides = parse_params(params)?;
	let template = find_template(&root, name)?;
	let parameters = resolve_parameters(&template.manifest, &overrides)?;

	let target = match output {
		Some(path) => path,
		None => std::env::current_dir()?,
	};

	if dry_run {
		return preview(args, &template, &parameters, &target);
	}

	let result = create_template(&template, &parameters, &target, &CreateOptions { force })?;
	println!(
		"Created {} file(s) in {} ({} transformed).",
		result.files_written,
		result.target_root.display(),
		result.files_changed
	);

	Ok(())
}

/// Print the plan for a dry run; with `--verbose`, also show what each
/// transformed file would look like as a unified diff.
fn preview(
	args: &StencilCli,
	template: &Template,
	parameters: &ResolvedParameters,
	target: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
	let actions = plan_template(template, target)?;

	println!(
		"Dry run: would create {} file(s) in {}:",
		actions.len(),
		target.display()
	);

	let processor = build_processor(&template.manifest, parameters)?;
	for action in &actions {
		let marker = match action.kind {
			ActionKind::Transform => "transform",
			ActionKind::CopyOnly => "copy",
		};
		println!("  {marker:<10} {}", action.target.display());

		if args.verbose && action.kind == ActionKind::Transform {
			let source = std::fs::read(&action.source)?;
			let mut rendered = Vec::new();
			let changed = processor.run(source.as_slice(), &mut rendered)?;
			if changed {
				if let (Ok(before), Ok(after)) =
					(std::str::from_utf8(&source), std::str::from_utf8(&rendered))
				{
					print_diff(before, after);
				}
			}
		}
	}

	Ok(())
}

/// Print a unified diff between two strings, colorized.
fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				print!("    {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				print!("    {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				print!("     {change}");
			}
		}
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path
		.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
