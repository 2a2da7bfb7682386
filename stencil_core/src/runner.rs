use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use ignore::WalkBuilder;

use crate::EngineConfig;
use crate::Processor;
use crate::Region;
use crate::StencilError;
use crate::StencilResult;
use crate::config::MANIFEST_FILE_CANDIDATES;
use crate::config::ParameterConfig;
use crate::config::ParameterKind;
use crate::config::ParameterRequirement;
use crate::config::TemplateManifest;
use crate::engine::OperationProvider;
use crate::project::Template;
use crate::variables::VariableCollection;

/// Parameter values resolved for one instantiation, plus the subset exposed
/// to the engine as substitution variables.
#[derive(Debug, Clone, Default)]
pub struct ResolvedParameters {
	/// Every resolved value, keyed by the manifest's parameter name.
	pub values: BTreeMap<String, String>,
	/// The `isVariable` subset the engine substitutes into files.
	pub variables: VariableCollection,
}

impl ResolvedParameters {
	/// Case-insensitive lookup across all resolved values, including
	/// parameters that only gate regions.
	pub fn value_of(&self, name: &str) -> Option<&str> {
		self
			.values
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}

/// Resolve caller overrides against a manifest's parameter definitions.
///
/// Override names match case-insensitively. Parameters with no override
/// fall back to their default; a `required` parameter with neither fails.
/// Optional parameters that end up with no value are simply absent, so
/// their tokens are never registered and pass through.
pub fn resolve_parameters(
	manifest: &TemplateManifest,
	overrides: &[(String, String)],
) -> StencilResult<ResolvedParameters> {
	let known: HashSet<String> = manifest
		.parameters
		.keys()
		.map(|name| name.to_lowercase())
		.collect();

	let mut supplied: HashMap<String, String> = HashMap::new();
	for (name, value) in overrides {
		let key = name.to_lowercase();
		if !known.contains(&key) {
			return Err(StencilError::UnknownParameter(name.clone()));
		}
		supplied.insert(key, value.clone());
	}

	let mut resolved = ResolvedParameters::default();
	for (name, parameter) in &manifest.parameters {
		let value = match supplied
			.remove(&name.to_lowercase())
			.or_else(|| parameter.default.clone())
		{
			Some(value) => value,
			None => {
				if parameter.requirement == ParameterRequirement::Required {
					return Err(StencilError::MissingParameter { name: name.clone() });
				}
				continue;
			}
		};

		validate_parameter_value(name, parameter, &value)?;

		if parameter.is_variable {
			resolved.variables.set(name.clone(), value.clone());
		}
		resolved.values.insert(name.clone(), value);
	}

	Ok(resolved)
}

fn validate_parameter_value(
	name: &str,
	parameter: &ParameterConfig,
	value: &str,
) -> StencilResult<()> {
	match parameter.kind {
		ParameterKind::String => Ok(()),
		ParameterKind::Bool => {
			if is_truthy(value) || is_falsy(value) {
				Ok(())
			} else {
				Err(StencilError::InvalidParameterValue {
					name: name.to_string(),
					value: value.to_string(),
					expected: "one of true/false/yes/no/on/off/1/0".to_string(),
				})
			}
		}
		ParameterKind::Choice => {
			if parameter
				.choices
				.iter()
				.any(|choice| choice.eq_ignore_ascii_case(value))
			{
				Ok(())
			} else {
				Err(StencilError::InvalidParameterValue {
					name: name.to_string(),
					value: value.to_string(),
					expected: format!("one of {}", parameter.choices.join(", ")),
				})
			}
		}
	}
}

/// Truthiness used by bool parameters and region conditions.
pub fn is_truthy(value: &str) -> bool {
	matches!(value.to_lowercase().as_str(), "true" | "yes" | "on" | "1")
}

fn is_falsy(value: &str) -> bool {
	matches!(value.to_lowercase().as_str(), "false" | "no" | "off" | "0")
}

/// Build the ordered operation providers for a manifest. A region with a
/// `condition` keeps its span only when the named parameter resolved
/// truthy; an unresolved condition drops the span.
pub fn build_operations(
	manifest: &TemplateManifest,
	parameters: &ResolvedParameters,
) -> Vec<Box<dyn OperationProvider>> {
	let mut providers: Vec<Box<dyn OperationProvider>> = Vec::with_capacity(manifest.regions.len());

	for region in &manifest.regions {
		let include = match &region.condition {
			Some(parameter) => parameters.value_of(parameter).is_some_and(is_truthy),
			None => region.include,
		};
		providers.push(Box::new(Region::new(
			&region.start,
			&region.end,
			include,
			region.whole_line,
			region.trim_whitespace,
		)));
	}

	providers
}

/// Build the processor that transforms every file of one instantiation.
pub fn build_processor(
	manifest: &TemplateManifest,
	parameters: &ResolvedParameters,
) -> StencilResult<Processor> {
	let config = EngineConfig::new(
		parameters.variables.clone(),
		manifest.variable_format.clone().into(),
	);
	Processor::create(config, build_operations(manifest, parameters))
}

/// How one source file reaches the target tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKind {
	/// Streamed through the engine.
	Transform,
	/// Copied verbatim, matching a `copyOnly` pattern.
	CopyOnly,
}

/// One planned file materialization.
#[derive(Debug, Clone)]
pub struct FileAction {
	pub source: PathBuf,
	pub target: PathBuf,
	pub kind: ActionKind,
}

/// Options for [`create_template`].
#[derive(Clone, Copy, Debug, Default)]
pub struct CreateOptions {
	/// Overwrite existing target files instead of refusing.
	pub force: bool,
}

/// Outcome of one instantiation.
#[derive(Debug)]
pub struct CreateResult {
	/// Files materialized into the target tree.
	pub files_written: usize,
	/// Transformed files the engine actually altered.
	pub files_changed: usize,
	pub target_root: PathBuf,
}

/// Plan the file actions for instantiating `template` into `target_root`,
/// without touching the filesystem. Actions are sorted by target path.
pub fn plan_template(template: &Template, target_root: &Path) -> StencilResult<Vec<FileAction>> {
	let mut actions = Vec::new();

	for source in template.manifest.effective_sources() {
		let source_root = template.root.join(&source.source);
		let include = build_glob_set(&source.include);
		let exclude = build_glob_set(&source.exclude);
		let copy_only = build_glob_set(&source.copy_only);
		let target_base = target_root.join(&source.target);

		for entry in WalkBuilder::new(&source_root).hidden(false).build() {
			let Ok(entry) = entry else {
				continue;
			};
			if !entry.file_type().is_some_and(|kind| kind.is_file()) {
				continue;
			}
			let file_name = entry.file_name().to_string_lossy();
			if MANIFEST_FILE_CANDIDATES
				.iter()
				.any(|candidate| *candidate == file_name)
			{
				continue;
			}

			let path = entry.path();
			let Ok(relative) = path.strip_prefix(&source_root) else {
				continue;
			};
			if exclude.is_match(relative) {
				continue;
			}
			if !source.include.is_empty() && !include.is_match(relative) {
				continue;
			}

			let kind = if copy_only.is_match(relative) {
				ActionKind::CopyOnly
			} else {
				ActionKind::Transform
			};

			actions.push(FileAction {
				source: path.to_path_buf(),
				target: target_base.join(relative),
				kind,
			});
		}
	}

	actions.sort_by(|a, b| a.target.cmp(&b.target));
	Ok(actions)
}

/// Materialize `template` into `target_root`.
///
/// Existing target files are rejected up front, before any byte is written,
/// unless `force` is set. Each transformed file is one independent engine
/// run; on an I/O failure mid-way, already-written files are left as they
/// are and the error propagates to the caller.
pub fn create_template(
	template: &Template,
	parameters: &ResolvedParameters,
	target_root: &Path,
	options: &CreateOptions,
) -> StencilResult<CreateResult> {
	let actions = plan_template(template, target_root)?;

	if !options.force {
		for action in &actions {
			if action.target.exists() {
				return Err(StencilError::TargetExists {
					path: action.target.display().to_string(),
				});
			}
		}
	}

	let processor = build_processor(&template.manifest, parameters)?;
	let mut files_written = 0;
	let mut files_changed = 0;

	for action in &actions {
		if let Some(parent) = action.target.parent() {
			std::fs::create_dir_all(parent)?;
		}

		match action.kind {
			ActionKind::CopyOnly => {
				std::fs::copy(&action.source, &action.target)?;
			}
			ActionKind::Transform => {
				let input = std::fs::File::open(&action.source)?;
				let output = std::fs::File::create(&action.target)?;
				if processor.run(input, output)? {
					files_changed += 1;
				}
			}
		}
		files_written += 1;
	}

	Ok(CreateResult {
		files_written,
		files_changed,
		target_root: target_root.to_path_buf(),
	})
}

/// Build a `GlobSet` from pattern strings, skipping any that fail to parse.
fn build_glob_set(patterns: &[String]) -> GlobSet {
	let mut builder = GlobSetBuilder::new();
	for pattern in patterns {
		if let Ok(glob) = Glob::new(pattern) {
			builder.add(glob);
		}
	}
	builder.build().unwrap_or_else(|_| GlobSet::empty())
}
