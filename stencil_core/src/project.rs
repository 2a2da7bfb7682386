use std::path::Path;
use std::path::PathBuf;

use ignore::WalkBuilder;

use crate::StencilError;
use crate::StencilResult;
use crate::config::MANIFEST_FILE_CANDIDATES;
use crate::config::TemplateManifest;

/// A discovered template: its parsed manifest plus where it lives.
#[derive(Debug, Clone)]
pub struct Template {
	pub manifest: TemplateManifest,
	/// The manifest file itself.
	pub config_file: PathBuf,
	/// The directory whose contents the template materializes.
	pub root: PathBuf,
}

/// Everything found under a search root.
#[derive(Debug)]
pub struct TemplateScan {
	/// Discovered templates, sorted by name for stable listings.
	pub templates: Vec<Template>,
	/// Manifest files that could not be parsed. Collected instead of
	/// aborting so one broken template does not hide the rest.
	pub diagnostics: Vec<ScanDiagnostic>,
}

/// A manifest file that was found but rejected.
#[derive(Debug, Clone)]
pub struct ScanDiagnostic {
	pub file: PathBuf,
	pub message: String,
}

/// Walk `root` collecting every template manifest.
///
/// Hidden files are included (one manifest spelling is dot-prefixed);
/// gitignore rules are respected as usual.
pub fn scan_templates(root: &Path) -> StencilResult<TemplateScan> {
	let mut templates = Vec::new();
	let mut diagnostics = Vec::new();

	for entry in WalkBuilder::new(root).hidden(false).build() {
		let Ok(entry) = entry else {
			continue;
		};
		if !entry.file_type().is_some_and(|kind| kind.is_file()) {
			continue;
		}
		let file_name = entry.file_name().to_string_lossy();
		if !MANIFEST_FILE_CANDIDATES
			.iter()
			.any(|candidate| *candidate == file_name)
		{
			continue;
		}

		let config_file = entry.path().to_path_buf();
		match TemplateManifest::load(&config_file) {
			Ok(manifest) => templates.push(Template {
				manifest,
				root: config_file.parent().unwrap_or(root).to_path_buf(),
				config_file,
			}),
			Err(error) => diagnostics.push(ScanDiagnostic {
				file: config_file,
				message: error.to_string(),
			}),
		}
	}

	templates.sort_by(|a, b| a.manifest.name.cmp(&b.manifest.name));

	Ok(TemplateScan {
		templates,
		diagnostics,
	})
}

/// Find one template by name or short name, case-insensitively.
pub fn find_template(root: &Path, name: &str) -> StencilResult<Template> {
	let scan = scan_templates(root)?;
	scan
		.templates
		.into_iter()
		.find(|template| {
			template.manifest.name.eq_ignore_ascii_case(name)
				|| template
					.manifest
					.short_name
					.as_deref()
					.is_some_and(|short| short.eq_ignore_ascii_case(name))
		})
		.ok_or_else(|| StencilError::MissingTemplate(name.to_string()))
}
