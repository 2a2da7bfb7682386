use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::Path;

use serde::Deserialize;

use crate::StencilError;
use crate::StencilResult;
use crate::variables::VariableFormat;

/// Manifest file names recognized during template discovery, in precedence
/// order.
pub const MANIFEST_FILE_CANDIDATES: [&str; 2] = ["stencil.json", ".stencil.json"];

/// A template manifest (`stencil.json`) describing one scaffoldable
/// project.
///
/// ```json
/// {
///   "name": "console-app",
///   "shortName": "console",
///   "parameters": {
///     "projectName": { "requirement": "required" },
///     "useLogging": { "type": "bool", "default": "true" }
///   },
///   "regions": [
///     {
///       "start": "#if-logging",
///       "end": "#end-logging",
///       "condition": "useLogging",
///       "wholeLine": true,
///       "trimWhitespace": true
///     }
///   ],
///   "sources": [
///     { "source": "./", "target": "./", "exclude": ["*.lock"], "copyOnly": ["assets/**"] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateManifest {
	/// Display name, also the lookup key for `stencil new`.
	pub name: String,
	/// Optional short alias for lookup.
	#[serde(default)]
	pub short_name: Option<String>,
	#[serde(default)]
	pub author: Option<String>,
	#[serde(default)]
	pub tags: Vec<String>,
	/// Parameter definitions keyed by name. The map is ordered so that the
	/// variables built from it register tokens deterministically.
	#[serde(default)]
	pub parameters: BTreeMap<String, ParameterConfig>,
	/// Conditional regions applied to every transformed file.
	#[serde(default)]
	pub regions: Vec<RegionConfig>,
	/// File sources to materialize. Empty means one implicit `./` → `./`
	/// source covering the template directory.
	#[serde(default)]
	pub sources: Vec<SourceConfig>,
	/// Framing around variable names in template files.
	#[serde(default)]
	pub variable_format: VariableFormatConfig,
}

impl TemplateManifest {
	/// Load and parse a manifest file.
	pub fn load(path: &Path) -> StencilResult<Self> {
		let bytes = std::fs::read(path)?;
		serde_json::from_slice(&bytes).map_err(|error| StencilError::ManifestParse(error.to_string()))
	}

	/// The configured sources, or the implicit whole-directory source when
	/// none are declared.
	pub fn effective_sources(&self) -> Vec<SourceConfig> {
		if self.sources.is_empty() {
			vec![SourceConfig::default()]
		} else {
			self.sources.clone()
		}
	}
}

/// One parameter a template accepts.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterConfig {
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default, rename = "type")]
	pub kind: ParameterKind,
	/// Value used when the caller supplies none.
	#[serde(default)]
	pub default: Option<String>,
	/// Allowed values for `choice` parameters.
	#[serde(default)]
	pub choices: Vec<String>,
	#[serde(default)]
	pub requirement: ParameterRequirement,
	/// Whether the resolved value feeds the engine's variable collection.
	/// Off for parameters that only gate regions.
	#[serde(default = "default_is_variable")]
	pub is_variable: bool,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
	#[default]
	String,
	Bool,
	Choice,
}

impl Display for ParameterKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ParameterKind::String => write!(f, "string"),
			ParameterKind::Bool => write!(f, "bool"),
			ParameterKind::Choice => write!(f, "choice"),
		}
	}
}

/// How strongly a template asks for a parameter value.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParameterRequirement {
	/// Instantiation fails without a value.
	Required,
	/// Worth prompting for, but a default exists.
	Suggested,
	#[default]
	Optional,
	/// Supplied by the host, never by the user.
	Implicit,
}

impl Display for ParameterRequirement {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ParameterRequirement::Required => write!(f, "required"),
			ParameterRequirement::Suggested => write!(f, "suggested"),
			ParameterRequirement::Optional => write!(f, "optional"),
			ParameterRequirement::Implicit => write!(f, "implicit"),
		}
	}
}

/// A conditional region declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionConfig {
	/// Marker opening the region.
	pub start: String,
	/// Marker closing the region. May equal `start` for a toggle region.
	pub end: String,
	/// Literal inclusion flag, used when no `condition` is set.
	#[serde(default = "default_true")]
	pub include: bool,
	/// When set, a marker alone on its line takes the whole line with it.
	#[serde(default)]
	pub whole_line: bool,
	/// When set, whitespace around removed markers is trimmed.
	#[serde(default)]
	pub trim_whitespace: bool,
	/// Name of a parameter whose truthiness decides inclusion at
	/// instantiation time, overriding `include`.
	#[serde(default)]
	pub condition: Option<String>,
}

/// One source directory to materialize into the target.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfig {
	#[serde(default = "default_source_dir")]
	pub source: String,
	#[serde(default = "default_source_dir")]
	pub target: String,
	/// Glob patterns restricting which files are taken. Empty means all.
	#[serde(default)]
	pub include: Vec<String>,
	/// Glob patterns for files to leave out entirely.
	#[serde(default)]
	pub exclude: Vec<String>,
	/// Glob patterns for files copied verbatim, bypassing the engine.
	#[serde(default)]
	pub copy_only: Vec<String>,
}

impl Default for SourceConfig {
	fn default() -> Self {
		Self {
			source: default_source_dir(),
			target: default_source_dir(),
			include: Vec::new(),
			exclude: Vec::new(),
			copy_only: Vec::new(),
		}
	}
}

/// Serde-facing form of [`VariableFormat`].
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VariableFormatConfig {
	#[serde(default = "default_variable_prefix")]
	pub prefix: String,
	#[serde(default = "default_variable_suffix")]
	pub suffix: String,
}

impl Default for VariableFormatConfig {
	fn default() -> Self {
		Self {
			prefix: default_variable_prefix(),
			suffix: default_variable_suffix(),
		}
	}
}

impl From<VariableFormatConfig> for VariableFormat {
	fn from(config: VariableFormatConfig) -> Self {
		VariableFormat::new(config.prefix, config.suffix)
	}
}

fn default_true() -> bool {
	true
}

fn default_is_variable() -> bool {
	true
}

fn default_source_dir() -> String {
	"./".to_string()
}

fn default_variable_prefix() -> String {
	"${".to_string()
}

fn default_variable_suffix() -> String {
	"}$".to_string()
}
