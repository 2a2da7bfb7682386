use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum StencilError {
	#[error(transparent)]
	#[diagnostic(code(stencil::io_error))]
	Io(#[from] std::io::Error),

	#[error("an operation registered an empty token")]
	#[diagnostic(
		code(stencil::empty_token),
		help("every region marker and variable token must be at least one byte long")
	)]
	EmptyToken,

	#[error("buffer size must be at least one byte")]
	#[diagnostic(code(stencil::invalid_buffer_size))]
	InvalidBufferSize,

	#[error("failed to parse template manifest: {0}")]
	#[diagnostic(
		code(stencil::manifest_parse),
		help("check that the manifest is valid JSON with a top-level `name` field")
	)]
	ManifestParse(String),

	#[error("no template named `{0}` was found")]
	#[diagnostic(
		code(stencil::missing_template),
		help("run `stencil list` to see the templates available under the search root")
	)]
	MissingTemplate(String),

	#[error("parameter `{name}` is required but no value was supplied")]
	#[diagnostic(
		code(stencil::missing_parameter),
		help("pass a value with `--param {name}=<value>`")
	)]
	MissingParameter { name: String },

	#[error("unknown parameter `{0}`")]
	#[diagnostic(
		code(stencil::unknown_parameter),
		help("run `stencil info <template>` to see the parameters a template accepts")
	)]
	UnknownParameter(String),

	#[error("invalid value `{value}` for parameter `{name}`: expected {expected}")]
	#[diagnostic(code(stencil::invalid_parameter_value))]
	InvalidParameterValue {
		name: String,
		value: String,
		expected: String,
	},

	#[error("target `{path}` already exists")]
	#[diagnostic(
		code(stencil::target_exists),
		help("pass `--force` to overwrite existing files")
	)]
	TargetExists { path: String },
}

pub type StencilResult<T> = Result<T, StencilError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
