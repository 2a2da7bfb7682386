use std::collections::HashMap;

use derive_more::Deref;

use crate::StencilResult;
use crate::engine::Operation;
use crate::engine::OperationProvider;
use crate::engine::RunState;

/// A single named substitution value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variable {
	pub name: String,
	pub value: String,
}

/// Insertion-ordered, case-insensitive collection of substitution
/// variables.
///
/// Lookup ignores case; the stored spelling of a name is what gets framed
/// into the token the engine recognizes. Insertion order is preserved so
/// that token registration, and with it the engine's tie-breaking, stays
/// deterministic.
#[derive(Clone, Debug, Default, Deref)]
pub struct VariableCollection {
	#[deref]
	entries: Vec<Variable>,
	index: HashMap<String, usize>,
}

impl VariableCollection {
	pub fn new() -> Self {
		Self::default()
	}

	/// A collection seeded from the process environment. Variables with
	/// non-UTF-8 names or values are skipped.
	pub fn environment() -> Self {
		std::env::vars_os()
			.filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
			.collect()
	}

	/// Insert or replace a variable. Replacement matches the existing name
	/// case-insensitively and adopts the new spelling.
	pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
		let name = name.into();
		let value = value.into();
		let key = name.to_lowercase();

		match self.index.get(&key) {
			Some(&position) => self.entries[position] = Variable { name, value },
			None => {
				self.index.insert(key, self.entries.len());
				self.entries.push(Variable { name, value });
			}
		}
	}

	/// Case-insensitive lookup.
	pub fn get(&self, name: &str) -> Option<&str> {
		self
			.index
			.get(&name.to_lowercase())
			.map(|&position| self.entries[position].value.as_str())
	}
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for VariableCollection {
	fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
		let mut collection = Self::new();
		for (name, value) in iter {
			collection.set(name, value);
		}
		collection
	}
}

/// The two-part framing around a variable name that forms its token in the
/// stream, e.g. `${` and `}$` for `${projectName}$`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableFormat {
	pub prefix: String,
	pub suffix: String,
}

impl VariableFormat {
	pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
			suffix: suffix.into(),
		}
	}

	/// The exact bytes the engine must recognize for `name`.
	pub fn token_for(&self, name: &str) -> Vec<u8> {
		format!("{}{name}{}", self.prefix, self.suffix).into_bytes()
	}
}

impl Default for VariableFormat {
	fn default() -> Self {
		Self::new("${", "}$")
	}
}

/// Replaces framed variable tokens with their configured values.
///
/// One token is registered per *known* variable name. A framed name that is
/// not in the collection therefore never matches and passes through the
/// engine byte-for-byte: unknown variables are left for the reader to see,
/// not silently dropped.
pub struct VariableSubstitution {
	tokens: Vec<Vec<u8>>,
	values: Vec<Vec<u8>>,
}

impl VariableSubstitution {
	pub fn new(variables: &VariableCollection, format: &VariableFormat) -> Self {
		let mut tokens = Vec::with_capacity(variables.len());
		let mut values = Vec::with_capacity(variables.len());

		for variable in variables.iter() {
			tokens.push(format.token_for(&variable.name));
			values.push(variable.value.clone().into_bytes());
		}

		Self { tokens, values }
	}
}

impl OperationProvider for VariableSubstitution {
	fn tokens(&self) -> Vec<Vec<u8>> {
		self.tokens.clone()
	}

	fn create_operation(&self) -> Box<dyn Operation> {
		Box::new(SubstituteOperation {
			values: self.values.clone(),
		})
	}
}

struct SubstituteOperation {
	values: Vec<Vec<u8>>,
}

impl Operation for SubstituteOperation {
	fn handle_match(
		&mut self,
		state: &mut RunState<'_>,
		token: usize,
		_length: usize,
	) -> StencilResult<()> {
		state.write(&self.values[token])
	}
}
