//! Scope values and canonical key derivation.
//!
//! A [`Scope`] is the subject a feature is evaluated against: nobody, a value
//! that names itself, a persisted entity, or anything with a string form.
//! [`ScopeKeyResolver`] reduces every scope to the string key used for cache
//! addressing and for matching activation rules. Two scopes are the same
//! scope iff their keys are equal.

use std::fmt;

use crate::error::{FlagError, Result};


/// Key used for the absent scope unless configured otherwise.
pub const DEFAULT_NULL_KEY: &str = "__flagpole_null";

/// A value that provides its own stable feature-scope identifier.
pub trait FeatureScopeable {
	/// Identifier used as this value's scope key.
	fn feature_identifier(&self) -> String;
}

/// A persisted entity addressed by type tag and primary key.
pub trait EntityRef {
	/// Type discriminator, e.g. `"user"` or `"team"`.
	fn entity_type(&self) -> &str;
	/// Primary key rendered as a string.
	fn entity_key(&self) -> String;
}

/// The subject a feature is evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Scope {
	/// No scope.
	#[default]
	None,
	/// A value exposing its own identifier.
	Identified(String),
	/// A persisted entity reference.
	Entity {
		/// Type discriminator.
		kind: String,
		/// Primary key.
		key: String,
	},
	/// Any other value, represented by its string form.
	Opaque(String),
}

impl Scope {
	/// Scope for a value implementing [`FeatureScopeable`].
	pub fn identified(value: &impl FeatureScopeable) -> Self {
		Scope::Identified(value.feature_identifier())
	}

	/// Scope for a value implementing [`EntityRef`].
	pub fn entity(value: &impl EntityRef) -> Self {
		Scope::Entity {
			kind: value.entity_type().to_string(),
			key: value.entity_key(),
		}
	}

	/// Scope for any displayable value.
	pub fn opaque(value: impl fmt::Display) -> Self {
		Scope::Opaque(value.to_string())
	}

	#[inline]
	pub fn is_none(&self) -> bool {
		matches!(self, Scope::None)
	}
}

impl fmt::Display for Scope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Scope::None => f.write_str("<none>"),
			Scope::Identified(id) => f.write_str(id),
			Scope::Entity { kind, key } => write!(f, "{kind}#{key}"),
			Scope::Opaque(repr) => f.write_str(repr),
		}
	}
}

impl From<&str> for Scope {
	fn from(v: &str) -> Self {
		Scope::Opaque(v.to_string())
	}
}

impl From<String> for Scope {
	fn from(v: String) -> Self {
		Scope::Opaque(v)
	}
}

impl From<&String> for Scope {
	fn from(v: &String) -> Self {
		Scope::Opaque(v.clone())
	}
}

impl From<()> for Scope {
	fn from(_: ()) -> Self {
		Scope::None
	}
}

impl From<&Scope> for Scope {
	fn from(v: &Scope) -> Self {
		v.clone()
	}
}

impl<T: Into<Scope>> From<Option<T>> for Scope {
	fn from(v: Option<T>) -> Self {
		v.map_or(Scope::None, Into::into)
	}
}

macro_rules! opaque_from_int {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for Scope {
				fn from(v: $ty) -> Self {
					Scope::Opaque(v.to_string())
				}
			}
		)*
	};
}

opaque_from_int!(i32, i64, u32, u64, usize);

/// Derives canonical string keys from scopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeKeyResolver {
	null_key: String,
}

impl Default for ScopeKeyResolver {
	fn default() -> Self {
		Self::new(DEFAULT_NULL_KEY)
	}
}

impl ScopeKeyResolver {
	pub fn new(null_key: impl Into<String>) -> Self {
		Self {
			null_key: null_key.into(),
		}
	}

	/// Key produced for [`Scope::None`].
	pub fn null_key(&self) -> &str {
		&self.null_key
	}

	/// Returns the canonical key for `scope`.
	///
	/// Fails with [`FlagError::MalformedScope`] for an identified scope with
	/// an empty identifier or an entity missing its type tag or primary key.
	/// Such values would otherwise collide with unrelated scopes.
	pub fn resolve_key(&self, scope: &Scope) -> Result<String> {
		match scope {
			Scope::None => Ok(self.null_key.clone()),
			Scope::Identified(id) => {
				if id.is_empty() {
					return Err(FlagError::MalformedScope(
						"scope identifier is empty".to_string(),
					));
				}
				Ok(id.clone())
			}
			Scope::Entity { kind, key } => {
				if kind.is_empty() || key.is_empty() {
					return Err(FlagError::MalformedScope(format!(
						"entity reference needs a type tag and a primary key (got type={kind:?} key={key:?})"
					)));
				}
				Ok(format!("entity:{kind}:{key}"))
			}
			Scope::Opaque(repr) => Ok(repr.clone()),
		}
	}
}
