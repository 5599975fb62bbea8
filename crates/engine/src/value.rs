//! Raw resolver results.


/// The value a resolver returns for a scope.
///
/// Only [`ResolverValue::Bool(false)`] makes a feature inactive. Every other
/// value, [`ResolverValue::Null`] and `Int(0)` included, counts as active.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResolverValue {
	/// No value.
	#[default]
	Null,
	/// Boolean value; `false` is the only inactive result.
	Bool(bool),
	/// Integer value.
	Int(i64),
	/// String value.
	Text(String),
}

impl ResolverValue {
	/// The explicit-false sentinel.
	pub const INACTIVE: Self = ResolverValue::Bool(false);

	/// Returns true unless this is the explicit-false sentinel.
	#[inline]
	pub fn is_active(&self) -> bool {
		!matches!(self, ResolverValue::Bool(false))
	}

	/// Returns the boolean value if this is a `Bool` variant.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			ResolverValue::Bool(v) => Some(*v),
			_ => None,
		}
	}

	/// Returns the type name of this value.
	pub fn type_name(&self) -> &'static str {
		match self {
			ResolverValue::Null => "null",
			ResolverValue::Bool(_) => "bool",
			ResolverValue::Int(_) => "int",
			ResolverValue::Text(_) => "string",
		}
	}
}

impl From<bool> for ResolverValue {
	fn from(v: bool) -> Self {
		ResolverValue::Bool(v)
	}
}

macro_rules! int_from {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for ResolverValue {
				fn from(v: $ty) -> Self {
					ResolverValue::Int(i64::from(v))
				}
			}
		)*
	};
}

int_from!(i8, i16, i32, i64, u8, u16, u32);

// Values beyond `i64::MAX` keep their digits as text.
macro_rules! wide_int_from {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for ResolverValue {
				fn from(v: $ty) -> Self {
					i64::try_from(v).map_or_else(|_| ResolverValue::Text(v.to_string()), ResolverValue::Int)
				}
			}
		)*
	};
}

wide_int_from!(u64, usize);

impl From<String> for ResolverValue {
	fn from(v: String) -> Self {
		ResolverValue::Text(v)
	}
}

impl From<&str> for ResolverValue {
	fn from(v: &str) -> Self {
		ResolverValue::Text(v.to_string())
	}
}

impl From<()> for ResolverValue {
	fn from(_: ()) -> Self {
		ResolverValue::Null
	}
}

impl<T: Into<ResolverValue>> From<Option<T>> for ResolverValue {
	fn from(v: Option<T>) -> Self {
		v.map_or(ResolverValue::Null, Into::into)
	}
}
