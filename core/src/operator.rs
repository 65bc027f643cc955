//! Operator shorthand for building conditions in code.
//!
//! `field("age").gte()` is a condition key that expands to
//! `{"age": {"$gte": value}}` during normalization.

/// Starts an operator shorthand for `name`.
///
/// `name` may be a dotted path.
///
/// # Example
///
/// ```
/// use mongory::{field, Engine, RawCondition, Value};
/// use serde_json::json;
///
/// let matcher = Engine::default()
///     .compile(RawCondition::new().with(field("age").gte(), 18))
///     .unwrap();
///
/// assert!(matcher.is_match(&Value::from(json!({"age": 21}))));
/// assert!(!matcher.is_match(&Value::from(json!({"age": 15}))));
/// ```
#[must_use]
pub fn field(name: impl Into<String>) -> Field {
    Field { name: name.into() }
}

/// A field name waiting for its operator.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
}

impl Field {
    /// Any operator, including extension operators. `$` is added if missing.
    #[must_use]
    pub fn operator(self, operator: &str) -> FieldOperator {
        let operator = if operator.starts_with('$') {
            operator.to_owned()
        } else {
            format!("${operator}")
        };
        FieldOperator {
            field: self.name,
            operator,
        }
    }

    /// `$eq`
    #[must_use]
    pub fn eq(self) -> FieldOperator {
        self.operator("$eq")
    }

    /// `$ne`
    #[must_use]
    pub fn ne(self) -> FieldOperator {
        self.operator("$ne")
    }

    /// `$gt`
    #[must_use]
    pub fn gt(self) -> FieldOperator {
        self.operator("$gt")
    }

    /// `$gte`
    #[must_use]
    pub fn gte(self) -> FieldOperator {
        self.operator("$gte")
    }

    /// `$lt`
    #[must_use]
    pub fn lt(self) -> FieldOperator {
        self.operator("$lt")
    }

    /// `$lte`
    #[must_use]
    pub fn lte(self) -> FieldOperator {
        self.operator("$lte")
    }

    /// `$in`
    #[must_use]
    pub fn in_(self) -> FieldOperator {
        self.operator("$in")
    }

    /// `$nin`
    #[must_use]
    pub fn nin(self) -> FieldOperator {
        self.operator("$nin")
    }

    /// `$exists`
    #[must_use]
    pub fn exists(self) -> FieldOperator {
        self.operator("$exists")
    }

    /// `$present`
    #[must_use]
    pub fn present(self) -> FieldOperator {
        self.operator("$present")
    }

    /// `$regex`
    #[must_use]
    pub fn regex(self) -> FieldOperator {
        self.operator("$regex")
    }

    /// `$not`
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> FieldOperator {
        self.operator("$not")
    }

    /// `$elemMatch`
    #[must_use]
    pub fn elem_match(self) -> FieldOperator {
        self.operator("$elemMatch")
    }

    /// `$every`
    #[must_use]
    pub fn every(self) -> FieldOperator {
        self.operator("$every")
    }

    /// `$size`
    #[must_use]
    pub fn size(self) -> FieldOperator {
        self.operator("$size")
    }
}

/// A `(field, operator)` pair used as a condition key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldOperator {
    field: String,
    operator: String,
}

impl FieldOperator {
    /// The field path.
    #[inline]
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The operator, with its leading `$`.
    #[inline]
    #[must_use]
    pub fn operator(&self) -> &str {
        &self.operator
    }
}
