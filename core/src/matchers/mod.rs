//! Matcher node types.
//!
//! Every node implements [`Matcher`](crate::Matcher). Operator nodes also
//! implement [`IntoMatcher`](crate::IntoMatcher) so they can be registered;
//! structural nodes ([`HashConditionMatcher`], [`FieldMatcher`],
//! [`LiteralMatcher`], [`ArrayRecordMatcher`]) are built by the compiler.

mod array_record;
mod compare;
mod elem_match;
mod field;
mod hash_condition;
mod literal;
mod logical;
mod membership;
mod not;
mod presence;
mod regex;
mod size;

pub use array_record::ArrayRecordMatcher;
pub use compare::{
    CompareMatcher, Comparison, EqMatcher, Equal, GreaterOrEqual, GreaterThan, GtMatcher,
    GteMatcher, LessOrEqual, LessThan, LtMatcher, LteMatcher, NeMatcher, NotEqual,
};
pub use elem_match::{ElemMatchMatcher, EveryMatcher};
pub use field::FieldMatcher;
pub use hash_condition::HashConditionMatcher;
pub use literal::LiteralMatcher;
pub use logical::{AndMatcher, OrMatcher};
pub use membership::{InMatcher, NinMatcher};
pub use not::NotMatcher;
pub use presence::{ExistsMatcher, PresentMatcher};
pub use regex::RegexMatcher;
pub use size::SizeMatcher;

#[cfg(test)]
pub(crate) fn test_context() -> std::sync::Arc<crate::Context> {
    use std::sync::Arc;

    use crate::{register_core_operators, Context, Normalizer, OperatorRegistryBuilder};

    let operators = register_core_operators(OperatorRegistryBuilder::new()).build();
    Arc::new(Context::new(
        Arc::new(operators),
        Arc::new(Normalizer::with_core_rules()),
    ))
}
