//! Field access: extract one key (or array index) and match the value.

use std::borrow::Cow;
use std::sync::Arc;

use super::LiteralMatcher;
use crate::value::MISSING;
use crate::{Context, EvalError, MatchFn, Matcher, MatcherError, ProcCell, Tracer, Value};

/// Matches the value stored under one key of the record.
///
/// | Record | Extracted value |
/// |--------|-----------------|
/// | map    | the key's value, or `Missing` |
/// | array  | the element at an integer key (negative counts from the end), or `Missing` |
/// | custom | [`CustomValue::get_field`](crate::CustomValue::get_field) |
/// | other  | nothing: the field condition fails |
///
/// The extracted value is then matched with the condition's literal form, so
/// an array value gets array-record semantics.
#[derive(Debug)]
pub struct FieldMatcher {
    field: String,
    literal: LiteralMatcher,
    ctx: Arc<Context>,
    proc: ProcCell,
}

impl FieldMatcher {
    /// Builds a field matcher.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError`] if the condition cannot be built.
    pub fn build(field: &str, condition: Value, ctx: &Arc<Context>) -> Result<Arc<dyn Matcher>, MatcherError> {
        Ok(Arc::new(Self::new(field, condition, ctx)?))
    }

    /// Creates a field matcher.
    ///
    /// # Errors
    ///
    /// As [`build`](Self::build).
    pub fn new(field: &str, condition: Value, ctx: &Arc<Context>) -> Result<Self, MatcherError> {
        Ok(Self {
            field: field.to_owned(),
            literal: LiteralMatcher::new(condition, ctx)?,
            ctx: Arc::clone(ctx),
            proc: ProcCell::default(),
        })
    }

    /// The field name.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    fn extract<'a>(&self, record: &'a Value) -> Option<Cow<'a, Value>> {
        let value = dig(record, &self.field)?;
        Some(convert(&self.ctx, value))
    }
}

/// Looks up `field` in `record`. `None` means the record cannot be dug into.
pub(crate) fn dig<'a>(record: &'a Value, field: &str) -> Option<Cow<'a, Value>> {
    match record {
        Value::Map(map) => Some(Cow::Borrowed(map.get(field).unwrap_or(&MISSING))),
        Value::Array(items) => Some(Cow::Borrowed(
            array_index(field, items.len())
                .and_then(|i| items.get(i))
                .unwrap_or(&MISSING),
        )),
        Value::Custom(custom) => custom.get_field(field).map(Cow::Owned),
        _ => None,
    }
}

fn convert<'a>(ctx: &Context, value: Cow<'a, Value>) -> Cow<'a, Value> {
    if ctx.need_convert() {
        ctx.normalizer().normalize_shallow(value)
    } else {
        value
    }
}

/// Returns `true` for keys of the form `-?\d+`.
pub(crate) fn is_index_key(key: &str) -> bool {
    let digits = key.strip_prefix('-').unwrap_or(key);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn array_index(key: &str, len: usize) -> Option<usize> {
    if !is_index_key(key) {
        return None;
    }
    let index: i64 = key.parse().ok()?;
    let len = i64::try_from(len).ok()?;
    let resolved = if index < 0 { len + index } else { index };
    if (0..len).contains(&resolved) {
        usize::try_from(resolved).ok()
    } else {
        None
    }
}

impl Matcher for FieldMatcher {
    fn matches(&self, record: &Value) -> Result<bool, EvalError> {
        match self.extract(record) {
            Some(value) => self.literal.evaluate(&value),
            None => Ok(false),
        }
    }

    fn to_proc(&self) -> MatchFn {
        self.proc.get_or_build(|| {
            let field = self.field.clone();
            let ctx = Arc::clone(&self.ctx);
            let literal = self.literal.evaluate_proc();
            Arc::new(move |record: &Value| match dig(record, &field) {
                Some(value) => literal(&convert(&ctx, value)),
                None => Ok(false),
            })
        })
    }

    fn title(&self) -> String {
        format!("Field: {:?} to match: {}", self.field, self.literal.condition())
    }

    fn children(&self) -> Vec<&dyn Matcher> {
        self.literal.literal_children()
    }

    fn uniq_key(&self) -> String {
        format!("Field:{:?}:{:#}", self.field, self.literal.condition())
    }

    fn matches_with_trace(&self, record: &Value, tracer: &mut Tracer) -> Result<bool, EvalError> {
        tracer.scope(self.title(), record, |tracer| match self.extract(record) {
            Some(value) => self.literal.evaluate_with_trace(&value, tracer),
            None => Ok(false),
        })
    }
}
