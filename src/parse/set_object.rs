//! Set objects (`{"@set": [...]}`)

use super::{ParseResult, ParseWarning, Parsed, Parser, ToParse, SET_UNSUPPORTED};
use crate::ir::IntermediateResult;
use futures::future::{BoxFuture, FutureExt};

/// Set objects are not decomposed: the raw element passes through with a warning.
pub fn set_object<'a>(_parser: &'a Parser, to_parse: ToParse<'a>) -> BoxFuture<'a, ParseResult<Parsed>> {
    async move {
        Ok(Parsed::new(
            to_parse.variable,
            IntermediateResult::native_value(to_parse.element.clone()),
        )
        .with_warning(ParseWarning::new(SET_UNSUPPORTED)))
    }
    .boxed()
}
