pub(crate) mod xml;

use std::error::Error;

/// Internal parser failures; callers decide whether they are fatal.
pub(crate) type ParserResult<T> = Result<T, Box<dyn Error + Send + Sync + 'static>>;
