use std::{
    fmt,
    fmt::{Debug, Display},
};

use serde::Deserialize;

/// A wrapper around sensitive values (signing secrets, credentials) that redacts the value in `Debug` and `Display`
/// output. The only way to get at the inner value is an explicit call to [`Secret::reveal`].
#[derive(Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Secret<T>
where T: Clone + Default
{
    value: T,
}

impl<T: Clone + Default> Secret<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn reveal(&self) -> &T {
        &self.value
    }
}

impl<T: Clone + Default> Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl<T: Clone + Default> Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}
