use alloc::string::String;

use hashbrown::DefaultHashBuilder;

use indexmap::map::IndexMap;

use log::debug;

use serde::Serialize;

use crate::macros::map;

map! {
  /// Choreo inputs.
  ///
  /// Associates each input name with its value. Names are unique and
  /// compared case-sensitively, the iteration order is the insertion order.
  #[derive(Debug, Clone, PartialEq, Serialize)]
  pub struct InputSet(IndexMap<String, String, DefaultHashBuilder>);
}

impl InputSet {
    /// Adds an input.
    ///
    /// If an input with the same name already exists, its value is
    /// replaced and the input keeps its original position.
    #[inline]
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        if self.0.contains_key(&name) {
            debug!("Replacing the value of input `{name}`");
        }
        self.0.insert(name, value.into());
        self
    }

    /// Adds an input, consuming and returning the [`InputSet`].
    #[must_use]
    #[inline]
    pub fn insert(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(name, value);
        self
    }

    /// Retrieves the value of an input by name.
    ///
    /// If [`None`], the input does not exist.
    #[must_use]
    #[inline]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Removes an input by name, returning its value.
    ///
    /// The relative order of the remaining inputs is preserved.
    #[inline]
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.shift_remove(name)
    }
}
