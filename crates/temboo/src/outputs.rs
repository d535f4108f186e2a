use alloc::string::String;

use hashbrown::DefaultHashBuilder;

use indexmap::map::IndexMap;

use log::debug;

use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::macros::map;

/// Where an output value is extracted from and how it is exposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFilter {
    /// Path of the value inside the choreo output.
    pub path: String,
    /// Name of the output variable the filter reads from.
    pub variable: String,
}

impl OutputFilter {
    /// Creates an [`OutputFilter`].
    #[must_use]
    #[inline]
    pub fn new(path: impl Into<String>, variable: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            variable: variable.into(),
        }
    }
}

map! {
  /// Choreo output filters.
  ///
  /// Associates each filter name with its [`OutputFilter`]. Names are unique
  /// and compared case-sensitively, the iteration order is the insertion
  /// order.
  #[derive(Debug, Clone, PartialEq)]
  pub struct OutputSet(IndexMap<String, OutputFilter, DefaultHashBuilder>);
}

impl OutputSet {
    /// Adds an output filter.
    ///
    /// If a filter with the same name already exists, its path and variable
    /// are overwritten in place.
    #[inline]
    pub fn add(
        &mut self,
        name: impl Into<String>,
        path: impl Into<String>,
        variable: impl Into<String>,
    ) -> &mut Self {
        let name = name.into();
        let filter = OutputFilter::new(path, variable);
        if let Some(existing) = self.0.get_mut(&name) {
            debug!("Replacing output filter `{name}`");
            *existing = filter;
        } else {
            self.0.insert(name, filter);
        }
        self
    }

    /// Adds an output filter, consuming and returning the [`OutputSet`].
    #[must_use]
    #[inline]
    pub fn insert(
        mut self,
        name: impl Into<String>,
        path: impl Into<String>,
        variable: impl Into<String>,
    ) -> Self {
        self.add(name, path, variable);
        self
    }

    /// Retrieves an [`OutputFilter`] by name.
    ///
    /// If [`None`], the filter does not exist.
    #[must_use]
    #[inline]
    pub fn get(&self, name: &str) -> Option<&OutputFilter> {
        self.0.get(name)
    }

    /// Removes an output filter by name.
    ///
    /// The relative order of the remaining filters is preserved.
    #[inline]
    pub fn remove(&mut self, name: &str) -> Option<OutputFilter> {
        self.0.shift_remove(name)
    }
}

#[derive(serde::Serialize)]
struct OutputEntry<'a> {
    name: &'a str,
    path: &'a str,
    variable: &'a str,
}

// Outputs are transmitted as an array of objects, each one carrying its
// own name.
impl Serialize for OutputSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for (name, filter) in self {
            seq.serialize_element(&OutputEntry {
                name,
                path: &filter.path,
                variable: &filter.variable,
            })?;
        }
        seq.end()
    }
}
