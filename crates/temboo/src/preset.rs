use alloc::string::String;

use serde::Serialize;

/// A choreo preset.
///
/// A preset is a server-side bundle of inputs and credentials referenced
/// by name. A request carries at most one preset, an empty name is
/// equivalent to no preset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Preset {
    name: Option<String>,
}

impl Preset {
    /// Creates an empty [`Preset`].
    #[must_use]
    #[inline]
    pub const fn new() -> Self {
        Self { name: None }
    }

    /// Creates a [`Preset`] with the given name.
    #[must_use]
    #[inline]
    pub fn named(name: impl Into<String>) -> Self {
        let mut preset = Self::new();
        preset.set(name);
        preset
    }

    /// Sets the preset name, replacing the previous one.
    #[inline]
    pub fn set(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.name = (!name.is_empty()).then_some(name);
    }

    /// Removes the preset.
    #[inline]
    pub fn clear(&mut self) {
        self.name = None;
    }

    /// Returns the preset name.
    ///
    /// If [`None`], no preset is set.
    #[must_use]
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Checks whether a preset is set.
    #[must_use]
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::Preset;

    #[test]
    fn empty_name_is_no_preset() {
        assert!(Preset::named("").is_empty());

        let mut preset = Preset::named("Weather");
        assert_eq!(preset.name(), Some("Weather"));

        preset.set("");
        assert_eq!(preset.name(), None);
    }

    #[test]
    fn replace_and_clear() {
        let mut preset = Preset::named("First");
        preset.set("Second");
        assert_eq!(preset.name(), Some("Second"));

        preset.clear();
        assert!(preset.is_empty());
    }
}
