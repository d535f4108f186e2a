use crate::preset::Preset;

use super::{FieldFormatter, Source};

const PRESET_TAG: &str = "\"preset\":";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    PresetTag,
    NameStart,
    Name,
    NameEnd,
    End,
}

/// Produces the `"preset":"..."` fragment of a request body.
///
/// Nothing is produced when no preset is set.
#[derive(Debug, Clone)]
pub struct PresetFormatter<'a> {
    preset: &'a Preset,
    state: State,
    source: Source<'a>,
}

impl<'a> PresetFormatter<'a> {
    /// Creates a [`PresetFormatter`] over `preset`.
    #[must_use]
    #[inline]
    pub fn new(preset: &'a Preset) -> Self {
        Self {
            preset,
            state: if preset.is_empty() {
                State::End
            } else {
                State::Start
            },
            source: Source::EMPTY,
        }
    }
}

impl Iterator for PresetFormatter<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        match self.state {
            State::Start => self.source.start_tag(
                PRESET_TAG,
                &mut self.state,
                State::PresetTag,
                State::NameStart,
            ),
            State::PresetTag => self.source.read_tag(&mut self.state, State::NameStart),
            State::NameStart => {
                self.source = Source::new(self.preset.name()?);
                self.state = if self.source.is_exhausted() {
                    State::NameEnd
                } else {
                    State::Name
                };
                Some(b'"')
            }
            State::Name => self.source.read_value(&mut self.state, State::NameEnd),
            State::NameEnd => {
                self.state = State::End;
                Some(b'"')
            }
            State::End => None,
        }
    }
}

impl core::iter::FusedIterator for PresetFormatter<'_> {}

impl FieldFormatter for PresetFormatter<'_> {
    fn has_next(&self) -> bool {
        self.state != State::End
    }

    fn reset(&mut self) {
        *self = Self::new(self.preset);
    }
}

#[cfg(test)]
mod tests {
    use crate::formatter::FieldFormatter;
    use crate::formatter::tests::drain;
    use crate::preset::Preset;

    use super::PresetFormatter;

    #[test]
    fn no_preset() {
        let preset = Preset::new();
        let mut formatter = PresetFormatter::new(&preset);

        assert!(!formatter.has_next());
        assert_eq!(formatter.next(), None);
    }

    #[test]
    fn named_preset() {
        let preset = Preset::named("MyWeather");
        let mut formatter = PresetFormatter::new(&preset);

        assert_eq!(drain(&mut formatter), r#""preset":"MyWeather""#);

        formatter.reset();
        assert_eq!(drain(&mut formatter), r#""preset":"MyWeather""#);
    }

    #[test]
    fn escaped_preset() {
        let preset = Preset::named("a\"b");

        assert_eq!(
            drain(&mut PresetFormatter::new(&preset)),
            r#""preset":"a\"b""#
        );
    }
}
