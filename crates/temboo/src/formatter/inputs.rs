use crate::inputs::InputSet;

use super::{FieldFormatter, Source};

const INPUTS_TAG: &str = "\"inputs\":{";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    InputsTag,
    NameStart,
    Name,
    NameEnd,
    NameValueSeparator,
    ValueStart,
    Value,
    ValueEnd,
    NextInput,
    InputsEnd,
    End,
}

/// Produces the `"inputs":{...}` fragment of a request body.
///
/// Nothing is produced for an empty [`InputSet`].
#[derive(Debug, Clone)]
pub struct InputFormatter<'a> {
    inputs: &'a InputSet,
    state: State,
    source: Source<'a>,
    current: usize,
}

impl<'a> InputFormatter<'a> {
    /// Creates an [`InputFormatter`] over `inputs`.
    #[must_use]
    #[inline]
    pub fn new(inputs: &'a InputSet) -> Self {
        Self {
            inputs,
            state: if inputs.is_empty() {
                State::End
            } else {
                State::Start
            },
            source: Source::EMPTY,
            current: 0,
        }
    }

    fn current(&self) -> Option<(&'a str, &'a str)> {
        let inputs: &'a InputSet = self.inputs;
        inputs
            .get_index(self.current)
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    fn start_text(&mut self, text: &'a str, text_state: State, end_state: State) -> u8 {
        self.source = Source::new(text);
        self.state = if self.source.is_exhausted() {
            end_state
        } else {
            text_state
        };
        b'"'
    }
}

impl Iterator for InputFormatter<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        match self.state {
            State::Start => self.source.start_tag(
                INPUTS_TAG,
                &mut self.state,
                State::InputsTag,
                State::NameStart,
            ),
            State::InputsTag => self.source.read_tag(&mut self.state, State::NameStart),
            State::NameStart => {
                let (name, _) = self.current()?;
                Some(self.start_text(name, State::Name, State::NameEnd))
            }
            State::Name => self.source.read_value(&mut self.state, State::NameEnd),
            State::NameEnd => {
                self.state = State::NameValueSeparator;
                Some(b'"')
            }
            State::NameValueSeparator => {
                self.state = State::ValueStart;
                Some(b':')
            }
            State::ValueStart => {
                let (_, value) = self.current()?;
                Some(self.start_text(value, State::Value, State::ValueEnd))
            }
            State::Value => self.source.read_value(&mut self.state, State::ValueEnd),
            State::ValueEnd => {
                self.current += 1;
                self.state = if self.current < self.inputs.len() {
                    State::NextInput
                } else {
                    State::InputsEnd
                };
                Some(b'"')
            }
            State::NextInput => {
                self.state = State::NameStart;
                Some(b',')
            }
            State::InputsEnd => {
                self.state = State::End;
                Some(b'}')
            }
            State::End => None,
        }
    }
}

impl core::iter::FusedIterator for InputFormatter<'_> {}

impl FieldFormatter for InputFormatter<'_> {
    fn has_next(&self) -> bool {
        self.state != State::End
    }

    fn reset(&mut self) {
        *self = Self::new(self.inputs);
    }
}
