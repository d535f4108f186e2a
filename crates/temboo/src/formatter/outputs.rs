use crate::outputs::{OutputFilter, OutputSet};

use super::{FieldFormatter, Source};

const OUTPUTS_TAG: &str = "\"outputs\":[";

// The tagged fields of an output element, in transmission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Path,
    Variable,
}

impl Field {
    const fn tag(self) -> &'static str {
        match self {
            Self::Name => "\"name\":",
            Self::Path => "\"path\":",
            Self::Variable => "\"variable\":",
        }
    }

    const fn next(self) -> Option<Self> {
        match self {
            Self::Name => Some(Self::Path),
            Self::Path => Some(Self::Variable),
            Self::Variable => None,
        }
    }

    fn text<'a>(self, name: &'a str, filter: &'a OutputFilter) -> &'a str {
        match self {
            Self::Name => name,
            Self::Path => &filter.path,
            Self::Variable => &filter.variable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    OutputsTag,
    ElementStart,
    FieldTagStart(Field),
    FieldTag(Field),
    ValueStart(Field),
    Value(Field),
    ValueEnd(Field),
    FieldSeparator(Field),
    ElementEnd,
    NextElement,
    OutputsEnd,
    End,
}

/// Produces the `"outputs":[...]` fragment of a request body.
///
/// Every output filter becomes an object with its `name`, `path` and
/// `variable` fields. Nothing is produced for an empty [`OutputSet`].
#[derive(Debug, Clone)]
pub struct OutputFormatter<'a> {
    outputs: &'a OutputSet,
    state: State,
    source: Source<'a>,
    current: usize,
}

impl<'a> OutputFormatter<'a> {
    /// Creates an [`OutputFormatter`] over `outputs`.
    #[must_use]
    #[inline]
    pub fn new(outputs: &'a OutputSet) -> Self {
        Self {
            outputs,
            state: if outputs.is_empty() {
                State::End
            } else {
                State::Start
            },
            source: Source::EMPTY,
            current: 0,
        }
    }

    fn field_text(&self, field: Field) -> Option<&'a str> {
        let outputs: &'a OutputSet = self.outputs;
        outputs
            .get_index(self.current)
            .map(|(name, filter)| field.text(name, filter))
    }
}

impl Iterator for OutputFormatter<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        match self.state {
            State::Start => self.source.start_tag(
                OUTPUTS_TAG,
                &mut self.state,
                State::OutputsTag,
                State::ElementStart,
            ),
            State::OutputsTag => self.source.read_tag(&mut self.state, State::ElementStart),
            State::ElementStart => {
                self.state = State::FieldTagStart(Field::Name);
                Some(b'{')
            }
            State::FieldTagStart(field) => self.source.start_tag(
                field.tag(),
                &mut self.state,
                State::FieldTag(field),
                State::ValueStart(field),
            ),
            State::FieldTag(field) => self
                .source
                .read_tag(&mut self.state, State::ValueStart(field)),
            State::ValueStart(field) => {
                self.source = Source::new(self.field_text(field)?);
                self.state = if self.source.is_exhausted() {
                    State::ValueEnd(field)
                } else {
                    State::Value(field)
                };
                Some(b'"')
            }
            State::Value(field) => self
                .source
                .read_value(&mut self.state, State::ValueEnd(field)),
            State::ValueEnd(field) => {
                self.state = field
                    .next()
                    .map_or(State::ElementEnd, State::FieldSeparator);
                Some(b'"')
            }
            State::FieldSeparator(next_field) => {
                self.state = State::FieldTagStart(next_field);
                Some(b',')
            }
            State::ElementEnd => {
                self.current += 1;
                self.state = if self.current < self.outputs.len() {
                    State::NextElement
                } else {
                    State::OutputsEnd
                };
                Some(b'}')
            }
            State::NextElement => {
                self.state = State::ElementStart;
                Some(b',')
            }
            State::OutputsEnd => {
                self.state = State::End;
                Some(b']')
            }
            State::End => None,
        }
    }
}

impl core::iter::FusedIterator for OutputFormatter<'_> {}

impl FieldFormatter for OutputFormatter<'_> {
    fn has_next(&self) -> bool {
        self.state != State::End
    }

    fn reset(&mut self) {
        *self = Self::new(self.outputs);
    }
}
