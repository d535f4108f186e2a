//! Lazy request body formatters.
//!
//! Each formatter walks one container and produces its `JSON` fragment one
//! byte at a time, so a request body of any size can be measured, signed
//! and transmitted without being stored.
//!
//! Formatters borrow their container immutably. Resetting a formatter, or
//! asking a [`RequestBody`](crate::RequestBody) for a new one, always
//! replays exactly the same bytes.

mod inputs;
mod outputs;
mod preset;

pub use inputs::InputFormatter;
pub use outputs::OutputFormatter;
pub use preset::PresetFormatter;

use crate::inputs::InputSet;
use crate::outputs::OutputSet;
use crate::preset::Preset;

const ESCAPE: u8 = b'\\';

// Second half of the escape sequence of a value byte, if it needs one.
const fn escape_sequence(byte: u8) -> Option<u8> {
    match byte {
        b'\\' => Some(b'\\'),
        b'"' => Some(b'"'),
        0x08 => Some(b'b'),
        0x0c => Some(b'f'),
        b'\n' => Some(b'n'),
        b'\r' => Some(b'r'),
        b'\t' => Some(b't'),
        _ => None,
    }
}

/// A restartable producer of a request body fragment.
pub trait FieldFormatter: Iterator<Item = u8> {
    /// Checks whether there are bytes left to produce, without
    /// consuming any of them.
    fn has_next(&self) -> bool;

    /// Brings the formatter back to its first byte.
    fn reset(&mut self);
}

// A read cursor over the text currently emitted by a formatter: a tag
// literal, a name or a value.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Source<'a> {
    text: &'a [u8],
    position: usize,
    // Second half of an escape sequence whose backslash has already
    // been emitted.
    escaped: Option<u8>,
}

impl<'a> Source<'a> {
    pub(crate) const EMPTY: Self = Self::new("");

    pub(crate) const fn new(text: &'a str) -> Self {
        Self {
            text: text.as_bytes(),
            position: 0,
            escaped: None,
        }
    }

    pub(crate) const fn is_escaping(&self) -> bool {
        self.escaped.is_some()
    }

    pub(crate) const fn is_exhausted(&self) -> bool {
        !self.is_escaping() && self.position >= self.text.len()
    }

    // Points the cursor at `tag` and emits its first byte.
    pub(crate) fn start_tag<S>(
        &mut self,
        tag: &'a str,
        state: &mut S,
        tag_state: S,
        next_state: S,
    ) -> Option<u8> {
        *self = Self::new(tag);
        *state = tag_state;
        self.read_tag(state, next_state)
    }

    // Emits the next byte of a literal, moving to `next_state` as soon as
    // the literal is exhausted.
    pub(crate) fn read_tag<S>(&mut self, state: &mut S, next_state: S) -> Option<u8> {
        let byte = self.next_byte()?;
        if self.is_exhausted() {
            *state = next_state;
        }
        Some(byte)
    }

    // Emits the next byte of a value, escaping it when needed. The state
    // only changes once the last source byte, and the second half of its
    // escape sequence if any, has been emitted.
    pub(crate) fn read_value<S>(&mut self, state: &mut S, next_state: S) -> Option<u8> {
        let byte = match self.escaped.take() {
            Some(escaped) => escaped,
            None => {
                let byte = self.next_byte()?;
                match escape_sequence(byte) {
                    Some(escaped) => {
                        self.escaped = Some(escaped);
                        ESCAPE
                    }
                    None => byte,
                }
            }
        };

        if self.is_exhausted() {
            *state = next_state;
        }
        Some(byte)
    }

    fn next_byte(&mut self) -> Option<u8> {
        let byte = *self.text.get(self.position)?;
        self.position += 1;
        Some(byte)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Inputs,
    Outputs,
    Preset,
}

impl Section {
    const fn next(self) -> Option<Self> {
        match self {
            Self::Inputs => Some(Self::Outputs),
            Self::Outputs => Some(Self::Preset),
            Self::Preset => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Open,
    Section(Section),
    Close,
    End,
}

/// The complete request body formatter.
///
/// Wraps the inputs, outputs and preset fragments into a single `JSON`
/// object, separating the non-empty ones with a comma. When all containers
/// are empty, the body is `{}`.
#[derive(Debug, Clone)]
pub struct DataFormatter<'a> {
    state: State,
    inputs: InputFormatter<'a>,
    outputs: OutputFormatter<'a>,
    preset: PresetFormatter<'a>,
    // Whether the current section has emitted at least one byte.
    section_open: bool,
    // Whether a previous section has been emitted.
    separator_pending: bool,
}

impl<'a> DataFormatter<'a> {
    /// Creates a [`DataFormatter`] over the given containers.
    #[must_use]
    #[inline]
    pub fn new(inputs: &'a InputSet, outputs: &'a OutputSet, preset: &'a Preset) -> Self {
        Self {
            state: State::Open,
            inputs: InputFormatter::new(inputs),
            outputs: OutputFormatter::new(outputs),
            preset: PresetFormatter::new(preset),
            section_open: false,
            separator_pending: false,
        }
    }

    fn section(&mut self, section: Section) -> &mut dyn FieldFormatter {
        match section {
            Section::Inputs => &mut self.inputs,
            Section::Outputs => &mut self.outputs,
            Section::Preset => &mut self.preset,
        }
    }
}

impl Iterator for DataFormatter<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        loop {
            match self.state {
                State::Open => {
                    self.state = State::Section(Section::Inputs);
                    return Some(b'{');
                }
                State::Section(section) => {
                    if self.section(section).has_next() {
                        if !self.section_open {
                            self.section_open = true;
                            if self.separator_pending {
                                return Some(b',');
                            }
                        }
                        return self.section(section).next();
                    }

                    if self.section_open {
                        self.section_open = false;
                        self.separator_pending = true;
                    }
                    self.state = section.next().map_or(State::Close, State::Section);
                }
                State::Close => {
                    self.state = State::End;
                    return Some(b'}');
                }
                State::End => return None,
            }
        }
    }
}

impl core::iter::FusedIterator for DataFormatter<'_> {}

impl FieldFormatter for DataFormatter<'_> {
    fn has_next(&self) -> bool {
        self.state != State::End
    }

    fn reset(&mut self) {
        self.state = State::Open;
        self.section_open = false;
        self.separator_pending = false;
        self.inputs.reset();
        self.outputs.reset();
        self.preset.reset();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;

    use super::{DataFormatter, FieldFormatter, Source};

    use crate::inputs::InputSet;
    use crate::outputs::OutputSet;
    use crate::preset::Preset;

    pub(crate) fn drain<F: FieldFormatter>(formatter: &mut F) -> String {
        let mut bytes = Vec::new();
        while formatter.has_next() {
            bytes.push(formatter.next().unwrap());
        }
        assert_eq!(formatter.next(), None);
        String::from_utf8(bytes).unwrap()
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Step {
        Value,
        Done,
    }

    fn read_value(text: &str) -> Vec<(u8, Step)> {
        let mut source = Source::new(text);
        let mut state = Step::Value;
        let mut out = Vec::new();
        while state == Step::Value {
            let byte = source.read_value(&mut state, Step::Done).unwrap();
            out.push((byte, state));
        }
        out
    }

    #[test]
    fn value_escaping() {
        let escaped: Vec<u8> = read_value("a\"\\\u{8}\u{c}\n\r\tz")
            .into_iter()
            .map(|(byte, _)| byte)
            .collect();

        assert_eq!(escaped, b"a\\\"\\\\\\b\\f\\n\\r\\tz");
    }

    #[test]
    fn escape_pair_is_flushed_before_transition() {
        // A trailing escaped byte keeps the state until the second half of
        // its sequence has been emitted.
        assert_eq!(
            read_value("x\n"),
            [(b'x', Step::Value), (b'\\', Step::Value), (b'n', Step::Done)]
        );
    }

    #[test]
    fn escaped_length() {
        let value = "tab\there \"quoted\" back\\slash\r\n\u{8}\u{c}";
        let escapable = value
            .bytes()
            .filter(|byte| b"\\\"\x08\x0c\n\r\t".contains(byte))
            .count();

        assert_eq!(read_value(value).len(), value.len() + escapable);
    }

    #[test]
    fn empty_body() {
        let (inputs, outputs, preset) = (InputSet::new(), OutputSet::new(), Preset::new());

        assert_eq!(
            drain(&mut DataFormatter::new(&inputs, &outputs, &preset)),
            "{}"
        );
    }

    #[test]
    fn section_separators() {
        let inputs = InputSet::new().insert("a", "1");
        let outputs = OutputSet::new().insert("o", "p", "v");
        let preset = Preset::named("P");
        let (no_inputs, no_outputs, no_preset) =
            (InputSet::new(), OutputSet::new(), Preset::new());

        let cases = [
            (&inputs, &no_outputs, &no_preset, r#"{"inputs":{"a":"1"}}"#),
            (
                &no_inputs,
                &outputs,
                &no_preset,
                r#"{"outputs":[{"name":"o","path":"p","variable":"v"}]}"#,
            ),
            (&no_inputs, &no_outputs, &preset, r#"{"preset":"P"}"#),
            (
                &inputs,
                &no_outputs,
                &preset,
                r#"{"inputs":{"a":"1"},"preset":"P"}"#,
            ),
            (
                &no_inputs,
                &outputs,
                &preset,
                r#"{"outputs":[{"name":"o","path":"p","variable":"v"}],"preset":"P"}"#,
            ),
            (
                &inputs,
                &outputs,
                &preset,
                r#"{"inputs":{"a":"1"},"outputs":[{"name":"o","path":"p","variable":"v"}],"preset":"P"}"#,
            ),
        ];

        for (inputs, outputs, preset, expected) in cases {
            assert_eq!(
                drain(&mut DataFormatter::new(inputs, outputs, preset)),
                expected
            );
        }
    }

    #[test]
    fn reset_replays_identical_bytes() {
        let inputs = InputSet::new()
            .insert("Query", "line one\nline \"two\"")
            .insert("", "");
        let outputs = OutputSet::new()
            .insert("first", "a/b", "Response")
            .insert("second", "", "");
        let preset = Preset::named("Settings\\Main");

        let mut formatter = DataFormatter::new(&inputs, &outputs, &preset);
        let first = drain(&mut formatter);
        assert!(!formatter.has_next());

        formatter.reset();
        assert!(formatter.has_next());
        assert_eq!(drain(&mut formatter), first);

        // Resetting halfway through also replays from the first byte.
        formatter.reset();
        let _ = formatter.by_ref().take(17).count();
        formatter.reset();
        assert_eq!(drain(&mut formatter), first);
    }
}
