// FIXME: Remove once passing by value will be supported in serde.
#![allow(clippy::trivially_copy_pass_by_ref)]

use serde::Serialize;

use crate::formatter::DataFormatter;
use crate::inputs::InputSet;
use crate::outputs::OutputSet;
use crate::preset::Preset;

#[inline]
fn no_inputs(inputs: &&InputSet) -> bool {
    inputs.is_empty()
}

#[inline]
fn no_outputs(outputs: &&OutputSet) -> bool {
    outputs.is_empty()
}

#[inline]
fn no_preset(preset: &&Preset) -> bool {
    preset.is_empty()
}

/// An immutable view of the data sent with a choreo execution request.
///
/// The view is a formatter factory: every call to
/// [`RequestBody::formatter`] returns a new [`DataFormatter`] positioned on
/// the first body byte. The containers stay borrowed for the whole lifetime
/// of the view, so every formatter produces the same bytes.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RequestBody<'a> {
    #[serde(skip_serializing_if = "no_inputs")]
    inputs: &'a InputSet,
    #[serde(skip_serializing_if = "no_outputs")]
    outputs: &'a OutputSet,
    #[serde(skip_serializing_if = "no_preset")]
    preset: &'a Preset,
}

impl<'a> RequestBody<'a> {
    /// Creates a [`RequestBody`] over the given containers.
    #[must_use]
    #[inline]
    pub const fn new(inputs: &'a InputSet, outputs: &'a OutputSet, preset: &'a Preset) -> Self {
        Self {
            inputs,
            outputs,
            preset,
        }
    }

    /// Returns a [`DataFormatter`] producing the body from its first byte.
    #[must_use]
    #[inline]
    pub fn formatter(&self) -> DataFormatter<'a> {
        DataFormatter::new(self.inputs, self.outputs, self.preset)
    }

    /// Returns the body length in bytes.
    ///
    /// The body is produced once and discarded.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        self.formatter().count()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;

    use crate::inputs::InputSet;
    use crate::outputs::OutputSet;
    use crate::preset::Preset;

    use super::RequestBody;

    fn formatted(body: &RequestBody<'_>) -> String {
        String::from_utf8(body.formatter().collect::<Vec<u8>>()).unwrap()
    }

    #[test]
    fn boston() {
        let inputs = InputSet::new().insert("city", "Boston");
        let (outputs, preset) = (OutputSet::new(), Preset::new());
        let body = RequestBody::new(&inputs, &outputs, &preset);

        assert_eq!(formatted(&body), r#"{"inputs":{"city":"Boston"}}"#);
        assert_eq!(body.encoded_len(), 28);
    }

    #[test]
    fn matches_serde_json() {
        let inputs = InputSet::new()
            .insert("Query", "SELECT \"name\" FROM\tusers\r\n")
            .insert("Path", "C:\\Users")
            .insert("", "");
        let outputs = OutputSet::new()
            .insert("Temperature", "/rss/channel/item/condition/@temp", "Response")
            .insert("Humidity", "", "Raw");
        let preset = Preset::named("Weather \"home\"");
        let (no_inputs, no_outputs, no_preset) =
            (InputSet::new(), OutputSet::new(), Preset::new());

        let bodies = [
            RequestBody::new(&no_inputs, &no_outputs, &no_preset),
            RequestBody::new(&inputs, &no_outputs, &no_preset),
            RequestBody::new(&no_inputs, &outputs, &no_preset),
            RequestBody::new(&no_inputs, &no_outputs, &preset),
            RequestBody::new(&inputs, &outputs, &preset),
        ];

        for body in bodies {
            let expected = serde_json::to_string(&body).unwrap();
            assert_eq!(formatted(&body), expected);
            assert_eq!(body.encoded_len(), expected.len());
        }
    }

    #[test]
    fn every_formatter_replays() {
        let inputs = InputSet::new().insert("a", "1\n");
        let outputs = OutputSet::new().insert("o", "p", "v");
        let preset = Preset::named("P");
        let body = RequestBody::new(&inputs, &outputs, &preset);

        let first = formatted(&body);
        let mut partial = body.formatter();
        let _ = partial.by_ref().take(5).count();

        assert_eq!(formatted(&body), first);
        assert_eq!(body.encoded_len(), first.len());
    }
}
