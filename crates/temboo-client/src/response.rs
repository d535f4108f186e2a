// Synthetic record placed in front of a choreo response, carrying the HTTP
// status. Tag and value are terminated by a newline followed by the `US`
// and `RS` control characters respectively.
const TAG: &[u8] = b"HTTP_CODE\n\x1F";

// Enough for `599\n\x1E`.
const STATUS_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Tag(usize),
    Status(usize),
    Live,
}

/// Reads the status record before handing the stream over to the
/// transport.
#[derive(Debug, Clone)]
pub(crate) struct StatusPrefix {
    phase: Phase,
    status: [u8; STATUS_LEN],
    status_len: usize,
}

impl StatusPrefix {
    // A prefix which has been entirely read.
    pub(crate) const fn consumed() -> Self {
        Self {
            phase: Phase::Live,
            status: [0; STATUS_LEN],
            status_len: 0,
        }
    }

    pub(crate) fn armed(code: u16) -> Self {
        let mut status = [0; STATUS_LEN];
        let mut status_len = 0;

        let digits = [code / 100, code / 10 % 10, code % 10];
        let first = digits.iter().position(|&digit| digit != 0).unwrap_or(2);
        for &digit in &digits[first..] {
            // Codes are always below 600.
            status[status_len] = b'0' + (digit % 10) as u8;
            status_len += 1;
        }
        status[status_len] = b'\n';
        status[status_len + 1] = 0x1E;
        status_len += 2;

        Self {
            phase: Phase::Tag(0),
            status,
            status_len,
        }
    }

    pub(crate) const fn remaining(&self) -> usize {
        match self.phase {
            Phase::Tag(position) => TAG.len() - position + self.status_len,
            Phase::Status(position) => self.status_len - position,
            Phase::Live => 0,
        }
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        match self.phase {
            Phase::Tag(position) => TAG.get(position).copied(),
            Phase::Status(position) => self.status[..self.status_len].get(position).copied(),
            Phase::Live => None,
        }
    }

    pub(crate) fn read(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.phase = match self.phase {
            Phase::Tag(position) if position + 1 < TAG.len() => Phase::Tag(position + 1),
            Phase::Tag(_) => Phase::Status(0),
            Phase::Status(position) if position + 1 < self.status_len => {
                Phase::Status(position + 1)
            }
            Phase::Status(_) | Phase::Live => Phase::Live,
        };
        Some(byte)
    }
}
