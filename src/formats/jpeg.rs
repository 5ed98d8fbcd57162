//! JPEG marker scanning.
//!
//! Walks the marker segments at the head of a JPEG stream until a
//! start-of-frame header turns up, without ever buffering more than one
//! segment. The scanner is sans-IO: it says what it needs through
//! [`Command`] and the driver in [`crate::probe`] satisfies it.

use tracing::trace;

use crate::error::ProbeError;
use crate::types::ImageSize;

pub const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
pub const MARKER_PREFIX: u8 = 0xFF;

pub const TEM: u8 = 0x01;
pub const DHT: u8 = 0xC4;
pub const JPG: u8 = 0xC8;
pub const DAC: u8 = 0xCC;
pub const EOI: u8 = 0xD9;
pub const SOS: u8 = 0xDA;

const MARKER_SIZE: usize = 2;
const LENGTH_FIELD_SIZE: usize = 2;
const FRAME_HEADER_MIN_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// RSTn, SOI, EOI and TEM: no length field.
    Standalone,
    /// SOFn: carries the frame header.
    Frame,
    /// Any other code in C0..FE: a two-byte length and an opaque body.
    LengthPrefixed,
    /// Reserved or invalid codes.
    Unknown,
}

/// Total classification of a marker code (Table B.1 of ITU T.81).
pub fn classify(code: u8) -> MarkerKind {
    match code {
        0xD0..=0xD9 | TEM => MarkerKind::Standalone,
        DHT | JPG | DAC => MarkerKind::LengthPrefixed,
        0xC0..=0xCF => MarkerKind::Frame,
        0xC0..=0xFE => MarkerKind::LengthPrefixed,
        _ => MarkerKind::Unknown,
    }
}

#[inline]
pub fn is_frame_marker(code: u8) -> bool {
    classify(code) == MarkerKind::Frame
}

/// A marker together with the size of its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub code: u8,
    /// Body length, length field excluded. Negative when the declared
    /// length cannot even cover the field itself.
    pub payload_len: i32,
}

impl Segment {
    pub fn standalone(code: u8) -> Self {
        Self {
            code,
            payload_len: 0,
        }
    }

    pub fn from_length_field(code: u8, field: [u8; 2]) -> Self {
        Self {
            code,
            payload_len: u16::from_be_bytes(field) as i32 - LENGTH_FIELD_SIZE as i32,
        }
    }

    fn declared_length(&self) -> u16 {
        (self.payload_len + LENGTH_FIELD_SIZE as i32) as u16
    }
}

/// Outcome of reading the two marker bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerRead {
    Standalone(u8),
    NeedsLength(u8),
    NotAMarker { prefix: u8, code: u8 },
}

pub fn read_marker(bytes: [u8; 2]) -> MarkerRead {
    let [prefix, code] = bytes;
    if prefix != MARKER_PREFIX {
        return MarkerRead::NotAMarker { prefix, code };
    }

    match classify(code) {
        MarkerKind::Standalone => MarkerRead::Standalone(code),
        MarkerKind::Frame | MarkerKind::LengthPrefixed => MarkerRead::NeedsLength(code),
        MarkerKind::Unknown => MarkerRead::NotAMarker { prefix, code },
    }
}

/// What the marker reader handed to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scanned {
    Segment(Segment),
    NotAMarker { prefix: u8, code: u8 },
}

#[derive(Debug)]
pub enum Action {
    Stop(ProbeError),
    ReadFrame { code: u8, len: usize },
    NextMarker,
    Skip(usize),
}

pub fn dispatch(scanned: Scanned) -> Action {
    let segment = match scanned {
        Scanned::NotAMarker { prefix, code } => {
            return Action::Stop(ProbeError::MalformedMarker { prefix, code });
        }
        Scanned::Segment(segment) => segment,
    };

    if segment.payload_len < 0 {
        return Action::Stop(ProbeError::InconsistentLength {
            code: segment.code,
            declared: segment.declared_length(),
        });
    }

    if segment.code == EOI || segment.code == SOS {
        return Action::Stop(ProbeError::NoFrameHeader { code: segment.code });
    }

    let len = segment.payload_len as usize;

    if is_frame_marker(segment.code) {
        return Action::ReadFrame {
            code: segment.code,
            len,
        };
    }

    if len == 0 {
        Action::NextMarker
    } else {
        Action::Skip(len)
    }
}

/// Reads height and width from an SOF payload.
pub fn decode_frame_header(code: u8, payload: &[u8]) -> Result<ImageSize, ProbeError> {
    if payload.len() < FRAME_HEADER_MIN_LEN {
        return Err(ProbeError::ShortFrameHeader {
            code,
            len: payload.len(),
        });
    }

    let height = u16::from_be_bytes([payload[1], payload[2]]);
    let width = u16::from_be_bytes([payload[3], payload[4]]);
    Ok(ImageSize::jpeg(width, height))
}

/// The next thing the scanner needs from its byte source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Read(usize),
    Skip(usize),
    /// Discard whatever is left; the scan is over.
    Stop,
}

#[derive(Debug)]
enum State {
    Signature,
    Marker,
    Length { code: u8 },
    Frame { code: u8, len: usize },
    Skip(usize),
    Done(Result<ImageSize, ProbeError>),
}

#[derive(Debug)]
pub struct JpegScanner {
    state: State,
    consumed: u64,
    limit: Option<u64>,
}

impl Default for JpegScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl JpegScanner {
    pub fn new() -> Self {
        Self::with_limit(None)
    }

    pub fn with_limit(limit: Option<u64>) -> Self {
        let mut scanner = Self {
            state: State::Signature,
            consumed: 0,
            limit,
        };
        scanner.enforce_limit();
        scanner
    }

    pub fn command(&self) -> Command {
        match self.state {
            State::Signature | State::Marker => Command::Read(MARKER_SIZE),
            State::Length { .. } => Command::Read(LENGTH_FIELD_SIZE),
            State::Frame { len, .. } => Command::Read(len),
            State::Skip(len) => Command::Skip(len),
            State::Done(_) => Command::Stop,
        }
    }

    /// Supplies the bytes asked for by the last `Command::Read`.
    pub fn feed(&mut self, data: &[u8]) {
        let Command::Read(wanted) = self.command() else {
            debug_assert!(false, "feed called without a pending read");
            return;
        };
        if data.len() < wanted {
            self.finish_with(Err(ProbeError::Truncated));
            return;
        }

        let data = &data[..wanted];
        self.consumed += wanted as u64;

        match std::mem::replace(&mut self.state, State::Marker) {
            State::Signature => {
                if data == JPEG_SOI {
                    self.state = State::Marker;
                } else {
                    self.finish_with(Err(ProbeError::InvalidSignature {
                        found: [data[0], data[1]],
                    }));
                }
            }
            State::Marker => match read_marker([data[0], data[1]]) {
                MarkerRead::NeedsLength(code) => self.state = State::Length { code },
                MarkerRead::Standalone(code) => {
                    trace!(marker = code, "standalone marker");
                    self.apply(dispatch(Scanned::Segment(Segment::standalone(code))));
                }
                MarkerRead::NotAMarker { prefix, code } => {
                    self.apply(dispatch(Scanned::NotAMarker { prefix, code }));
                }
            },
            State::Length { code } => {
                let segment = Segment::from_length_field(code, [data[0], data[1]]);
                trace!(marker = code, payload_len = segment.payload_len, "segment");
                self.apply(dispatch(Scanned::Segment(segment)));
            }
            State::Frame { code, .. } => {
                self.finish_with(decode_frame_header(code, data));
            }
            state @ (State::Skip(_) | State::Done(_)) => self.state = state,
        }

        self.enforce_limit();
    }

    /// Acknowledges that the bytes of the last `Command::Skip` were discarded.
    pub fn skipped(&mut self) {
        match self.state {
            State::Skip(len) => {
                self.consumed += len as u64;
                self.state = State::Marker;
                self.enforce_limit();
            }
            _ => debug_assert!(false, "skipped called without a pending skip"),
        }
    }

    /// The source ended or disconnected. A finished scan keeps its result.
    pub fn interrupt(&mut self) {
        if !self.is_done() {
            self.finish_with(Err(ProbeError::Truncated));
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, State::Done(_))
    }

    /// Bytes read or skipped so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    pub fn finish(self) -> Result<ImageSize, ProbeError> {
        match self.state {
            State::Done(result) => result,
            _ => Err(ProbeError::Truncated),
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Stop(err) => self.finish_with(Err(err)),
            Action::ReadFrame { code, len } => self.state = State::Frame { code, len },
            Action::NextMarker => self.state = State::Marker,
            Action::Skip(len) => self.state = State::Skip(len),
        }
    }

    fn finish_with(&mut self, result: Result<ImageSize, ProbeError>) {
        match &result {
            Ok(size) => trace!(width = size.width, height = size.height, "frame header decoded"),
            Err(err) => trace!(kind = err.kind(), "scan stopped without dimensions"),
        }
        self.state = State::Done(result);
    }

    fn enforce_limit(&mut self) {
        let Some(limit) = self.limit else {
            return;
        };
        let pending = match self.command() {
            Command::Read(n) | Command::Skip(n) => n as u64,
            Command::Stop => return,
        };
        if self.consumed + pending > limit {
            self.finish_with(Err(ProbeError::LimitExceeded { limit }));
        }
    }
}
