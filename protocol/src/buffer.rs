//! Fixed-capacity message buffer with a shared read/write cursor.

use std::fmt;

use common::Position;

use crate::config::{BufferLimits, ConfigError};
use crate::diagnostics::{CallSite, Origin};
use crate::error::{BufferError, Result};
use crate::header::{self, HEADER_LENGTH, INITIAL_BUFFER_POSITION};
use crate::scalar::Scalar;

/// Byte written by [`MessageBuffer::add_padding_bytes`].
pub const PADDING_BYTE: u8 = 0x33;

/// Precision used by most callers of [`MessageBuffer::add_double`].
pub const DEFAULT_DOUBLE_PRECISION: u8 = 2;

/// Offset applied to scaled doubles so negative values fit in a `u32`.
pub const DOUBLE_OFFSET: i64 = i32::MAX as i64;

/// Encoded width of a [`Position`].
pub const POSITION_SIZE: usize = 5;

const STRING_PREFIX_SIZE: usize = 2;
const DOUBLE_SIZE: usize = 5;

/// Buffer for one message travelling between client and server.
///
/// Reads and writes share a single cursor. Writes advance the cursor and the
/// logical length together; reads only advance the cursor and stop at the end
/// of the logical payload, so bytes left over from a previous message are
/// never returned.
///
/// Every accessor comes in two flavours. The plain one never fails: a rejected
/// operation is logged, marks the buffer as overrun and yields zero, an empty
/// string or no write. The `try_` one returns the [`BufferError`] instead.
/// Neither advances the cursor when it rejects an operation.
#[derive(Clone)]
pub struct MessageBuffer {
    limits: BufferLimits,
    storage: Box<[u8]>,
    position: usize,
    length: usize,
    body_start: usize,
    overrun: bool,
}

impl Default for MessageBuffer {
    fn default() -> Self {
        Self::from_valid_limits(BufferLimits::default())
    }
}

impl fmt::Debug for MessageBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageBuffer")
            .field("capacity", &self.storage.len())
            .field("position", &self.position)
            .field("length", &self.length)
            .field("body_start", &self.body_start)
            .field("overrun", &self.overrun)
            .finish()
    }
}

impl MessageBuffer {
    /// Creates an empty buffer with the default protocol limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer sized by `limits`.
    pub fn with_limits(limits: BufferLimits) -> std::result::Result<Self, ConfigError> {
        limits.validate()?;
        Ok(Self::from_valid_limits(limits))
    }

    fn from_valid_limits(limits: BufferLimits) -> Self {
        Self {
            storage: vec![0; limits.max_message_size].into_boxed_slice(),
            limits,
            position: INITIAL_BUFFER_POSITION,
            length: 0,
            body_start: INITIAL_BUFFER_POSITION,
            overrun: false,
        }
    }

    #[must_use]
    pub const fn limits(&self) -> BufferLimits {
        self.limits
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    // ---- cursor & capacity -------------------------------------------------

    #[must_use]
    pub const fn buffer_position(&self) -> usize {
        self.position
    }

    /// Moves the cursor. Out-of-range positions are accepted here and rejected
    /// by the next read or write.
    pub fn set_buffer_position(&mut self, position: usize) {
        self.position = position;
    }

    #[must_use]
    pub const fn length(&self) -> usize {
        self.length
    }

    pub fn set_length(&mut self, length: usize) {
        self.length = length;
    }

    /// True once any operation has been rejected since the last reset.
    #[must_use]
    pub const fn is_overrun(&self) -> bool {
        self.overrun
    }

    fn read_end(&self) -> usize {
        self.body_start
            .saturating_add(self.length)
            .min(self.storage.len())
    }

    /// Bytes left between the cursor and the end of the logical payload.
    #[must_use]
    pub fn readable(&self) -> usize {
        self.read_end().saturating_sub(self.position)
    }

    /// Bytes left between the cursor and the end of storage.
    #[must_use]
    pub fn writable(&self) -> usize {
        self.storage.len().saturating_sub(self.position)
    }

    /// True if `size` more bytes can be read without passing the payload end.
    #[must_use]
    pub fn can_read(&self, size: usize) -> bool {
        self.position
            .checked_add(size)
            .is_some_and(|end| end <= self.read_end())
    }

    /// True if `size` more bytes fit in storage.
    #[must_use]
    pub fn can_add(&self, size: usize) -> bool {
        let capacity = self.storage.len();
        size <= capacity
            && self
                .position
                .checked_add(size)
                .is_some_and(|end| end <= capacity)
    }

    fn check_read(&mut self, size: usize) -> Result<()> {
        if self.can_read(size) {
            return Ok(());
        }
        self.overrun = true;
        Err(BufferError::ReadUnderflow {
            requested: size,
            available: self.readable(),
        })
    }

    fn check_add(&mut self, size: usize) -> Result<()> {
        if self.can_add(size) {
            return Ok(());
        }
        self.overrun = true;
        Err(BufferError::WriteOverflow {
            requested: size,
            available: self.writable(),
        })
    }

    fn check_field(&mut self, field: &'static str, size: usize, limit: usize) -> Result<()> {
        if size <= limit {
            return Ok(());
        }
        self.overrun = true;
        Err(BufferError::FieldTooLarge { field, size, limit })
    }

    fn reject<T>(&mut self, err: BufferError) -> Result<T> {
        self.overrun = true;
        Err(err)
    }

    /// Moves the cursor by `count` bytes in either direction.
    pub fn try_skip_bytes(&mut self, count: i16) -> Result<()> {
        let target = if count < 0 {
            self.position.checked_sub(usize::from(count.unsigned_abs()))
        } else {
            self.position.checked_add(usize::from(count.unsigned_abs()))
        };
        match target {
            Some(target) if target <= self.storage.len() => {
                self.position = target;
                Ok(())
            }
            _ => self.reject(BufferError::InvalidArgument("skip target outside buffer")),
        }
    }

    /// Skips unknown or unused bytes of an incoming message.
    pub fn skip_bytes(&mut self, count: i16) {
        if let Err(err) = self.try_skip_bytes(count) {
            log::error!("[MessageBuffer::skip_bytes] {err}: count={count}");
        }
    }

    // ---- header ------------------------------------------------------------

    /// Length prefix stored in the first two bytes, without updating `length`.
    #[must_use]
    pub fn length_header(&self) -> u16 {
        header::decode_length(&self.storage).unwrap_or_default()
    }

    /// Reads the length prefix into `length` and returns it.
    pub fn decode_header(&mut self) -> i32 {
        let size = self.length_header();
        self.length = usize::from(size);
        i32::from(size)
    }

    /// Writes `length` as the prefix directly in front of the payload and
    /// returns the complete frame, prefix included.
    pub fn encode_header(&mut self) -> Result<&[u8]> {
        let Ok(size) = u16::try_from(self.length) else {
            return self.reject(BufferError::FieldTooLarge {
                field: "frame",
                size: self.length,
                limit: usize::from(u16::MAX),
            });
        };
        let end = self.body_start + self.length;
        if end > self.storage.len() {
            return self.reject(BufferError::WriteOverflow {
                requested: self.length,
                available: self.storage.len() - self.body_start,
            });
        }
        let start = self.body_start - HEADER_LENGTH;
        self.storage[start..self.body_start].copy_from_slice(&header::encode_length(size));
        log::trace!("[MessageBuffer::encode_header] framed {size} payload bytes");
        Ok(&self.storage[start..end])
    }

    // ---- raw storage -------------------------------------------------------

    #[must_use]
    pub fn buffer(&self) -> &[u8] {
        &self.storage
    }

    pub fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.storage
    }

    /// Prepares for an inbound frame whose header has been decoded: the
    /// payload now starts right after the length prefix. Returns the region
    /// the transport fills with the payload.
    pub fn body_buffer_mut(&mut self) -> &mut [u8] {
        self.position = HEADER_LENGTH;
        self.body_start = HEADER_LENGTH;
        &mut self.storage[HEADER_LENGTH..]
    }

    /// The logical payload, from the payload start up to `length` bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        let start = self.body_start.min(self.storage.len());
        &self.storage[start..self.read_end()]
    }

    // ---- scalars -----------------------------------------------------------

    pub fn try_get<T: Scalar>(&mut self) -> Result<T> {
        self.check_read(T::SIZE)?;
        let value = T::read_le(&self.storage[self.position..]);
        self.position += T::SIZE;
        Ok(value)
    }

    pub fn try_add<T: Scalar>(&mut self, value: T) -> Result<()> {
        self.check_field("scalar", T::SIZE, self.limits.max_packet_size)?;
        self.check_add(T::SIZE)?;
        value.write_le(&mut self.storage[self.position..]);
        self.position += T::SIZE;
        self.length += T::SIZE;
        Ok(())
    }

    /// Reads a little-endian scalar, or zero if not enough payload is left.
    pub fn get<T: Scalar>(&mut self) -> T {
        self.get_inner(None)
    }

    /// Writes a little-endian scalar; logs and writes nothing if it does not fit.
    pub fn add<T: Scalar>(&mut self, value: T) {
        self.add_inner(value, None);
    }

    fn get_inner<T: Scalar>(&mut self, site: Option<&CallSite>) -> T {
        self.try_get().unwrap_or_else(|err| {
            log::error!("[MessageBuffer::get] {err}{}", Origin(site));
            T::default()
        })
    }

    fn add_inner<T: Scalar>(&mut self, value: T, site: Option<&CallSite>) {
        match self.try_add(value) {
            Ok(()) => log::trace!("[MessageBuffer::add] wrote {} bytes{}", T::SIZE, Origin(site)),
            Err(err) => log::error!("[MessageBuffer::add] {err}{}", Origin(site)),
        }
    }

    pub fn get_byte(&mut self) -> u8 {
        self.get::<u8>()
    }

    pub fn add_byte(&mut self, value: u8) {
        self.add::<u8>(value);
    }

    pub fn try_get_previous_byte(&mut self) -> Result<u8> {
        match self.position.checked_sub(1) {
            Some(previous) if previous < self.storage.len() => {
                self.position = previous;
                Ok(self.storage[previous])
            }
            Some(_) => self.reject(BufferError::InvalidArgument("cursor past end of buffer")),
            None => self.reject(BufferError::InvalidArgument("cursor at position 0")),
        }
    }

    /// Steps the cursor back one byte and returns that byte.
    pub fn get_previous_byte(&mut self) -> u8 {
        self.try_get_previous_byte().unwrap_or_else(|err| {
            log::error!("[MessageBuffer::get_previous_byte] {err}");
            0
        })
    }

    // ---- strings -----------------------------------------------------------

    /// Reads a string. A `len` of zero reads the `u16` length prefix first;
    /// any other value is taken as the payload length.
    pub fn try_get_string(&mut self, len: u16) -> Result<Vec<u8>> {
        let start = self.position;
        let len = if len == 0 {
            usize::from(self.try_get::<u16>()?)
        } else {
            usize::from(len)
        };

        let checked = self
            .check_field("string", len, self.limits.max_string_size)
            .and_then(|()| self.check_read(len));
        if let Err(err) = checked {
            self.position = start;
            return Err(err);
        }

        let value = self.storage[self.position..self.position + len].to_vec();
        self.position += len;
        Ok(value)
    }

    pub fn try_add_string(&mut self, value: &[u8]) -> Result<()> {
        self.check_field("string", value.len(), self.limits.max_string_size)?;
        let Ok(len) = u16::try_from(value.len()) else {
            return self.reject(BufferError::FieldTooLarge {
                field: "string",
                size: value.len(),
                limit: usize::from(u16::MAX),
            });
        };
        self.check_add(value.len() + STRING_PREFIX_SIZE)?;

        self.try_add(len)?;
        self.storage[self.position..self.position + value.len()].copy_from_slice(value);
        self.position += value.len();
        self.length += value.len();
        Ok(())
    }

    /// Reads a length-prefixed string. Returns an empty string, with the
    /// cursor left where it was, if the prefix or payload cannot be read.
    pub fn get_string(&mut self) -> Vec<u8> {
        self.get_string_inner(0, None)
    }

    /// Reads a string whose length was already consumed elsewhere.
    pub fn get_string_with_len(&mut self, len: u16) -> Vec<u8> {
        self.get_string_inner(len, None)
    }

    /// [`get_string`](Self::get_string) decoded as UTF-8, replacing invalid
    /// sequences.
    pub fn get_string_lossy(&mut self) -> String {
        String::from_utf8_lossy(&self.get_string()).into_owned()
    }

    /// Writes a length-prefixed string. An empty value writes a zero prefix.
    pub fn add_string(&mut self, value: impl AsRef<[u8]>) {
        self.add_string_inner(value.as_ref(), None);
    }

    fn get_string_inner(&mut self, len: u16, site: Option<&CallSite>) -> Vec<u8> {
        match self.try_get_string(len) {
            Ok(value) => {
                log::debug!("[MessageBuffer::get_string] read {} bytes{}", value.len(), Origin(site));
                value
            }
            Err(err) => {
                log::error!("[MessageBuffer::get_string] {err}{}", Origin(site));
                Vec::new()
            }
        }
    }

    fn add_string_inner(&mut self, value: &[u8], site: Option<&CallSite>) {
        if value.is_empty() {
            log::debug!("[MessageBuffer::add_string] adding an empty string{}", Origin(site));
        }
        match self.try_add_string(value) {
            Ok(()) => log::debug!("[MessageBuffer::add_string] wrote {} bytes{}", value.len(), Origin(site)),
            Err(err) => log::error!("[MessageBuffer::add_string] {err}{}", Origin(site)),
        }
    }

    // ---- positions ---------------------------------------------------------

    pub fn try_get_position(&mut self) -> Result<Position> {
        self.check_read(POSITION_SIZE)?;
        Ok(Position {
            x: self.try_get()?,
            y: self.try_get()?,
            z: self.try_get()?,
        })
    }

    pub fn try_add_position(&mut self, pos: Position) -> Result<()> {
        self.check_field("scalar", <u16 as Scalar>::SIZE, self.limits.max_packet_size)?;
        self.check_add(POSITION_SIZE)?;
        self.try_add(pos.x)?;
        self.try_add(pos.y)?;
        self.try_add(pos.z)
    }

    pub fn get_position(&mut self) -> Position {
        self.try_get_position().unwrap_or_else(|err| {
            log::error!("[MessageBuffer::get_position] {err}");
            Position::default()
        })
    }

    pub fn add_position(&mut self, pos: Position) {
        if let Err(err) = self.try_add_position(pos) {
            log::error!("[MessageBuffer::add_position] {err}: {pos}");
        }
    }

    // ---- scaled doubles ----------------------------------------------------

    /// Writes `precision` followed by `round(value * 10^precision) + i32::MAX`
    /// as a `u32`.
    pub fn try_add_double(&mut self, value: f64, precision: u8) -> Result<()> {
        let scaled = (value * 10f64.powi(i32::from(precision))).round() + DOUBLE_OFFSET as f64;
        if !scaled.is_finite() || scaled < 0.0 || scaled > f64::from(u32::MAX) {
            return self.reject(BufferError::InvalidArgument(
                "double out of range for its precision",
            ));
        }
        self.check_field("scalar", <u32 as Scalar>::SIZE, self.limits.max_packet_size)?;
        self.check_add(DOUBLE_SIZE)?;
        self.try_add(precision)?;
        self.try_add(scaled as u32)
    }

    /// Reads a scaled double, dividing by the precision it was written with.
    pub fn try_get_double(&mut self) -> Result<f64> {
        self.check_read(DOUBLE_SIZE)?;
        let precision: u8 = self.try_get()?;
        let scaled: u32 = self.try_get()?;
        Ok((i64::from(scaled) - DOUBLE_OFFSET) as f64 / 10f64.powi(i32::from(precision)))
    }

    pub fn add_double(&mut self, value: f64, precision: u8) {
        if let Err(err) = self.try_add_double(value, precision) {
            log::error!("[MessageBuffer::add_double] {err}: value={value} precision={precision}");
        }
    }

    pub fn get_double(&mut self) -> f64 {
        self.try_get_double().unwrap_or_else(|err| {
            log::error!("[MessageBuffer::get_double] {err}");
            0.0
        })
    }

    // ---- raw bytes ---------------------------------------------------------

    pub fn try_add_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.check_add(bytes.len())?;
        self.check_field("bytes", bytes.len(), self.storage.len())?;
        self.storage[self.position..self.position + bytes.len()].copy_from_slice(bytes);
        self.position += bytes.len();
        self.length += bytes.len();
        Ok(())
    }

    pub fn add_bytes(&mut self, bytes: &[u8]) {
        if let Err(err) = self.try_add_bytes(bytes) {
            log::error!("[MessageBuffer::add_bytes] {err}");
        }
    }

    pub fn try_add_padding_bytes(&mut self, n: usize) -> Result<()> {
        self.check_add(n)?;
        self.storage[self.position..self.position + n].fill(PADDING_BYTE);
        self.position += n;
        self.length += n;
        Ok(())
    }

    /// Fills `n` bytes with [`PADDING_BYTE`].
    pub fn add_padding_bytes(&mut self, n: usize) {
        if let Err(err) = self.try_add_padding_bytes(n) {
            log::error!("[MessageBuffer::add_padding_bytes] cannot add padding bytes: {err}");
        }
    }

    // ---- lifecycle ---------------------------------------------------------

    /// Rewinds to an empty outbound message. Storage is not cleared.
    pub fn reset(&mut self) {
        self.position = INITIAL_BUFFER_POSITION;
        self.body_start = INITIAL_BUFFER_POSITION;
        self.length = 0;
        self.overrun = false;
    }

    /// Copies the payload of `other` in at the cursor.
    pub fn try_append(&mut self, other: &MessageBuffer) -> Result<()> {
        self.try_add_bytes(other.payload())
    }

    pub fn append(&mut self, other: &MessageBuffer) {
        if let Err(err) = self.try_append(other) {
            log::error!("[MessageBuffer::append] {err}");
        }
    }
}

/// Accessors that tag their log lines with the caller's [`CallSite`].
#[cfg(feature = "call-site")]
impl MessageBuffer {
    pub fn get_at<T: Scalar>(&mut self, site: &CallSite) -> T {
        self.get_inner(Some(site))
    }

    pub fn add_at<T: Scalar>(&mut self, value: T, site: &CallSite) {
        self.add_inner(value, Some(site));
    }

    pub fn get_string_at(&mut self, len: u16, site: &CallSite) -> Vec<u8> {
        self.get_string_inner(len, Some(site))
    }

    pub fn add_string_at(&mut self, value: impl AsRef<[u8]>, site: &CallSite) {
        self.add_string_inner(value.as_ref(), Some(site));
    }
}
