//! Binary persistence codec: full-store image encode/decode.
//!
//! Layout (native byte order, `usize` for sizes, no version tag):
//!
//! ```text
//! max_visits   usize            informational, ignored on load
//! user_count   usize
//! per user:    user_id u32, visit_count usize
//!   per visit: visit_id u32
//!              url_len usize, url bytes + NUL    (len counts the NUL)
//!              text_len usize, text bytes + NUL  (len counts the NUL)
//!              secs i64, nanos i64
//! ```

pub mod cursor;
pub mod writer;

use std::path::Path;

use visits_core::constants::NANOS_PER_SEC;
use visits_core::errors::CodecError;
use visits_core::{Timestamp, Visit};

use crate::user_visits::UserVisits;

use self::cursor::Cursor;
use self::writer::Writer;

const HEADER_BYTES: usize = 2 * std::mem::size_of::<usize>();
const USER_HEADER_BYTES: usize = 4 + std::mem::size_of::<usize>();
const VISIT_FIXED_BYTES: usize = 4 + 2 * std::mem::size_of::<usize>() + 2 + 16;

/// A fully decoded store image.
#[derive(Debug)]
pub struct DecodedStore {
    /// Capacity recorded in the image. Informational only.
    pub stored_max_visits: usize,
    /// Users in file order.
    pub users: Vec<UserVisits>,
    /// Records present in the image but not kept: past the capacity bound
    /// in file order, or repeating a visit id already seen for that user.
    pub dropped_visits: usize,
}

/// Encode the whole store. Users are emitted in the iterator's order.
pub fn encode<'a, I>(max_visits: usize, users: I) -> Vec<u8>
where
    I: IntoIterator<Item = &'a UserVisits>,
    I::IntoIter: ExactSizeIterator,
{
    let users = users.into_iter();
    let mut w = Writer::with_capacity(HEADER_BYTES + users.len() * USER_HEADER_BYTES);
    w.write_usize(max_visits);
    w.write_usize(users.len());

    for user in users {
        w.write_u32(user.user_id());
        w.write_usize(user.len());
        for visit in user.visits() {
            encode_visit(&mut w, visit);
        }
    }

    w.into_bytes()
}

fn encode_visit(w: &mut Writer, visit: &Visit) {
    w.write_u32(visit.visit_id());
    w.write_cstr(visit.url());
    w.write_cstr(visit.text());
    let ts = visit.timestamp();
    w.write_i64(ts.secs);
    w.write_i64(i64::from(ts.nanos));
}

/// Decode a store image, keeping at most `max_visits` records per user.
///
/// Any short read aborts the whole decode. Truncation to `max_visits` is by
/// position in the image, not by timestamp: the first `max_visits` records
/// written for a user survive, whichever they are.
pub fn decode(bytes: &[u8], max_visits: usize) -> Result<DecodedStore, CodecError> {
    let mut c = Cursor::new(bytes);
    let stored_max_visits = c.read_usize("max_visits")?;
    let user_count = c.read_usize("user_count")?;

    // Counts come from untrusted input; never pre-allocate past what the
    // remaining bytes could possibly hold.
    let mut users = Vec::with_capacity(user_count.min(c.remaining() / USER_HEADER_BYTES));
    let mut dropped_visits = 0;

    for _ in 0..user_count {
        let user_id = c.read_u32("user_id")?;
        let visit_count = c.read_usize("visit_count")?;
        let mut user = UserVisits::with_capacity(
            user_id,
            visit_count
                .min(max_visits)
                .min(c.remaining() / VISIT_FIXED_BYTES),
        );

        for position in 0..visit_count {
            let visit = decode_visit(&mut c)?;
            if position >= max_visits || !user.insert(visit) {
                dropped_visits += 1;
            }
        }
        users.push(user);
    }

    Ok(DecodedStore {
        stored_max_visits,
        users,
        dropped_visits,
    })
}

fn decode_visit(c: &mut Cursor<'_>) -> Result<Visit, CodecError> {
    let visit_id = c.read_u32("visit_id")?;
    let url = c.read_cstr("url_len", "url")?;
    let text = c.read_cstr("text_len", "text")?;

    let offset = c.position();
    let secs = c.read_i64("timestamp_secs")?;
    let nanos = c.read_i64("timestamp_nanos")?;
    let nanos = u32::try_from(nanos)
        .ok()
        .filter(|n| *n < NANOS_PER_SEC)
        .ok_or(CodecError::InvalidTimestamp {
            offset,
            secs,
            nanos,
        })?;

    Ok(Visit::with_timestamp(
        visit_id,
        url,
        text,
        Timestamp::new(secs, nanos),
    ))
}

/// Read and decode the image at `path`.
pub fn load(path: &Path, max_visits: usize) -> Result<DecodedStore, CodecError> {
    let bytes = std::fs::read(path).map_err(|source| CodecError::Io {
        path: path.display().to_string(),
        source,
    })?;
    decode(&bytes, max_visits)
}

/// Replace the file at `path` with `bytes` (truncate + write).
pub fn write_image(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, bytes)
}
