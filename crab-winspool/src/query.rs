//! Two-call buffer queries
//!
//! Spooler calls that return variably sized data are issued twice: once to
//! learn the size, once with a buffer of exactly that size.
//! `ERROR_INSUFFICIENT_BUFFER` on the sizing call is expected and swallowed here.
//! Any other failure aborts the query.

use std::io;

use tracing::debug;

use crate::error::{SpoolError, SpoolResult};
use crate::spooler::is_insufficient_buffer;

/// Query whose OS call reports the required length through an out-parameter.
///
/// `call` receives the buffer and the in/out length (in elements of `T`).
/// The sizing call passes an empty buffer. If the OS reports a required length of
/// zero the result is empty.
pub(crate) fn query_sized<T, F>(call_name: &'static str, mut call: F) -> SpoolResult<Vec<T>>
where
    T: Copy + Default,
    F: FnMut(&mut [T], &mut u32) -> io::Result<()>,
{
    let mut needed: u32 = 0;
    let mut buf: Vec<T> = Vec::new();

    match call(&mut buf, &mut needed) {
        Ok(()) => return Ok(buf),
        Err(e) if is_insufficient_buffer(&e) => {}
        Err(e) => return Err(SpoolError::os(call_name, e)),
    }

    debug!(call = call_name, needed, "sizing call reported size");
    if needed == 0 {
        return Ok(Vec::new());
    }

    buf = vec![T::default(); needed as usize];
    call(&mut buf, &mut needed).map_err(|e| SpoolError::os(call_name, e))?;
    Ok(buf)
}

/// Buffer filled by a counted query
#[derive(Debug, Default)]
pub(crate) struct Counted {
    /// Element count reported by the sizing call
    pub count: usize,
    /// `count * stride` bytes
    pub buf: Vec<u8>,
}

/// Query whose OS call returns an element count when given no buffer, then
/// fills `count * stride` bytes and returns the count again.
///
/// A sizing result of zero or less is "no data". A fill count that differs
/// from the sizing call is [`SpoolError::CountMismatch`].
pub(crate) fn query_counted<F>(call_name: &'static str, stride: usize, mut call: F) -> SpoolResult<Counted>
where
    F: FnMut(Option<&mut [u8]>) -> io::Result<i32>,
{
    let Some(mut counted) = query_count(call_name, stride, &mut call)? else {
        return Ok(Counted::default());
    };

    let filled = call(Some(&mut counted.buf)).map_err(|e| SpoolError::os(call_name, e))?;
    if filled < 0 || filled as usize != counted.count {
        return Err(SpoolError::CountMismatch {
            expected: counted.count,
            actual: filled.max(0) as usize,
        });
    }
    Ok(counted)
}

/// Query whose OS call returns a byte size when given no buffer and a status
/// when filling (`DocumentPropertiesW`).
pub(crate) fn query_bytes<F>(call_name: &'static str, mut call: F) -> SpoolResult<Vec<u8>>
where
    F: FnMut(Option<&mut [u8]>) -> io::Result<i32>,
{
    let Some(mut counted) = query_count(call_name, 1, &mut call)? else {
        return Ok(Vec::new());
    };

    call(Some(&mut counted.buf)).map_err(|e| SpoolError::os(call_name, e))?;
    Ok(counted.buf)
}

fn query_count<F>(call_name: &'static str, stride: usize, call: &mut F) -> SpoolResult<Option<Counted>>
where
    F: FnMut(Option<&mut [u8]>) -> io::Result<i32>,
{
    let count = call(None).map_err(|e| SpoolError::os(call_name, e))?;
    debug!(call = call_name, count, stride, "sizing call reported count");
    if count <= 0 {
        return Ok(None);
    }

    let count = count as usize;
    Ok(Some(Counted {
        count,
        buf: vec![0; count * stride],
    }))
}
