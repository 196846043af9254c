//! Built-in function ABI exposed to generated code (§6): `print`, `println`,
//! `exit`. Intentionally narrow and `unsafe`-isolated — this is not a
//! language front-end, just the raw-pointer convention generated code links
//! against.
//!
//! String representation: a pointer to UTF-8 bytes, preceded 8 bytes
//! earlier by a 64-bit little-endian length, matching the layout produced
//! by the accompanying codegen's string literal stubs.

// Layer 1: Standard library imports
use std::io::Write;

const LENGTH_PREFIX_BYTES: usize = 8;

/// Reads the length-prefixed UTF-8 string at `str_ptr`.
///
/// # Safety
///
/// `str_ptr` must point to a valid, live UTF-8 byte sequence whose length
/// in bytes is stored as a little-endian `u64` at `str_ptr - 8`, and the
/// full `[str_ptr - 8, str_ptr + len)` range must be readable for the
/// duration of the call.
unsafe fn read_prefixed_str<'a>(str_ptr: *const u8) -> Result<&'a str, std::str::Utf8Error> {
    let len_ptr = str_ptr.sub(LENGTH_PREFIX_BYTES);
    let mut len_bytes = [0u8; LENGTH_PREFIX_BYTES];
    std::ptr::copy_nonoverlapping(len_ptr, len_bytes.as_mut_ptr(), LENGTH_PREFIX_BYTES);
    let len = u64::from_le_bytes(len_bytes) as usize;
    let bytes = std::slice::from_raw_parts(str_ptr, len);
    std::str::from_utf8(bytes)
}

/// `print(str)`: writes the string to stdout without a trailing newline.
///
/// # Safety
///
/// See [`read_prefixed_str`].
pub unsafe fn emberlang_print(str_ptr: *const u8) {
    match read_prefixed_str(str_ptr) {
        Ok(s) => {
            let _ = std::io::stdout().write_all(s.as_bytes());
        }
        Err(err) => {
            tracing::error!(%err, "print: invalid UTF-8 in ABI string argument");
        }
    }
}

/// `println(str)`: writes the string to stdout followed by a newline.
///
/// # Safety
///
/// See [`read_prefixed_str`].
pub unsafe fn emberlang_println(str_ptr: *const u8) {
    match read_prefixed_str(str_ptr) {
        Ok(s) => {
            let mut stdout = std::io::stdout();
            let _ = stdout.write_all(s.as_bytes());
            let _ = stdout.write_all(b"\n");
        }
        Err(err) => {
            tracing::error!(%err, "println: invalid UTF-8 in ABI string argument");
        }
    }
}

/// `exit(code)`: terminates the process immediately. Flushes stdout first
/// so buffered `print` output is not lost.
pub fn emberlang_exit(code: i32) -> ! {
    let _ = std::io::stdout().flush();
    std::process::exit(code)
}
