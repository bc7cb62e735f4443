//! Canonical, deterministic byte encoding of the signed license fields.
//!
//! Layout (big-endian, fixed order, no signature):
//! ```text
//! "LIC1" | version u32 | uid str | type str | issue_ms i64 | expiry_ms i64
//!        | issued_to str | issuer str | max_nodes u32
//! ```
//! where `str` is a `u32` byte length followed by UTF-8 bytes.

use crate::license::{License, LicenseType, VERSION_CURRENT, VERSION_START};
use crate::LicenseError;
use chrono::{DateTime, Utc};

/// Leading bytes of every canonical license encoding.
pub const MAGIC: &[u8; 4] = b"LIC1";

/// Encode the non-signature fields of a license.
///
/// Equal licenses always produce identical bytes.
pub fn encode(license: &License) -> Vec<u8> {
    let mut out = Vec::with_capacity(64 + license.uid().len() + license.issued_to().len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&license.version().to_be_bytes());
    put_str(&mut out, license.uid());
    put_str(&mut out, license.license_type().as_str());
    out.extend_from_slice(&license.issue_date().timestamp_millis().to_be_bytes());
    out.extend_from_slice(&license.expiry_date().timestamp_millis().to_be_bytes());
    put_str(&mut out, license.issued_to());
    put_str(&mut out, license.issuer());
    out.extend_from_slice(&license.max_nodes().to_be_bytes());
    out
}

/// Decode canonical bytes into an unsigned license.
///
/// # Errors
/// `MalformedLicense` on bad magic, truncation, trailing bytes, invalid
/// UTF-8, unknown type, out-of-range dates, or an unsupported version.
pub fn decode(bytes: &[u8]) -> Result<License, LicenseError> {
    let mut reader = Reader { bytes, pos: 0 };

    if reader.take(MAGIC.len())? != MAGIC {
        return Err(malformed("bad magic"));
    }

    let version = reader.u32()?;
    if !(VERSION_START..=VERSION_CURRENT).contains(&version) {
        return Err(malformed(&format!("unsupported version {}", version)));
    }

    let uid = reader.string()?;
    let license_type: LicenseType = reader.string()?.parse()?;
    let issue_date = millis_to_datetime(reader.i64()?)?;
    let expiry_date = millis_to_datetime(reader.i64()?)?;
    let issued_to = reader.string()?;
    let issuer = reader.string()?;
    let max_nodes = reader.u32()?;

    if reader.pos != bytes.len() {
        return Err(malformed(&format!(
            "{} trailing bytes",
            bytes.len() - reader.pos
        )));
    }

    Ok(License::from_parts(
        uid,
        license_type,
        version,
        issue_date,
        expiry_date,
        issued_to,
        issuer,
        max_nodes,
    ))
}

fn put_str(out: &mut Vec<u8>, s: &str) {
    // Field values are short; lengths beyond u32 are not representable.
    out.extend_from_slice(&(s.len() as u32).to_be_bytes());
    out.extend_from_slice(s.as_bytes());
}

fn millis_to_datetime(millis: i64) -> Result<DateTime<Utc>, LicenseError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| malformed(&format!("date out of range: {}", millis)))
}

fn malformed(detail: &str) -> LicenseError {
    LicenseError::MalformedLicense(detail.to_string())
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], LicenseError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| malformed("truncated input"))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], LicenseError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    fn u32(&mut self) -> Result<u32, LicenseError> {
        Ok(u32::from_be_bytes(self.array()?))
    }

    fn i64(&mut self) -> Result<i64, LicenseError> {
        Ok(i64::from_be_bytes(self.array()?))
    }

    fn string(&mut self) -> Result<String, LicenseError> {
        let len = self.u32()? as usize;
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec()).map_err(|_| malformed("invalid UTF-8 in string field"))
    }
}
