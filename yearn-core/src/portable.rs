//! Strings that cross the libretro boundary.
//!
//! Cores hand us `const char *` with no guarantees, and we hand cores
//! pointers that must stay valid for as long as the owner lives. Both types
//! here hold text that is valid UTF-8 *and* free of interior nul bytes, so it
//! can be used from either side without re-checking.

use std::ffi::{CStr, OsStr, OsString};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors on creating a PString
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PStringError {
    #[error("nul byte in string")]
    Nul,
    #[error("non-utf8 string")]
    Utf8,
    #[error("null string pointer")]
    Null,
}

fn check_text(s: &[u8]) -> Result<&str, PStringError> {
    if s.contains(&0) {
        return Err(PStringError::Nul);
    }
    std::str::from_utf8(s).map_err(|_| PStringError::Utf8)
}

/// Borrowed view of a core owned C string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PStr<'a> {
    inner: &'a str,
}

impl<'a> PStr<'a> {
    /// # Safety
    ///
    /// `c` must be null or satisfy the requirements of `CStr::from_ptr()`,
    /// and the string must outlive `'a`.
    pub unsafe fn from_ptr(c: *const std::os::raw::c_char) -> Result<PStr<'a>, PStringError> {
        if c.is_null() {
            return Err(PStringError::Null);
        }
        let inner = CStr::from_ptr(c)
            .to_str()
            .map_err(|_| PStringError::Utf8)?;
        Ok(PStr { inner })
    }

    /// Like `from_ptr`, but a null pointer is `None` rather than an error.
    ///
    /// # Safety
    ///
    /// See `from_ptr`.
    pub unsafe fn from_ptr_opt(
        c: *const std::os::raw::c_char,
    ) -> Result<Option<PStr<'a>>, PStringError> {
        if c.is_null() {
            Ok(None)
        } else {
            Self::from_ptr(c).map(Some)
        }
    }

    pub fn as_str(&self) -> &'a str {
        self.inner
    }

    pub fn split_once(&self, delimiter: &str) -> Option<(PStr<'a>, PStr<'a>)> {
        self.inner
            .split_once(delimiter)
            .map(|(a, b)| (PStr { inner: a }, PStr { inner: b }))
    }

    // Sub-slices of checked text are still checked
    pub fn split(&self, pattern: char) -> impl Iterator<Item = PStr<'a>> {
        self.inner.split(pattern).map(|inner| PStr { inner })
    }
}

impl<'a> TryFrom<&'a str> for PStr<'a> {
    type Error = PStringError;

    fn try_from(s: &'a str) -> Result<Self, Self::Error> {
        let inner = check_text(s.as_bytes())?;
        Ok(PStr { inner })
    }
}

impl<'a> TryFrom<&'a OsStr> for PStr<'a> {
    type Error = PStringError;

    fn try_from(s: &'a OsStr) -> Result<Self, Self::Error> {
        let st = s.to_str().ok_or(PStringError::Utf8)?;
        st.try_into()
    }
}

impl std::fmt::Display for PStr<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.inner)
    }
}

impl From<PStr<'_>> for String {
    fn from(p: PStr) -> Self {
        String::from(p.inner)
    }
}

impl From<&PStr<'_>> for String {
    fn from(p: &PStr) -> Self {
        String::from(p.inner)
    }
}

/// Owned, nul terminated string that can be handed to a core.
///
/// The pointer from `as_ptr` stays valid until the `PString` is dropped or
/// replaced.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PString {
    // Always ends in exactly one 0
    data: Vec<u8>,
}

impl PString {
    pub fn empty() -> PString {
        PString { data: vec![0] }
    }

    /// # Safety
    ///
    /// This function is unsafe for the same reasons as `CStr::from_ptr()`.
    pub unsafe fn from_ptr(c: *const std::os::raw::c_char) -> Result<PString, PStringError> {
        Ok((&PStr::from_ptr(c)?).into())
    }

    pub fn from_path(p: &Path) -> Result<PString, PStringError> {
        p.as_os_str().to_owned().try_into()
    }

    pub fn to_str(&self) -> &str {
        // Checked on creation of string
        unsafe { std::str::from_utf8_unchecked(&self.data[..self.data.len() - 1]) }
    }

    pub fn as_c_str(&self) -> &CStr {
        // Checked on creation of string
        unsafe { CStr::from_bytes_with_nul_unchecked(&self.data) }
    }

    pub fn as_ptr(&self) -> *const std::os::raw::c_char {
        self.as_c_str().as_ptr()
    }

    pub fn is_empty(&self) -> bool {
        self.data.len() == 1
    }
}

impl std::fmt::Debug for PString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{:?}", self.to_str())
    }
}

impl std::fmt::Display for PString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for PString {
    type Err = PStringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        check_text(s.as_bytes())?;
        let mut data = Vec::with_capacity(s.len() + 1);
        data.extend_from_slice(s.as_bytes());
        data.push(0);
        Ok(PString { data })
    }
}

impl From<PString> for String {
    fn from(mut s: PString) -> Self {
        s.data.pop();
        // Checked on creation of string
        unsafe { String::from_utf8_unchecked(s.data) }
    }
}

impl From<&PStr<'_>> for PString {
    fn from(s: &PStr) -> Self {
        let mut data = s.inner.as_bytes().to_vec();
        data.push(0);
        PString { data }
    }
}

impl From<PStr<'_>> for PString {
    fn from(s: PStr) -> Self {
        (&s).into()
    }
}

impl TryFrom<&CStr> for PString {
    type Error = PStringError;

    fn try_from(s: &CStr) -> Result<Self, Self::Error> {
        let text = s.to_str().map_err(|_| PStringError::Utf8)?;
        PString::from_str(text)
    }
}

impl TryFrom<OsString> for PString {
    type Error = PStringError;

    fn try_from(s: OsString) -> Result<Self, Self::Error> {
        let text = s.into_string().map_err(|_| PStringError::Utf8)?;
        PString::from_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::{PStr, PString, PStringError};
    use std::ffi::CStr;
    use std::str::FromStr;

    #[test]
    fn valid_string() {
        let s = PString::from_str("valid string");
        assert!(s.is_ok());
    }

    #[test]
    fn invalid_string_nul() {
        let s = PString::from_str("invalid\0 string");
        assert_eq!(s, Err(PStringError::Nul));
    }

    #[test]
    fn invalid_string_nul_end() {
        let s = PString::from_str("invalid string\0");
        assert_eq!(s, Err(PStringError::Nul));
    }

    #[test]
    fn invalid_string_non_utf8() {
        let bytes = vec![0xc3, 0x28, 0x00];
        let c = CStr::from_bytes_with_nul(&bytes).unwrap();

        let s: Result<PString, PStringError> = c.try_into();
        assert_eq!(s, Err(PStringError::Utf8));
    }

    #[test]
    fn pointer_round_trip() {
        let p = PString::from_str("mgba").unwrap();
        let back = unsafe { PStr::from_ptr(p.as_ptr()) }.unwrap();
        assert_eq!(back.as_str(), "mgba");
        assert_eq!(String::from(p), "mgba");
    }

    #[test]
    fn null_pointer() {
        let s = unsafe { PStr::from_ptr(std::ptr::null()) };
        assert_eq!(s, Err(PStringError::Null));
        let s = unsafe { PStr::from_ptr_opt(std::ptr::null()) };
        assert_eq!(s, Ok(None));
    }

    #[test]
    fn empty_is_nul_terminated() {
        let e = PString::empty();
        assert!(e.is_empty());
        assert_eq!(e.as_c_str().to_bytes_with_nul(), &[0]);
    }

    #[test]
    fn split_keeps_checked_text() {
        let s = PStr::try_from("Palette; default|gbc|sgb").unwrap();
        let (desc, values) = s.split_once("; ").unwrap();
        assert_eq!(desc.as_str(), "Palette");
        let v: Vec<&str> = values.split('|').map(|p| p.as_str()).collect();
        assert_eq!(v, vec!["default", "gbc", "sgb"]);
    }
}
