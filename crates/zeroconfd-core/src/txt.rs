//! Ordered opaque TXT metadata records.
//!
//! A service resolution result carries zero or more TXT records: opaque
//! byte sequences whose order is significant. Records commonly hold
//! `key=value` pairs but are not required to be UTF-8, so the raw bytes
//! stay authoritative and the key/value accessors are best-effort views.

/// One opaque TXT record. Zero-length records are valid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TxtRecord(Vec<u8>);

impl TxtRecord {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        TxtRecord(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Key part before the first `=` (the whole record if there is no `=`),
    /// if that part is valid UTF-8.
    pub fn key(&self) -> Option<&str> {
        let end = self
            .0
            .iter()
            .position(|&b| b == b'=')
            .unwrap_or(self.0.len());
        std::str::from_utf8(&self.0[..end]).ok()
    }

    /// Bytes after the first `=`, or `None` for a bare key.
    pub fn value(&self) -> Option<&[u8]> {
        self.0
            .iter()
            .position(|&b| b == b'=')
            .map(|pos| &self.0[pos + 1..])
    }
}

impl From<&str> for TxtRecord {
    fn from(s: &str) -> Self {
        TxtRecord(s.as_bytes().to_vec())
    }
}

/// Ordered list of TXT records attached to a service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TxtList(Vec<TxtRecord>);

impl TxtList {
    pub fn new() -> Self {
        TxtList(Vec::new())
    }

    pub fn push(&mut self, record: TxtRecord) {
        self.0.push(record);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TxtRecord> {
        self.0.iter()
    }

    /// Value of the first record whose key matches, or `None`.
    ///
    /// A bare-key record (no `=`) matches with an empty value.
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.0
            .iter()
            .find(|r| r.key() == Some(key))
            .map(|r| r.value().unwrap_or(&[]))
    }
}

impl FromIterator<TxtRecord> for TxtList {
    fn from_iter<I: IntoIterator<Item = TxtRecord>>(iter: I) -> Self {
        TxtList(iter.into_iter().collect())
    }
}

impl IntoIterator for TxtList {
    type Item = TxtRecord;
    type IntoIter = std::vec::IntoIter<TxtRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a TxtList {
    type Item = &'a TxtRecord;
    type IntoIter = std::slice::Iter<'a, TxtRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
