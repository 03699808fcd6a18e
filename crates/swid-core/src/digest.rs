// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Content digests with per-algorithm truncation.
//!
//! Algorithms follow the IANA "Named Information Hash Algorithm" registry. Each
//! algorithm declares a bit length; the digest is the leading `bits / 8` bytes of
//! the underlying hash function's full output. Private algorithms have no backing
//! function and fail with [`TagError::UnsupportedAlgorithm`].

use std::borrow::Cow;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256, Sha384, Sha512};
use sha3::{Sha3_224, Sha3_256, Sha3_384, Sha3_512};
use thiserror::Error;

use crate::error::TagError;
use crate::vocab::{vocabulary, Term, Vocabulary};

const NAMED_INFORMATION: &str = "https://www.iana.org/assignments/named-information";

vocabulary! {
    /// Hash algorithms from the IANA Named Information registry.
    pub enum WellKnownHash ("hash algorithm") {
        /// SHA-256, full length.
        Sha256 = (1, "sha-256"),
        /// SHA-256 truncated to 128 bits.
        Sha256_128 = (2, "sha-256-128"),
        /// SHA-256 truncated to 120 bits.
        Sha256_120 = (3, "sha-256-120"),
        /// SHA-256 truncated to 96 bits.
        Sha256_96 = (4, "sha-256-96"),
        /// SHA-256 truncated to 64 bits.
        Sha256_64 = (5, "sha-256-64"),
        /// SHA-256 truncated to 32 bits.
        Sha256_32 = (6, "sha-256-32"),
        /// SHA-384.
        Sha384 = (7, "sha-384"),
        /// SHA-512.
        Sha512 = (8, "sha-512"),
        /// SHA3-224.
        Sha3_224 = (9, "sha3-224"),
        /// SHA3-256.
        Sha3_256 = (10, "sha3-256"),
        /// SHA3-384.
        Sha3_384 = (11, "sha3-384"),
        /// SHA3-512.
        Sha3_512 = (12, "sha3-512"),
    }
}

/// Underlying hash functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Function {
    Sha256,
    Sha384,
    Sha512,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
}

impl WellKnownHash {
    /// Declared digest length in bits.
    pub fn bit_length(self) -> u32 {
        match self {
            Self::Sha256 | Self::Sha3_256 => 256,
            Self::Sha256_128 => 128,
            Self::Sha256_120 => 120,
            Self::Sha256_96 => 96,
            Self::Sha256_64 => 64,
            Self::Sha256_32 => 32,
            Self::Sha384 | Self::Sha3_384 => 384,
            Self::Sha512 | Self::Sha3_512 => 512,
            Self::Sha3_224 => 224,
        }
    }

    fn function(self) -> Function {
        match self {
            Self::Sha256
            | Self::Sha256_128
            | Self::Sha256_120
            | Self::Sha256_96
            | Self::Sha256_64
            | Self::Sha256_32 => Function::Sha256,
            Self::Sha384 => Function::Sha384,
            Self::Sha512 => Function::Sha512,
            Self::Sha3_224 => Function::Sha3_224,
            Self::Sha3_256 => Function::Sha3_256,
            Self::Sha3_384 => Function::Sha3_384,
            Self::Sha3_512 => Function::Sha3_512,
        }
    }

    /// Namespace URI used for the algorithm's `hash` attribute in XML.
    pub fn xml_namespace(self) -> &'static str {
        match self {
            Self::Sha256 => "http://www.w3.org/2001/04/xmlenc#sha256",
            Self::Sha384 => "http://www.w3.org/2001/04/xmldsig-more#sha384",
            Self::Sha512 => "http://www.w3.org/2001/04/xmlenc#sha512",
            Self::Sha3_224 => "http://www.w3.org/2007/05/xmldsig-more#sha3-224",
            Self::Sha3_256 => "http://www.w3.org/2007/05/xmldsig-more#sha3-256",
            Self::Sha3_384 => "http://www.w3.org/2007/05/xmldsig-more#sha3-384",
            Self::Sha3_512 => "http://www.w3.org/2007/05/xmldsig-more#sha3-512",
            Self::Sha256_128 => "https://www.iana.org/assignments/named-information#sha-256-128",
            Self::Sha256_120 => "https://www.iana.org/assignments/named-information#sha-256-120",
            Self::Sha256_96 => "https://www.iana.org/assignments/named-information#sha-256-96",
            Self::Sha256_64 => "https://www.iana.org/assignments/named-information#sha-256-64",
            Self::Sha256_32 => "https://www.iana.org/assignments/named-information#sha-256-32",
        }
    }

    /// Preferred XML namespace prefix.
    pub fn xml_prefix(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha256_128 => "sha256-128",
            Self::Sha256_120 => "sha256-120",
            Self::Sha256_96 => "sha256-96",
            Self::Sha256_64 => "sha256-64",
            Self::Sha256_32 => "sha256-32",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
            Self::Sha3_224 => "sha3-224",
            Self::Sha3_256 => "sha3-256",
            Self::Sha3_384 => "sha3-384",
            Self::Sha3_512 => "sha3-512",
        }
    }

    /// Finds the algorithm whose XML namespace is `uri`.
    pub fn from_xml_namespace(uri: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|alg| alg.xml_namespace() == uri)
    }
}

/// Hash algorithm: well-known or private.
pub type HashAlgorithm = Term<WellKnownHash>;

impl Term<WellKnownHash> {
    /// Declared bit length; `None` for private algorithms.
    pub fn bit_length(&self) -> Option<u32> {
        self.known().map(WellKnownHash::bit_length)
    }

    /// Namespace URI for the XML `hash` attribute.
    ///
    /// Private algorithms live under the named-information registry URI.
    pub fn xml_namespace(&self) -> Cow<'_, str> {
        match self {
            Self::Known(known) => Cow::Borrowed(known.xml_namespace()),
            Self::Private { name, .. } => Cow::Owned(format!("{NAMED_INFORMATION}#{name}")),
        }
    }

    /// Preferred XML namespace prefix.
    pub fn xml_prefix(&self) -> Cow<'_, str> {
        match self {
            Self::Known(known) => Cow::Borrowed(known.xml_prefix()),
            Self::Private { name, .. } => {
                let cleaned: String = name
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
                    .collect();
                Cow::Owned(format!("ni-{cleaned}"))
            }
        }
    }

    /// Resolves an XML namespace URI back to an algorithm name.
    ///
    /// Returns the private name for URIs under the named-information registry.
    pub fn name_for_xml_namespace(uri: &str) -> Option<Cow<'_, str>> {
        if let Some(known) = WellKnownHash::from_xml_namespace(uri) {
            return Some(Cow::Borrowed(known.name()));
        }
        uri.strip_prefix(NAMED_INFORMATION)
            .and_then(|rest| rest.strip_prefix('#'))
            .filter(|name| !name.is_empty())
            .map(Cow::Borrowed)
    }

    /// Digests `source` and truncates to the declared bit length.
    ///
    /// Reads the source to the end. The leading bytes of the full-length digest are
    /// kept.
    pub fn digest<R: Read>(&self, source: R) -> Result<Vec<u8>, TagError> {
        let Some(known) = self.known() else {
            return Err(TagError::UnsupportedAlgorithm(self.name().to_owned()));
        };
        let mut full = match known.function() {
            Function::Sha256 => full_digest::<Sha256, _>(source)?,
            Function::Sha384 => full_digest::<Sha384, _>(source)?,
            Function::Sha512 => full_digest::<Sha512, _>(source)?,
            Function::Sha3_224 => full_digest::<Sha3_224, _>(source)?,
            Function::Sha3_256 => full_digest::<Sha3_256, _>(source)?,
            Function::Sha3_384 => full_digest::<Sha3_384, _>(source)?,
            Function::Sha3_512 => full_digest::<Sha3_512, _>(source)?,
        };
        full.truncate((known.bit_length() / 8) as usize);
        Ok(full)
    }

    /// Digests the file at `path`.
    pub fn digest_file(&self, path: &Path) -> Result<Vec<u8>, TagError> {
        let file = std::fs::File::open(path)?;
        self.digest(std::io::BufReader::new(file))
    }
}

fn full_digest<D: Digest, R: Read>(mut source: R) -> std::io::Result<Vec<u8>> {
    let mut hasher = D::new();
    let mut buf = [0u8; 8192];
    loop {
        let read = source.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(hasher.finalize().to_vec())
}

/// Errors from parsing textual digest forms.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigestParseError {
    /// The input held no digest bytes.
    #[error("digest is empty")]
    Empty,
    /// The input was not valid hexadecimal.
    #[error("invalid hex digest: {0}")]
    InvalidHex(String),
    /// An element of a decimal list was not a byte value.
    #[error("invalid byte value `{0}` in decimal digest list")]
    InvalidDecimal(String),
}

/// Renders a digest as lowercase hex.
pub fn digest_to_hex(digest: &[u8]) -> String {
    hex::encode(digest)
}

/// Parses a hex digest (either case).
pub fn digest_from_hex(text: &str) -> Result<Vec<u8>, DigestParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DigestParseError::Empty);
    }
    hex::decode(text).map_err(|e| DigestParseError::InvalidHex(e.to_string()))
}

/// Renders a digest as a decimal byte list, e.g. `[1, 2, 255]`.
pub fn digest_to_decimal_list(digest: &[u8]) -> String {
    let parts: Vec<String> = digest.iter().map(u8::to_string).collect();
    format!("[{}]", parts.join(", "))
}

/// Parses a decimal byte list such as `[1, 2, 255]`.
///
/// Brackets are optional. Signed byte values (`-128..=-1`) are accepted and
/// reinterpreted as their unsigned two's-complement value.
pub fn digest_from_decimal_list(text: &str) -> Result<Vec<u8>, DigestParseError> {
    let inner = text.trim();
    let inner = inner.strip_prefix('[').unwrap_or(inner);
    let inner = inner.strip_suffix(']').unwrap_or(inner);
    if inner.trim().is_empty() {
        return Err(DigestParseError::Empty);
    }
    inner
        .split(',')
        .map(|part| {
            let part = part.trim();
            let value: i16 = part
                .parse()
                .map_err(|_| DigestParseError::InvalidDecimal(part.to_owned()))?;
            u8::try_from(value)
                .or_else(|_| i8::try_from(value).map(i8::cast_unsigned))
                .map_err(|_| DigestParseError::InvalidDecimal(part.to_owned()))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn sha256_matches_known_vector() {
        let alg = HashAlgorithm::from(WellKnownHash::Sha256);
        let digest = alg.digest(&b"abc"[..]).unwrap();
        assert_eq!(digest_to_hex(&digest), ABC_SHA256);
    }

    #[test]
    fn truncation_keeps_leading_bytes() {
        let full = HashAlgorithm::from(WellKnownHash::Sha256)
            .digest(&b"abc"[..])
            .unwrap();
        for (alg, len) in [
            (WellKnownHash::Sha256_128, 16),
            (WellKnownHash::Sha256_120, 15),
            (WellKnownHash::Sha256_96, 12),
            (WellKnownHash::Sha256_64, 8),
            (WellKnownHash::Sha256_32, 4),
        ] {
            let short = HashAlgorithm::from(alg).digest(&b"abc"[..]).unwrap();
            assert_eq!(short.len(), len, "{alg}");
            assert_eq!(short[..], full[..len], "{alg}");
        }
    }

    #[test]
    fn every_known_algorithm_yields_its_bit_length() {
        for alg in WellKnownHash::ALL {
            let digest = HashAlgorithm::from(*alg).digest(&b"payload"[..]).unwrap();
            assert_eq!(digest.len() * 8, alg.bit_length() as usize, "{alg}");
        }
    }

    #[test]
    fn private_algorithm_is_unsupported() {
        let alg = HashAlgorithm::named("whirlpool");
        let err = alg.digest(&b"abc"[..]).unwrap_err();
        assert!(matches!(err, TagError::UnsupportedAlgorithm(name) if name == "whirlpool"));
    }

    #[test]
    fn xml_namespaces_round_trip() {
        for alg in WellKnownHash::ALL {
            assert_eq!(WellKnownHash::from_xml_namespace(alg.xml_namespace()), Some(*alg));
        }
        let private = HashAlgorithm::named("k12");
        let uri = private.xml_namespace().into_owned();
        assert_eq!(
            HashAlgorithm::name_for_xml_namespace(&uri).as_deref(),
            Some("k12")
        );
        assert_eq!(private.xml_prefix(), "ni-k12");
    }

    #[test]
    fn hex_forms() {
        assert_eq!(digest_to_hex(&[0x0a, 0xff]), "0aff");
        assert_eq!(digest_from_hex("0AFF").unwrap(), vec![0x0a, 0xff]);
        assert_eq!(digest_from_hex(""), Err(DigestParseError::Empty));
        assert!(matches!(
            digest_from_hex("xyz"),
            Err(DigestParseError::InvalidHex(_))
        ));
    }

    #[test]
    fn decimal_list_forms() {
        assert_eq!(digest_to_decimal_list(&[1, 2, 255]), "[1, 2, 255]");
        assert_eq!(digest_from_decimal_list("[1, 2, 255]").unwrap(), vec![1, 2, 255]);
        assert_eq!(digest_from_decimal_list("1,2,-1").unwrap(), vec![1, 2, 255]);
        assert_eq!(digest_from_decimal_list("[]"), Err(DigestParseError::Empty));
        assert_eq!(
            digest_from_decimal_list("[1, 256]"),
            Err(DigestParseError::InvalidDecimal("256".into()))
        );
    }

    #[test]
    fn signed_bytes_cover_the_full_range() {
        assert_eq!(digest_from_decimal_list("[-128, 127, 128, 0]").unwrap(), vec![128, 127, 128, 0]);
        assert_eq!(
            digest_from_decimal_list("[-129]"),
            Err(DigestParseError::InvalidDecimal("-129".into()))
        );
    }
}
