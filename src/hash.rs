//! Field and hash primitives underlying node hashing.
//!
//! The trie commits to its contents with a host-supplied hash over elements
//! of the BN254 scalar field. The hook is installed once per process with
//! [`init_hash_scheme`]; the first installation wins and later installations
//! are silently ignored. Every node-hash computation routes through the hook,
//! so the trie itself stays agnostic to the concrete zk-friendly hash.
//!
//! Two byte orders are in play and every conversion site is explicit about
//! the direction: [`Hash`] stores its field element in little-endian byte
//! order, while the canonical external form ([`Hash::bytes`]) and the
//! [`Byte32`] word type are big-endian.

use crate::errors::Error;

use bitvec::prelude::*;
use core::fmt;
use core::str::FromStr;
use once_cell::sync::OnceCell;

/// A field element of the BN254 scalar field.
pub type Fr = ruint::Uint<256, 4>;

/// Modulus of the BN254 scalar field.
pub const FIELD_MODULUS: Fr = Fr::from_be_bytes([
    0x30, 0x64, 0x4e, 0x72, 0xe1, 0x31, 0xa0, 0x29, 0xb8, 0x50, 0x45, 0xb6, 0x81, 0x81, 0x58,
    0x5d, 0x28, 0x33, 0xe8, 0x48, 0x79, 0xb9, 0x70, 0x91, 0x43, 0xe1, 0xf5, 0x93, 0xf0, 0x00,
    0x00, 0x01,
]);

/// Length of a [`Hash`] in bytes.
pub const HASH_BYTE_LEN: usize = 32;

/// The all-zero hash, denoting both the empty-tree root and an empty child
/// slot.
pub const HASH_ZERO: Hash = Hash([0; HASH_BYTE_LEN]);

/// Whether the given element lies within the field.
pub fn check_in_field(e: &Fr) -> bool {
    *e < FIELD_MODULUS
}

/// The host-supplied hash over field elements.
///
/// Implementations must be deterministic, total on in-field inputs, and
/// reject out-of-field inputs with an error.
pub type HashScheme = Box<dyn Fn(&[Fr]) -> Result<Fr, Error> + Send + Sync>;

static HASH_SCHEME: OnceCell<HashScheme> = OnceCell::new();

/// Install the process-wide hash scheme. The first installation wins;
/// subsequent calls are ignored.
pub fn init_hash_scheme(scheme: HashScheme) {
    let _ = HASH_SCHEME.set(scheme);
}

/// Invoke the installed scheme, validating that its output is in-field.
fn hash_scheme(inputs: &[Fr]) -> Result<Fr, Error> {
    let scheme = HASH_SCHEME.get().ok_or(Error::HashSchemeNotInitialized)?;
    let out = scheme(inputs)?;
    if !check_in_field(&out) {
        return Err(Error::InvalidField);
    }
    Ok(out)
}

/// Reduce two or more field elements to a single hash.
///
/// The first pair is hashed into an accumulator; the remaining elements are
/// pairwise-hashed layer by layer, each layer folding back into the
/// accumulator, so the reduction shape depends only on the element count.
pub fn hash_elems(first: &Fr, second: &Fr, rest: &[Fr]) -> Result<Hash, Error> {
    let base = hash_scheme(&[*first, *second])?;
    match rest.len() {
        0 => Ok(Hash::from_fr(&base)),
        1 => hash_elems(&base, &rest[0], &[]),
        _ => {
            let mut layer = Vec::with_capacity((rest.len() + 1) / 2);
            for pair in rest.chunks(2) {
                layer.push(match pair {
                    [a, b] => hash_scheme(&[*a, *b])?,
                    [a] => *a,
                    // chunks(2) yields only 1- or 2-element slices
                    _ => unreachable!(),
                });
            }
            hash_elems(&base, &layer[0], &layer[1..])
        }
    }
}

/// Hash the value-preimage words of a leaf under the flag-driven scheme.
///
/// Bit `i` of `flags` set means word `i` may exceed the field and is hashed
/// as its two 16-byte halves; cleared means the word is interpreted directly
/// as a big-endian field integer (`InvalidField` if it is not one). Words
/// beyond the 32nd are always interpreted directly.
///
/// Panics if `words` is empty: a leaf carries at least one value word.
pub fn hash_value_words(flags: u32, words: &[Byte32]) -> Result<Hash, Error> {
    assert!(!words.is_empty(), "a value preimage holds at least one word");
    let mut elems = Vec::with_capacity(words.len());
    for (i, word) in words.iter().enumerate() {
        let split = i < 32 && (flags >> i) & 1 == 1;
        if split {
            elems.push(word.hash()?);
        } else {
            let e = word.fr();
            if !check_in_field(&e) {
                return Err(Error::InvalidField);
            }
            elems.push(e);
        }
    }
    if elems.len() < 2 {
        return Ok(Hash::from_fr(&elems[0]));
    }
    hash_elems(&elems[0], &elems[1], &elems[2..])
}

/// Derive the compressed flag word for a value and compute its hash.
///
/// Every word that does not fit the field gets its flag bit set, so the
/// resulting `(flags, value_hash)` pair is valid for any 32-byte content.
pub fn compress_value(words: &[Byte32]) -> Result<(u32, Hash), Error> {
    let mut flags = 0u32;
    for (i, word) in words.iter().enumerate() {
        if i < 32 && !check_in_field(&word.fr()) {
            flags |= 1 << i;
        }
    }
    let value_hash = hash_value_words(flags, words)?;
    Ok((flags, value_hash))
}

/// A 32-byte node hash, stored in little-endian byte order.
///
/// `Display` prints the decimal form truncated to eight characters, the form
/// used by the GraphViz dump; [`Hash::hex`] and [`Hash::bytes`] provide the
/// canonical big-endian external forms.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash([u8; HASH_BYTE_LEN]);

impl Hash {
    /// Interpret a big-endian byte string, swapping the endianness. Input
    /// longer than 32 bytes keeps the low-order 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let bytes = if bytes.len() > HASH_BYTE_LEN {
            &bytes[bytes.len() - HASH_BYTE_LEN..]
        } else {
            bytes
        };
        let mut h = [0u8; HASH_BYTE_LEN];
        for (dst, src) in h.iter_mut().zip(bytes.iter().rev()) {
            *dst = *src;
        }
        Hash(h)
    }

    /// The intended inverse of [`Hash::bytes`]: the input must be exactly 32
    /// bytes long.
    pub fn from_checked_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != HASH_BYTE_LEN {
            return Err(Error::InvalidField);
        }
        Ok(Self::from_bytes(bytes))
    }

    /// Build a hash from a field element.
    pub fn from_fr(e: &Fr) -> Self {
        Hash(e.to_le_bytes())
    }

    /// The stored field element.
    pub fn fr(&self) -> Fr {
        Fr::from_le_bytes(self.0)
    }

    /// The canonical big-endian external form.
    pub fn bytes(&self) -> [u8; HASH_BYTE_LEN] {
        let mut out = self.0;
        out.reverse();
        out
    }

    /// The raw little-endian representation.
    pub fn as_le_bytes(&self) -> &[u8; HASH_BYTE_LEN] {
        &self.0
    }

    /// Construct from raw little-endian bytes.
    pub fn from_le_bytes(bytes: [u8; HASH_BYTE_LEN]) -> Self {
        Hash(bytes)
    }

    /// Hex encoding of the big-endian external form.
    pub fn hex(&self) -> String {
        hex::encode(self.bytes())
    }

    /// Full decimal form of the stored element, the lossless inverse of
    /// [`FromStr`]. `Display` truncates; this does not.
    pub fn to_decimal_string(&self) -> String {
        self.fr().to_string()
    }

    /// Whether this is [`HASH_ZERO`].
    pub fn is_zero(&self) -> bool {
        *self == HASH_ZERO
    }

    /// Bit `i` of the little-endian bit expansion of the stored element.
    /// This is the bit consulted at depth `i` of a path walk.
    pub fn bit(&self, i: usize) -> bool {
        self.0.view_bits::<Lsb0>()[i]
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.to_decimal_string();
        if s.len() < 8 {
            write!(f, "{}", s)
        } else {
            write!(f, "{}...", &s[..8])
        }
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash(0x{})", self.hex())
    }
}

impl FromStr for Hash {
    type Err = Error;

    /// Parse the decimal string form of a hash.
    fn from_str(s: &str) -> Result<Self, Error> {
        let e = Fr::from_str_radix(s, 10).map_err(|_| Error::InvalidField)?;
        Ok(Hash::from_fr(&e))
    }
}

/// A 32-byte big-endian word: the external form of key preimages and stored
/// value words.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct Byte32([u8; 32]);

impl Byte32 {
    /// Build a word from big-endian bytes, left-padding short input with
    /// zeroes. Input longer than 32 bytes keeps the low-order 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let bytes = if bytes.len() > 32 {
            &bytes[bytes.len() - 32..]
        } else {
            bytes
        };
        let mut out = [0u8; 32];
        out[32 - bytes.len()..].copy_from_slice(bytes);
        Byte32(out)
    }

    /// The raw big-endian bytes.
    pub fn bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The word interpreted as a big-endian integer. May exceed the field.
    pub fn fr(&self) -> Fr {
        Fr::from_be_bytes(self.0)
    }

    /// Compound field hash of the two 16-byte halves, usable for words that
    /// may not fit the field.
    pub fn hash(&self) -> Result<Fr, Error> {
        let first = Fr::from_be_slice(&self.0[..16]);
        let second = Fr::from_be_slice(&self.0[16..]);
        hash_scheme(&[first, second])
    }
}

impl From<[u8; 32]> for Byte32 {
    fn from(bytes: [u8; 32]) -> Self {
        Byte32(bytes)
    }
}

impl fmt::Debug for Byte32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Byte32(0x{})", hex::encode(self.0))
    }
}
