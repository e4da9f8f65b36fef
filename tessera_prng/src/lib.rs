// Deterministic, portable pseudo-random number generator seeded from strings.
//
// Implements the xmur3 string hash (used only for seeding) feeding the sfc32
// "small fast chaotic" generator. Both operate purely on wrapping `u32`
// arithmetic, so output matches the JavaScript reference bit for bit:
// `Math.imul` is `wrapping_mul`, `>>> 0` is a no-op on `u32`, and string
// length/characters are measured in UTF-16 code units like `charCodeAt`.
//
// This crate is the single PRNG used across Tessera: `tessera_engine` builds
// one `SeededRng` per generation from `"{seed}-{generation}"`, and the
// timecode generator maps its floats onto a base32 alphabet.
//
// **Critical constraint: determinism.** The same seed string must produce the
// same output on every platform and build profile. Floats appear only at the
// very end (`next_f64`), as an exact division of a `u32` by 2^32.

use serde::{Deserialize, Serialize};

/// 2^32 as an `f64`, the divisor that maps a `u32` into `[0, 1)`.
const TWO_POW_32: f64 = 4_294_967_296.0;

/// xmur3 string hash. Expands one string into any number of `u32` seed words.
///
/// The constructor folds every UTF-16 code unit of the seed into a single
/// 32-bit accumulator. Each `next_u32` call then runs a further avalanche
/// step over the accumulator and returns it, so consecutive calls yield
/// independent-looking words from the same string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedHash {
    h: u32,
}

impl SeedHash {
    pub fn new(seed: &str) -> Self {
        let units: Vec<u16> = seed.encode_utf16().collect();
        let mut h = 1_779_033_703u32 ^ units.len() as u32;
        for unit in units {
            h = (h ^ u32::from(unit)).wrapping_mul(3_432_918_353);
            h = h.rotate_left(13);
        }
        Self { h }
    }

    /// Run one avalanche step and return the resulting seed word.
    pub fn next_u32(&mut self) -> u32 {
        let mut h = self.h;
        h = (h ^ (h >> 16)).wrapping_mul(2_246_822_507);
        h = (h ^ (h >> 13)).wrapping_mul(3_266_489_909);
        h ^= h >> 16;
        self.h = h;
        h
    }
}

/// sfc32 PRNG, the per-generation source of randomness.
///
/// Four 32-bit state words combined each step with add, xor, shift and a
/// rotate-left by 21 (equivalently the `<< 21 | >>> 11` pair). A counter word
/// `d` guarantees a minimum period of 2^32.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeededRng {
    s: [u32; 4],
}

impl SeededRng {
    /// Create a new PRNG from a string seed.
    ///
    /// Draws four words from a `SeedHash` of `seed` as the `(a, b, c, d)`
    /// state. Any string is valid, including the empty string.
    pub fn from_seed(seed: &str) -> Self {
        let mut hash = SeedHash::new(seed);
        Self {
            s: [
                hash.next_u32(),
                hash.next_u32(),
                hash.next_u32(),
                hash.next_u32(),
            ],
        }
    }

    /// Create a PRNG directly from raw state words.
    pub fn from_state(state: [u32; 4]) -> Self {
        Self { s: state }
    }

    /// Current raw state words.
    pub fn state(&self) -> [u32; 4] {
        self.s
    }

    /// Generate the next `u32` in the sequence.
    pub fn next_u32(&mut self) -> u32 {
        let [a, b, c, d] = self.s;

        let t = a.wrapping_add(b);
        let a = b ^ (b >> 9);
        let b = c.wrapping_add(c << 3);
        let c = c.rotate_left(21);
        let d = d.wrapping_add(1);
        let t = t.wrapping_add(d);
        let c = c.wrapping_add(t);

        self.s = [a, b, c, d];
        t
    }

    /// Generate a uniform `f64` in [0, 1).
    ///
    /// Exactly `next_u32() / 2^32`: every output is a multiple of 2^-32 and
    /// the largest possible value is `1 - 2^-32`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / TWO_POW_32
    }

    /// Generate a uniform random `usize` in `[low, high)` from a single draw.
    ///
    /// Scales one `next_f64` by the range width and floors it, which is how
    /// consumers index into tables (e.g. the timecode alphabet). Slight bias
    /// for ranges that do not divide 2^32 is accepted for compatibility.
    /// Panics if `low >= high`.
    pub fn range_usize(&mut self, low: usize, high: usize) -> usize {
        assert!(low < high, "range_usize: low must be less than high");
        let width = high - low;
        let offset = (self.next_f64() * width as f64) as usize;
        low + offset.min(width - 1)
    }

    /// Pick one element uniformly. Returns `None` for an empty slice without
    /// consuming a draw.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.range_usize(0, items.len()))
    }

    /// Fill `out` with successive `next_f64` values.
    pub fn fill_f64(&mut self, out: &mut [f64]) {
        for slot in out {
            *slot = self.next_f64();
        }
    }
}
