use std::fmt;
use std::ops::{Add, AddAssign};

/// A 32-bit sequence number. Arithmetic wraps at 2^32 and ordering follows
/// serial-number comparison (RFC 1982), so `u32::MAX` comes before `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Wrap32 {
    value: u32,
}

impl Wrap32 {
    pub fn new(value: u32) -> Self {
        Wrap32 { value }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// Is `self` strictly later than `other` in sequence space?
    pub fn is_after(&self, other: Wrap32) -> bool {
        (self.value.wrapping_sub(other.value) as i32) > 0
    }

    /// The later of the two sequence numbers.
    pub fn later(self, other: Wrap32) -> Wrap32 {
        if other.is_after(self) {
            other
        } else {
            self
        }
    }
}

impl Add for Wrap32 {
    type Output = Wrap32;

    fn add(self, other: Wrap32) -> Wrap32 {
        Wrap32::new(self.value.wrapping_add(other.value))
    }
}

impl Add<u32> for Wrap32 {
    type Output = Wrap32;

    fn add(self, n: u32) -> Wrap32 {
        Wrap32::new(self.value.wrapping_add(n))
    }
}

impl AddAssign<u32> for Wrap32 {
    fn add_assign(&mut self, n: u32) {
        self.value = self.value.wrapping_add(n);
    }
}

impl fmt::Display for Wrap32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

// -- Unit tests --
