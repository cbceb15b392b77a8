//! Interrupt gate
//!
//! On a uniprocessor, turning interrupts off is what gives the scheduler
//! mutual exclusion. Locks cannot be used here: waiting on a busy lock would
//! call back into the scheduler.

use core::fmt;

/// Interrupt level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntStatus {
    /// Interrupts disabled, scheduler state may be touched
    IntOff,
    /// Interrupts enabled
    IntOn,
}

impl fmt::Display for IntStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::IntOff => write!(f, "off"),
            Self::IntOn => write!(f, "on"),
        }
    }
}

/// Software view of the interrupt-enable flag
///
/// The platform binding mirrors every change here onto the real hardware
/// flag; the scheduler only reads and writes this value.
#[derive(Debug)]
pub struct InterruptGate {
    level: IntStatus,
}

impl InterruptGate {
    pub const fn new(level: IntStatus) -> Self {
        Self { level }
    }

    /// Current level
    pub fn level(&self) -> IntStatus {
        self.level
    }

    /// Is the gate held (interrupts off)?
    pub fn is_held(&self) -> bool {
        self.level == IntStatus::IntOff
    }

    /// Change level, returning the previous one
    pub fn set_level(&mut self, level: IntStatus) -> IntStatus {
        core::mem::replace(&mut self.level, level)
    }

    /// Disable interrupts, returning the previous level for restore
    pub fn disable(&mut self) -> IntStatus {
        self.set_level(IntStatus::IntOff)
    }
}

impl Default for InterruptGate {
    fn default() -> Self {
        Self::new(IntStatus::IntOn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_level_returns_previous() {
        let mut gate = InterruptGate::default();
        assert!(!gate.is_held());
        assert_eq!(gate.disable(), IntStatus::IntOn);
        assert!(gate.is_held());
        assert_eq!(gate.set_level(IntStatus::IntOn), IntStatus::IntOff);
        assert_eq!(gate.level(), IntStatus::IntOn);
    }
}
