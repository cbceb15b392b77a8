//! Stack - Thread execution stack with an overflow fencepost
//!
//! The lowest word of every stack holds [`STACK_FENCEPOST`]. Stacks grow
//! down, so a thread that ran past its limit has overwritten it.

use alloc::vec;
use alloc::boxed::Box;

/// Default stack size in words
pub const DEFAULT_STACK_WORDS: usize = 1024;

/// Magic word guarding the stack limit
pub const STACK_FENCEPOST: u64 = 0x0ded_beef;

/// Thread stack
pub struct ThreadStack {
    /// Word 0 is the limit, the top is the highest index
    words: Box<[u64]>,
}

impl ThreadStack {
    /// Allocate a stack of `words` words (at least one, for the fencepost)
    pub fn new(words: usize) -> Self {
        let mut words = vec![0u64; words.max(1)].into_boxed_slice();
        words[0] = STACK_FENCEPOST;
        Self { words }
    }

    /// Stack size in words
    pub fn size(&self) -> usize {
        self.words.len()
    }

    /// Has the fencepost survived?
    pub fn check_overflow(&self) -> bool {
        self.words[0] == STACK_FENCEPOST
    }

    /// Raw words, for the platform binding that builds initial frames
    pub fn words_mut(&mut self) -> &mut [u64] {
        &mut self.words
    }
}

impl Default for ThreadStack {
    fn default() -> Self {
        Self::new(DEFAULT_STACK_WORDS)
    }
}

impl core::fmt::Debug for ThreadStack {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ThreadStack")
            .field("size", &self.words.len())
            .field("intact", &self.check_overflow())
            .finish()
    }
}
