use rand::Rng;

/// Chooses one of `len` candidate replies.
pub trait ReplyPicker: Send + Sync {
    fn pick(&self, len: usize) -> usize;
}

/// Uniform choice backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPicker;

impl ReplyPicker for RandomPicker {
    fn pick(&self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        rand::thread_rng().gen_range(0..len)
    }
}

/// Always picks the same index. Used by tests to pin the reply.
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedPicker(pub usize);

#[cfg(test)]
impl ReplyPicker for FixedPicker {
    fn pick(&self, _len: usize) -> usize {
        self.0
    }
}
