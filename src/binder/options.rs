/// Options threaded through every recursive bind call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinderOptions {
    /// Also read and write members whose accessors are not public.
    pub bind_non_public_members: bool,
}

impl BinderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_non_public_members(mut self, enabled: bool) -> Self {
        self.bind_non_public_members = enabled;
        self
    }
}
