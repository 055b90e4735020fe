/// Lifecycle of the presenter's current binding.
///
/// Idle → Loading → Ready | Failed, and back to Loading on the next
/// coordinate change.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

impl LoadState {
    pub fn is_loading(self) -> bool {
        self == LoadState::Loading
    }
}
