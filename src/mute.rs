use crate::backend;

pub trait MuteStateStore {
    fn set_muted(&self, scene: &str, input: &str, muted: bool) -> Result<(), backend::Error>;
}

impl<'a, M: MuteStateStore + ?Sized> MuteStateStore for &'a M {
    fn set_muted(&self, scene: &str, input: &str, muted: bool) -> Result<(), backend::Error> {
        (**self).set_muted(scene, input, muted)
    }
}

impl<M: MuteStateStore + ?Sized> MuteStateStore for std::sync::Arc<M> {
    fn set_muted(&self, scene: &str, input: &str, muted: bool) -> Result<(), backend::Error> {
        (**self).set_muted(scene, input, muted)
    }
}
