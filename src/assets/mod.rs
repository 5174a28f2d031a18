pub(crate) mod loader;
pub(crate) mod preload;
pub(crate) mod retry;
pub(crate) mod scripted;
pub(crate) mod warm;
