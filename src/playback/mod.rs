pub(crate) mod lifecycle;
pub(crate) mod opts;
pub(crate) mod player;
pub(crate) mod scheduler;
pub(crate) mod triggers;
