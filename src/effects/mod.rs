pub(crate) mod kenburns;
pub(crate) mod transitions;
