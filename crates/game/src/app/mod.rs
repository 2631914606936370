pub(crate) mod bootstrap;
pub(crate) mod context;
pub(crate) mod flow;
pub(crate) mod loop_runner;
