//! CLI command implementations.

mod connection;
pub(crate) mod convert;
pub(crate) mod import;
pub(crate) mod publish;

pub(crate) use convert::ConvertArgs;
pub(crate) use import::ImportArgs;
pub(crate) use publish::PublishArgs;
