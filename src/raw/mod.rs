mod arena;
mod handle;
mod node;
mod raw_index;

pub(crate) use handle::Handle;
pub(crate) use raw_index::RawIndex;
