// CV core: the typed record schema, the tolerant JSON codec, the accumulating
// validator, and the nested-collection editing operations the session exposes.

pub mod codec;
pub mod collections;
pub mod handlers;
pub mod models;
pub mod validation;
