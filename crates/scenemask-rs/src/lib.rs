pub mod codec;
pub mod error;
pub mod extract;
pub mod mask;
pub mod table;
pub mod types;
pub mod viz;

pub use error::{Error, Result};
pub use extract::{extract_from_planes, extract_scene, LabelPlanes};
pub use table::IdentityTable;
pub use types::{ObjectRecord, PartMask, PassEntry, Rle, SceneMasks};
