// bpnative-model: the reflected class model the nativization backend walks.
// Deserialized from the JSON dump produced by the editor-side exporter; the
// emitter only ever reads this model, it never mutates it.

pub mod schema;
pub mod types;
pub mod registry;
pub mod value;

pub use schema::{
    ClassModel, ClassesFile, EnumCppForm, EnumEntry, EnumModel, EnumsFile, ObjectModel,
    ObjectsFile, PropertyModel, ScsNodeModel, StructModel, StructsFile,
};
pub use types::TypeDesc;
pub use registry::ModelRegistry;

// Flag constants are re-exported so downstream crates need only one import.
pub use bpnative_ue_flags as flags;
