// Serde types for the exporter JSON dump: classes, structs, enums, and the
// object arena. Field names match the exporter's output keys.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::types::TypeDesc;

/// Top level of `classes.json`.
#[derive(Debug, Deserialize)]
pub struct ClassesFile {
    pub classes: Vec<ClassModel>,
}

/// Top level of `structs.json`.
#[derive(Debug, Deserialize)]
pub struct StructsFile {
    pub structs: Vec<StructModel>,
}

/// Top level of `enums.json`.
#[derive(Debug, Deserialize)]
pub struct EnumsFile {
    pub enums: Vec<EnumModel>,
}

/// Top level of `objects.json`.
#[derive(Debug, Deserialize)]
pub struct ObjectsFile {
    pub objects: Vec<ObjectModel>,
}

/// One class (native or Blueprint-generated) in the dump.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassModel {
    /// Full object path, e.g. `/Game/Blueprints/BP_Foo.BP_Foo_C`.
    pub path: String,
    pub name: String,
    #[serde(default, deserialize_with = "deser_flags")]
    pub flags: u64,
    /// Natively compiled (C++) class.
    #[serde(default)]
    pub native: bool,
    /// Scheduled for nativization in this run.
    #[serde(default)]
    pub converted: bool,
    #[serde(default)]
    pub super_path: Option<String>,
    /// Implemented interface class paths.
    #[serde(default)]
    pub interfaces: Vec<String>,
    /// Property-link order, preserved from the source class.
    #[serde(default)]
    pub properties: Vec<PropertyModel>,
    /// Object-arena index of the class default object.
    #[serde(default)]
    pub cdo: Option<usize>,
    /// Root nodes of this class's own construction script.
    #[serde(default)]
    pub scs_nodes: Vec<ScsNodeModel>,
    /// Object-arena indices of inherited/overridden component templates.
    #[serde(default)]
    pub component_templates: Vec<usize>,
    /// Object-arena indices of timeline templates.
    #[serde(default)]
    pub timelines: Vec<usize>,
    /// Object-arena indices of dynamic delegate-binding objects.
    #[serde(default)]
    pub dynamic_binding_objects: Vec<usize>,
    /// Full transitive object-dependency closure (object paths), as computed
    /// by the compiler's dependency gatherer.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Object-arena indices of assets the class's bytecode referenced
    /// directly. Emission may append to its working copy of this list.
    #[serde(default)]
    pub used_assets: Vec<usize>,
    /// Names of private properties for which the native class exports a
    /// `__PPO__` member-offset accessor.
    #[serde(default)]
    pub ppo_exported: Vec<String>,
}

/// One reflected property. Read-only view; the emitter never mutates it.
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyModel {
    pub name: String,
    #[serde(rename = "type")]
    pub type_desc: TypeDesc,
    #[serde(default, deserialize_with = "deser_flags")]
    pub flags: u64,
    /// Static C-array dimension; 1 for ordinary properties.
    #[serde(default = "default_array_dim")]
    pub array_dim: u32,
}

fn default_array_dim() -> u32 {
    1
}

/// One node of a simple construction script, with attachment children nested.
#[derive(Debug, Clone, Deserialize)]
pub struct ScsNodeModel {
    /// Component variable name on the generated class.
    pub name: String,
    /// Component class path.
    pub component_class: String,
    /// Object-arena index of the node's component template, if authored.
    #[serde(default)]
    pub template: Option<usize>,
    /// Name of an inherited native component to attach to, for root nodes
    /// parented into the native hierarchy.
    #[serde(default)]
    pub parent_component_name: Option<String>,
    #[serde(default)]
    pub attach_socket: Option<String>,
    #[serde(default)]
    pub children: Vec<ScsNodeModel>,
}

/// One script struct in the dump.
#[derive(Debug, Clone, Deserialize)]
pub struct StructModel {
    pub path: String,
    pub name: String,
    #[serde(default, deserialize_with = "deser_flags")]
    pub flags: u64,
    #[serde(default)]
    pub native: bool,
    #[serde(default)]
    pub converted: bool,
    #[serde(default)]
    pub super_path: Option<String>,
    #[serde(default)]
    pub properties: Vec<PropertyModel>,
    /// Object-arena index of an instance holding the struct's authored
    /// default values (user-defined structs only).
    #[serde(default)]
    pub default_instance: Option<usize>,
}

/// C++ declaration form of an enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumCppForm {
    Regular,
    Namespaced,
    EnumClass,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnumEntry {
    pub name: String,
    pub value: i64,
}

/// One enum in the dump.
#[derive(Debug, Clone, Deserialize)]
pub struct EnumModel {
    pub path: String,
    pub name: String,
    pub cpp_form: EnumCppForm,
    #[serde(default)]
    pub native: bool,
    #[serde(default)]
    pub converted: bool,
    #[serde(default)]
    pub entries: Vec<EnumEntry>,
}

/// One entry of the object arena: a subobject, template, CDO, or referenced
/// asset. Ownership is a parent index (tree); the archetype is a non-owning
/// back-reference used only for delta comparison.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectModel {
    /// Full object path.
    pub path: String,
    pub name: String,
    /// Long package name this object lives in, e.g. `/Game/Blueprints/BP_Foo`.
    pub package: String,
    pub class_path: String,
    /// Arena index of the owner (outer), if any. Roots are package-level.
    #[serde(default)]
    pub owner: Option<usize>,
    /// Arena index of the archetype whose values serve as this object's
    /// defaults.
    #[serde(default)]
    pub archetype: Option<usize>,
    #[serde(default, deserialize_with = "deser_flags")]
    pub flags: u64,
    /// Property name -> raw value, interpreted type-directedly through the
    /// owning class's property list. Missing keys mean "same as default".
    #[serde(default)]
    pub values: serde_json::Map<String, Value>,
    #[serde(default = "default_true")]
    pub needs_load_for_client: bool,
    #[serde(default = "default_true")]
    pub needs_load_for_server: bool,
    /// Object only exists in editor builds (editor-only class or outer).
    #[serde(default)]
    pub editor_only: bool,
}

fn default_true() -> bool {
    true
}

/// Accept flag fields as a JSON number or as a decimal/hex string. UE dumps
/// 64-bit flag sets as strings because JSON numbers lose precision past 2^53.
fn deser_flags<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    use serde::de::Error;

    match Value::deserialize(d)? {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| D::Error::custom("flag value out of u64 range")),
        Value::String(s) => {
            let s = s.trim();
            let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                u64::from_str_radix(hex, 16)
            } else {
                s.parse::<u64>()
            };
            parsed.map_err(|e| D::Error::custom(format!("bad flag value '{s}': {e}")))
        }
        other => Err(D::Error::custom(format!(
            "expected number or string for flags, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accept_number_and_hex_string() {
        #[derive(Deserialize)]
        struct F {
            #[serde(deserialize_with = "deser_flags")]
            flags: u64,
        }

        let f: F = serde_json::from_str(r#"{"flags": 16384}"#).unwrap();
        assert_eq!(f.flags, 0x4000);
        let f: F = serde_json::from_str(r#"{"flags": "0x0004000000000000"}"#).unwrap();
        assert_eq!(f.flags, 0x0004_0000_0000_0000);
        let f: F = serde_json::from_str(r#"{"flags": "8192"}"#).unwrap();
        assert_eq!(f.flags, 8192);
    }

    #[test]
    fn minimal_object_entry_parses() {
        let json = r#"{
            "path": "/Game/BP/BP_Foo.Default__BP_Foo_C",
            "name": "Default__BP_Foo_C",
            "package": "/Game/BP/BP_Foo",
            "class_path": "/Game/BP/BP_Foo.BP_Foo_C",
            "flags": 16
        }"#;
        let obj: ObjectModel = serde_json::from_str(json).unwrap();
        assert_eq!(obj.owner, None);
        assert!(obj.needs_load_for_client);
        assert!(obj.values.is_empty());
    }

    #[test]
    fn property_defaults() {
        let json = r#"{"name": "Health", "type": {"kind": "int"}}"#;
        let p: PropertyModel = serde_json::from_str(json).unwrap();
        assert_eq!(p.array_dim, 1);
        assert_eq!(p.flags, 0);
    }
}
