// The closed set of property type kinds the backend lowers to C++.
// Every match over `TypeDesc` in the emitter is exhaustive; adding a kind
// here forces every lowering site to handle it.

use serde::Deserialize;

/// Type of a reflected property value.
///
/// Paths (`enum_path`, `struct_path`, `class_path`, ...) are full object
/// paths (e.g. `/Script/Engine.Actor` or `/Game/Blueprints/BP_Foo.BP_Foo_C`)
/// resolvable through the [`crate::ModelRegistry`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDesc {
    /// `bool`, or a bitfield when the property does not use the native
    /// single-bit representation.
    Bool {
        #[serde(default)]
        bitfield: bool,
    },
    /// `uint8`, optionally displayed as a regular (non-class) enum.
    Byte {
        #[serde(default)]
        enum_path: Option<String>,
    },
    Int8,
    Int16,
    Int,
    Int64,
    UInt16,
    UInt32,
    UInt64,
    Float,
    Double,
    Name,
    Str,
    Text,
    /// An `enum class` typed property.
    Enum { enum_path: String },
    Struct { struct_path: String },
    /// Raw `UObject*`-family pointer.
    Object { class_path: String },
    /// `UClass*` or `TSubclassOf<T>` (distinguished by CPF_UOBJECT_WRAPPER
    /// on the owning property).
    Class { meta_class_path: String },
    SoftObject { class_path: String },
    SoftClass { meta_class_path: String },
    WeakObject { class_path: String },
    Interface { interface_path: String },
    Array { inner: Box<TypeDesc> },
    Set { inner: Box<TypeDesc> },
    Map { key: Box<TypeDesc>, value: Box<TypeDesc> },
    Delegate { signature_name: String },
    MulticastDelegate { signature_name: String },
    /// `TFieldPath` properties. The backend does not support these; hitting
    /// one during emission is a fail-fast error.
    FieldPath,
}

impl TypeDesc {
    /// True for delegate kinds, which are bound dynamically rather than
    /// literal-initialized.
    pub fn is_delegate(&self) -> bool {
        matches!(self, TypeDesc::Delegate { .. } | TypeDesc::MulticastDelegate { .. })
    }

    /// True for kinds holding an object reference directly (not through a
    /// container).
    pub fn is_object_reference(&self) -> bool {
        matches!(
            self,
            TypeDesc::Object { .. }
                | TypeDesc::Class { .. }
                | TypeDesc::SoftObject { .. }
                | TypeDesc::SoftClass { .. }
                | TypeDesc::WeakObject { .. }
                | TypeDesc::Interface { .. }
        )
    }

    /// True for container kinds (array/set/map).
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            TypeDesc::Array { .. } | TypeDesc::Set { .. } | TypeDesc::Map { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_tagged_kinds() {
        let d: TypeDesc = serde_json::from_str(r#"{"kind":"int"}"#).unwrap();
        assert_eq!(d, TypeDesc::Int);

        let d: TypeDesc = serde_json::from_str(
            r#"{"kind":"array","inner":{"kind":"struct","struct_path":"/Script/CoreUObject.Vector"}}"#,
        )
        .unwrap();
        assert_eq!(
            d,
            TypeDesc::Array {
                inner: Box::new(TypeDesc::Struct {
                    struct_path: "/Script/CoreUObject.Vector".to_string()
                })
            }
        );
    }

    #[test]
    fn byte_enum_path_is_optional() {
        let d: TypeDesc = serde_json::from_str(r#"{"kind":"byte"}"#).unwrap();
        assert_eq!(d, TypeDesc::Byte { enum_path: None });
    }

    #[test]
    fn kind_predicates() {
        assert!(TypeDesc::MulticastDelegate { signature_name: "OnHit".into() }.is_delegate());
        assert!(TypeDesc::Object { class_path: "/Script/Engine.Actor".into() }.is_object_reference());
        assert!(!TypeDesc::Int.is_container());
    }
}
