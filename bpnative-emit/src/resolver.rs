// Type/name resolution: mapping a TypeDesc or a referenced object to either
// a compilable C++ name or a runtime lookup/load expression.

use bpnative_ue_flags::CPF_UOBJECT_WRAPPER;
use bpnative_model::{ClassModel, ModelRegistry, TypeDesc};

use crate::context::{EmitterContext, GeneratedCodeType};
use crate::literals::escape_cpp_string;
use crate::naming;

const CLASS_PATH: &str = "/Script/CoreUObject.Class";
const OBJECT_PATH: &str = "/Script/CoreUObject.Object";
const STRUCT_PATH: &str = "/Script/CoreUObject.Struct";
const SCRIPT_STRUCT_PATH: &str = "/Script/CoreUObject.ScriptStruct";
const ENUM_PATH: &str = "/Script/CoreUObject.Enum";

/// Walk up from `class` to the first class that will exist natively after
/// this run: a native class or one scheduled for conversion. Used wherever a
/// declaration must compile even if `class` itself stays interpreted.
pub fn first_native_or_converted<'a>(
    reg: &'a ModelRegistry,
    class: &'a ClassModel,
) -> &'a ClassModel {
    for candidate in reg.class_chain(class) {
        if candidate.native || candidate.converted {
            return candidate;
        }
    }
    class
}

pub(crate) fn class_pointer_name(reg: &ModelRegistry, class_path: &str) -> String {
    match reg.find_class(class_path) {
        Some(class) => naming::class_cpp_name(reg, first_native_or_converted(reg, class)),
        None => {
            // Classes outside the dump are assumed native with the plain
            // object prefix.
            let short = class_path.rsplit('.').next().unwrap_or(class_path);
            format!("U{short}")
        }
    }
}

/// Compilable C++ type for a property's value. `prop_flags` distinguishes
/// wrapper declarations (TSubclassOf) from raw UClass pointers.
pub fn resolve_type_name(reg: &ModelRegistry, td: &TypeDesc, prop_flags: u64) -> String {
    match td {
        TypeDesc::Bool { .. } => "bool".to_string(),
        TypeDesc::Byte { enum_path: None } => "uint8".to_string(),
        TypeDesc::Byte { enum_path: Some(path) } => match reg.find_enum(path) {
            Some(enm) => format!("TEnumAsByte<{}>", naming::enum_cpp_name(enm)),
            None => "uint8".to_string(),
        },
        TypeDesc::Int8 => "int8".to_string(),
        TypeDesc::Int16 => "int16".to_string(),
        TypeDesc::Int => "int32".to_string(),
        TypeDesc::Int64 => "int64".to_string(),
        TypeDesc::UInt16 => "uint16".to_string(),
        TypeDesc::UInt32 => "uint32".to_string(),
        TypeDesc::UInt64 => "uint64".to_string(),
        TypeDesc::Float => "float".to_string(),
        TypeDesc::Double => "double".to_string(),
        TypeDesc::Name => "FName".to_string(),
        TypeDesc::Str => "FString".to_string(),
        TypeDesc::Text => "FText".to_string(),
        TypeDesc::Enum { enum_path } => match reg.find_enum(enum_path) {
            Some(enm) => naming::enum_cpp_name(enm),
            None => "uint8".to_string(),
        },
        TypeDesc::Struct { struct_path } => match reg.find_struct(struct_path) {
            Some(strct) => naming::struct_cpp_name(strct),
            None => {
                let short = struct_path.rsplit('.').next().unwrap_or(struct_path);
                format!("F{short}")
            }
        },
        TypeDesc::Object { class_path } => format!("{}*", class_pointer_name(reg, class_path)),
        TypeDesc::Class { meta_class_path } => {
            if prop_flags & CPF_UOBJECT_WRAPPER != 0 {
                format!("TSubclassOf<{}>", class_pointer_name(reg, meta_class_path))
            } else {
                "UClass*".to_string()
            }
        }
        TypeDesc::SoftObject { class_path } => {
            format!("TSoftObjectPtr<{}>", class_pointer_name(reg, class_path))
        }
        TypeDesc::SoftClass { meta_class_path } => {
            format!("TSoftClassPtr<{}>", class_pointer_name(reg, meta_class_path))
        }
        TypeDesc::WeakObject { class_path } => {
            format!("TWeakObjectPtr<{}>", class_pointer_name(reg, class_path))
        }
        TypeDesc::Interface { interface_path } => {
            let short = interface_path.rsplit('.').next().unwrap_or(interface_path);
            format!("TScriptInterface<I{short}>")
        }
        TypeDesc::Array { inner } => {
            format!("TArray<{}>", resolve_type_name(reg, inner, prop_flags))
        }
        TypeDesc::Set { inner } => format!("TSet<{}>", resolve_type_name(reg, inner, prop_flags)),
        TypeDesc::Map { key, value } => format!(
            "TMap<{}, {}>",
            resolve_type_name(reg, key, prop_flags),
            resolve_type_name(reg, value, prop_flags)
        ),
        TypeDesc::Delegate { signature_name } => format!("F{signature_name}"),
        TypeDesc::MulticastDelegate { signature_name } => format!("F{signature_name}"),
        TypeDesc::FieldPath => {
            panic!("field-path properties are not supported by the nativization backend")
        }
    }
}

/// The reflection-class name used in `CastChecked<...>` / `LoadObject<...>`
/// around a resolved object expression.
fn class_string(
    ctx: &EmitterContext<'_>,
    object_class_path: Option<&str>,
    expected_class_path: Option<&str>,
) -> String {
    let path = expected_class_path
        .or(object_class_path)
        .unwrap_or(OBJECT_PATH);
    // User-defined enum/struct types fold to their reflection base; a BPGC
    // used as a metaclass folds to plain UClass.
    let folded = match path.rsplit('.').next().unwrap_or(path) {
        "UserDefinedEnum" => ENUM_PATH,
        "UserDefinedStruct" => SCRIPT_STRUCT_PATH,
        "BlueprintGeneratedClass" => CLASS_PATH,
        _ => path,
    };
    class_pointer_name(ctx.reg, folded)
}

/// True when `expected` is `UClass` itself or one of its ancestors; in that
/// case a resolved `X::StaticClass()` already has an acceptable static type
/// and needs no cast.
fn expected_accepts_class(expected: Option<&str>) -> bool {
    matches!(
        expected,
        None | Some(CLASS_PATH) | Some(OBJECT_PATH) | Some(STRUCT_PATH)
            | Some("/Script/CoreUObject.Field")
    )
}

fn cast_custom_class(ctx: &EmitterContext<'_>, expected: Option<&str>, inner: String) -> String {
    if expected_accepts_class(expected) {
        inner
    } else {
        format!("Cast<{}>({inner})", class_string(ctx, None, expected))
    }
}

fn dynamic_class_member(
    ctx: &EmitterContext<'_>,
    object_class_path: Option<&str>,
    expected: Option<&str>,
    member: &str,
    index: usize,
    null_allowed: bool,
) -> String {
    let suffix = if null_allowed { ", ECastCheckedType::NullAllowed" } else { "" };
    format!(
        "CastChecked<{}>(CastChecked<UDynamicClass>({}::StaticClass())->{}[{}]{})",
        class_string(ctx, object_class_path, expected),
        naming::class_cpp_name(ctx.reg, ctx.class),
        member,
        index,
        suffix
    )
}

/// Resolve a referenced object (by path) to a C++ expression, choosing among
/// a direct static accessor, an index into a class-owned subobject array, a
/// used-assets index, or a string-path load. Returns `None` when no case
/// applies; callers decide between asserting and emitting a null fallback.
pub fn find_globally_mapped_object(
    ctx: &mut EmitterContext<'_>,
    path: &str,
    expected_class_path: Option<&str>,
    load_if_not_found: bool,
    try_used_assets: bool,
) -> Option<String> {
    // The class being emitted resolves to itself.
    if path == ctx.class.path {
        let this_class = match ctx.current_code_type {
            GeneratedCodeType::SubobjectsOfClass => "InDynamicClass".to_string(),
            _ => "GetClass()".to_string(),
        };
        return Some(cast_custom_class(ctx, expected_class_path, this_class));
    }

    // Natively compiled or to-be-converted classes have a static accessor.
    if let Some(class) = ctx.reg.find_class(path) {
        if class.native || class.converted {
            let expr = format!("{}::StaticClass()", naming::class_cpp_name(ctx.reg, class));
            return Some(cast_custom_class(ctx, expected_class_path, expr));
        }
        // An unconverted BPGC falls through to the asset paths below.
    }

    if let Some(strct) = ctx.reg.find_struct(path) {
        if strct.native && strct.flags & bpnative_ue_flags::STRUCT_NO_EXPORT != 0 {
            // No-export structs have no StaticStruct; reach them through the
            // base-structure registry.
            return Some(format!("TBaseStructure<{}>::Get()", naming::struct_cpp_name(strct)));
        }
        if strct.native || strct.converted {
            return Some(format!("{}::StaticStruct()", naming::struct_cpp_name(strct)));
        }
    }

    if let Some(enm) = ctx.reg.find_enum(path) {
        if enm.converted {
            let index = match ctx.enums_in_current_class.iter().position(|p| p == path) {
                Some(i) => i,
                None => {
                    ctx.enums_in_current_class.push(path.to_string());
                    ctx.enums_in_current_class.len() - 1
                }
            };
            return Some(dynamic_class_member(
                ctx,
                Some(ENUM_PATH),
                expected_class_path,
                "ReferencedConvertedFields",
                index,
                false,
            ));
        }
        // Native enums fall through to the load path.
    }

    if let Some(obj_idx) = ctx.reg.find_object(path) {
        let object_class_path = Some(ctx.reg.object(obj_idx).class_path.clone());
        let object_class_path = object_class_path.as_deref();

        // Subobjects already created in the current pass.
        if let Some(expr) = ctx.find_subobject_expr(obj_idx) {
            return Some(expr.to_string());
        }

        // Class-owned subobject arrays on the dynamic class.
        let lists: [(&[usize], &str); 4] = [
            (&ctx.misc_converted_subobjects, "MiscConvertedSubobjects"),
            (&ctx.dynamic_binding_objects, "DynamicBindingObjects"),
            (&ctx.component_templates, "ComponentTemplates"),
            (&ctx.timelines, "Timelines"),
        ];
        for (list, member) in lists {
            if let Some(pos) = list.iter().position(|&i| i == obj_idx) {
                return Some(dynamic_class_member(
                    ctx,
                    object_class_path,
                    expected_class_path,
                    member,
                    pos,
                    false,
                ));
            }
        }
        // The class's own CDO is `this` inside constructor-flavored passes.
        if ctx.class.cdo == Some(obj_idx)
            && matches!(
                ctx.current_code_type,
                GeneratedCodeType::SubobjectsOfClass | GeneratedCodeType::CommonConstructor
            )
        {
            return Some("this".to_string());
        }

        if try_used_assets {
            let mut asset_index = ctx.used_assets.iter().position(|&i| i == obj_idx);
            if asset_index.is_none() && ctx.class.dependencies.iter().any(|d| d == path) {
                asset_index = Some(ctx.find_or_add_used_asset(obj_idx));
            }
            if asset_index.is_none() {
                // A subobject of an asset: walk the outer chain looking for
                // an already-tracked ancestor, then register both.
                for &outer in ctx.reg.outer_chain(obj_idx).iter().skip(1) {
                    let outer_path = ctx.reg.object(outer).path.clone();
                    if ctx.class.dependencies.iter().any(|d| d == &outer_path) {
                        ctx.find_or_add_used_asset(outer);
                        asset_index = Some(ctx.find_or_add_used_asset(obj_idx));
                        break;
                    }
                }
            }
            if let Some(index) = asset_index {
                ctx.mark_object_used(obj_idx);
                return Some(dynamic_class_member(
                    ctx,
                    object_class_path,
                    expected_class_path,
                    "UsedAssets",
                    index,
                    true,
                ));
            }
        }

        if load_if_not_found {
            return Some(format!(
                "LoadObject<{}>(nullptr, TEXT(\"{}\"))",
                class_string(ctx, object_class_path, expected_class_path),
                escape_cpp_string(path)
            ));
        }
    } else if load_if_not_found {
        // Referenced by path only; still loadable at runtime.
        return Some(format!(
            "LoadObject<{}>(nullptr, TEXT(\"{}\"))",
            class_string(ctx, None, expected_class_path),
            escape_cpp_string(path)
        ));
    }

    None
}

/// Emit (once per pass) a runtime `FProperty` lookup local for a property
/// that generated code cannot address directly, returning the local's name.
pub fn generate_get_property_by_name(
    ctx: &mut EmitterContext<'_>,
    owner_path: &str,
    property_name: &str,
) -> String {
    let key = format!("{owner_path}:{property_name}");
    if let Some(local) = ctx.find_accessor(&key) {
        return local.to_string();
    }

    let local = ctx.generate_unique_local_name();
    let owner = find_globally_mapped_object(ctx, owner_path, Some(STRUCT_PATH), true, false)
        .unwrap_or_else(|| panic!("property owner {owner_path} never resolved"));
    ctx.body.add_line(&format!(
        "const FProperty* {local} = ({owner})->FindPropertyByName(FName(TEXT(\"{}\")));",
        escape_cpp_string(property_name)
    ));
    ctx.body.add_line(&format!("check({local});"));

    if ctx.current_code_type != GeneratedCodeType::Regular {
        ctx.register_accessor(key, local.clone());
    }
    local
}

/// One side of an explicit cast adapter wrapped around an assignment source.
#[derive(Debug, PartialEq, Eq)]
pub struct CastAdapter {
    pub begin: String,
    pub end: String,
}

fn enum_cpp_type(reg: &ModelRegistry, enum_path: &str) -> String {
    match reg.find_enum(enum_path) {
        Some(enm) => naming::enum_cpp_name(enm),
        None => enum_path.rsplit('.').next().unwrap_or(enum_path).to_string(),
    }
}

fn object_class_of(td: &TypeDesc) -> Option<&str> {
    match td {
        TypeDesc::Object { class_path }
        | TypeDesc::SoftObject { class_path }
        | TypeDesc::WeakObject { class_path } => Some(class_path),
        TypeDesc::Class { meta_class_path } | TypeDesc::SoftClass { meta_class_path } => {
            Some(meta_class_path)
        }
        _ => None,
    }
}

/// Decide whether assigning a value of type `src` to a target of type `dest`
/// needs an explicit adapter, and produce it. Plain pointer assignment
/// between related class pointers compiles implicitly and returns `None`;
/// only enum/byte reinterpretation, reference bindings, downcasts, and
/// mismatched container element types need adapters.
pub fn generate_automatic_cast(
    reg: &ModelRegistry,
    dest: &TypeDesc,
    src: &TypeDesc,
    dest_flags: u64,
    src_flags: u64,
    force_reference: bool,
) -> Option<CastAdapter> {
    // BYTE <-> ENUM, value or reference form.
    match (dest, src) {
        (TypeDesc::Enum { enum_path }, TypeDesc::Byte { enum_path: None }) => {
            let cpp = enum_cpp_type(reg, enum_path);
            return Some(if force_reference {
                CastAdapter { begin: format!("*({cpp}*)(&("), end: "))".to_string() }
            } else {
                CastAdapter { begin: format!("static_cast<{cpp}>("), end: ")".to_string() }
            });
        }
        (TypeDesc::Byte { enum_path: None }, TypeDesc::Enum { .. }) => {
            // An enum and its underlying type are not related by inheritance,
            // so static_cast cannot form a reference here.
            return Some(if force_reference {
                CastAdapter {
                    begin: "*reinterpret_cast<uint8*>(&(".to_string(),
                    end: "))".to_string(),
                }
            } else {
                CastAdapter {
                    begin: "static_cast<uint8>(".to_string(),
                    end: ")".to_string(),
                }
            });
        }
        (TypeDesc::Array { inner: dest_inner }, TypeDesc::Array { inner: src_inner }) => {
            return array_cast(reg, dest_inner, src_inner, dest_flags, src_flags);
        }
        _ => {}
    }

    // OBJECT to OBJECT, non-container.
    let (Some(dest_class), Some(src_class)) = (object_class_of(dest), object_class_of(src)) else {
        return None;
    };
    if dest_class == src_class {
        return None;
    }
    let dest_name = class_pointer_name(reg, dest_class);
    if force_reference && reg.class_is_a(src_class, dest_class) {
        // A pointer passed by reference must have exactly the declared type.
        return Some(CastAdapter {
            begin: format!("*({dest_name}*)(&("),
            end: "))".to_string(),
        });
    }
    if reg.class_is_a(dest_class, src_class) && !reg.class_is_a(src_class, dest_class) {
        return Some(match dest {
            TypeDesc::SoftObject { .. } | TypeDesc::SoftClass { .. } => CastAdapter {
                // Soft pointers cannot be downcast by assignment; route
                // through the wrapped object path instead.
                begin: String::new(),
                end: ".ToSoftObjectPath()".to_string(),
            },
            _ => CastAdapter {
                begin: format!("CastChecked<{dest_name}>("),
                end: ", ECastCheckedType::NullAllowed)".to_string(),
            },
        });
    }
    None
}

fn array_cast(
    reg: &ModelRegistry,
    dest_inner: &TypeDesc,
    src_inner: &TypeDesc,
    dest_flags: u64,
    src_flags: u64,
) -> Option<CastAdapter> {
    match (dest_inner, src_inner) {
        (TypeDesc::Enum { enum_path }, TypeDesc::Byte { enum_path: None }) => {
            let cpp = enum_cpp_type(reg, enum_path);
            Some(CastAdapter {
                begin: "TArrayCaster<uint8>(".to_string(),
                end: format!(").Get<{cpp}>()"),
            })
        }
        (TypeDesc::Byte { enum_path: None }, TypeDesc::Enum { enum_path }) => {
            let cpp = enum_cpp_type(reg, enum_path);
            Some(CastAdapter {
                begin: format!("TArrayCaster<{cpp}>("),
                end: ").Get<uint8>()".to_string(),
            })
        }
        (TypeDesc::Class { meta_class_path: dest_meta }, TypeDesc::Class { meta_class_path: src_meta }) => {
            let dest_wrapped = dest_flags & CPF_UOBJECT_WRAPPER != 0;
            let src_wrapped = src_flags & CPF_UOBJECT_WRAPPER != 0;
            // Two plain UClass* arrays need no adapter.
            if dest_wrapped == src_wrapped
                && (!dest_wrapped || dest_meta == src_meta || !related(reg, dest_meta, src_meta))
            {
                return None;
            }
            let type_str = |wrapped: bool, meta: &str| {
                if wrapped {
                    format!("TSubclassOf<{}>", class_pointer_name(reg, meta))
                } else {
                    "UClass*".to_string()
                }
            };
            Some(CastAdapter {
                begin: format!("TArrayCaster<{}>(", type_str(src_wrapped, src_meta)),
                end: format!(").Get<{}>()", type_str(dest_wrapped, dest_meta)),
            })
        }
        (TypeDesc::Object { class_path: dest_class }, TypeDesc::Object { class_path: src_class }) => {
            if dest_class == src_class || !related(reg, dest_class, src_class) {
                return None;
            }
            Some(CastAdapter {
                begin: format!("TArrayCaster<{}*>(", class_pointer_name(reg, src_class)),
                end: format!(").Get<{}*>()", class_pointer_name(reg, dest_class)),
            })
        }
        _ => None,
    }
}

fn related(reg: &ModelRegistry, a: &str, b: &str) -> bool {
    reg.class_is_a(a, b) || reg.class_is_a(b, a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bpnative_model::{EnumCppForm, EnumModel};

    fn enum_model(path: &str, name: &str, native: bool) -> EnumModel {
        EnumModel {
            path: path.to_string(),
            name: name.to_string(),
            cpp_form: EnumCppForm::EnumClass,
            native,
            converted: !native,
            entries: Vec::new(),
        }
    }

    fn registry_with_enum() -> ModelRegistry {
        ModelRegistry::new(
            Vec::new(),
            Vec::new(),
            vec![enum_model("/Script/Engine.ECollisionChannel", "ECollisionChannel", true)],
            Vec::new(),
        )
    }

    #[test]
    fn byte_to_enum_value_cast() {
        let reg = registry_with_enum();
        let adapter = generate_automatic_cast(
            &reg,
            &TypeDesc::Enum { enum_path: "/Script/Engine.ECollisionChannel".into() },
            &TypeDesc::Byte { enum_path: None },
            0,
            0,
            false,
        )
        .unwrap();
        assert_eq!(adapter.begin, "static_cast<ECollisionChannel>(");
        assert_eq!(adapter.end, ")");
    }

    #[test]
    fn enum_to_byte_value_and_reference_casts() {
        let reg = registry_with_enum();
        let td_enum = TypeDesc::Enum { enum_path: "/Script/Engine.ECollisionChannel".into() };
        let td_byte = TypeDesc::Byte { enum_path: None };

        let value = generate_automatic_cast(&reg, &td_byte, &td_enum, 0, 0, false).unwrap();
        assert_eq!(value.begin, "static_cast<uint8>(");
        assert_eq!(value.end, ")");

        let reference = generate_automatic_cast(&reg, &td_byte, &td_enum, 0, 0, true).unwrap();
        assert_eq!(reference.begin, "*reinterpret_cast<uint8*>(&(");
        assert_eq!(reference.end, "))");
    }

    #[test]
    fn enum_array_uses_array_caster() {
        let reg = registry_with_enum();
        let dest = TypeDesc::Array {
            inner: Box::new(TypeDesc::Enum {
                enum_path: "/Script/Engine.ECollisionChannel".into(),
            }),
        };
        let src = TypeDesc::Array { inner: Box::new(TypeDesc::Byte { enum_path: None }) };
        let adapter = generate_automatic_cast(&reg, &dest, &src, 0, 0, false).unwrap();
        assert_eq!(adapter.begin, "TArrayCaster<uint8>(");
        assert_eq!(adapter.end, ").Get<ECollisionChannel>()");
    }

    #[test]
    fn identical_scalars_need_no_cast() {
        let reg = registry_with_enum();
        assert!(generate_automatic_cast(&reg, &TypeDesc::Int, &TypeDesc::Int, 0, 0, false).is_none());
    }

    #[test]
    fn subclass_of_wrapper_mismatch_in_arrays_casts() {
        let reg = registry_with_enum();
        let wrapped = TypeDesc::Array {
            inner: Box::new(TypeDesc::Class {
                meta_class_path: "/Script/Engine.Actor".into(),
            }),
        };
        let raw = wrapped.clone();
        let adapter =
            generate_automatic_cast(&reg, &wrapped, &raw, CPF_UOBJECT_WRAPPER, 0, false).unwrap();
        assert_eq!(adapter.begin, "TArrayCaster<UClass*>(");
        assert_eq!(adapter.end, ").Get<TSubclassOf<UActor>>()");
    }
}
