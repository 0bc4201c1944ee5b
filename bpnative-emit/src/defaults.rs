// Default-value emission: the delta between an object's recorded values and
// its archetype defaults, rendered as constructor statements.
//
// A property emits only when its value differs under its own kind's equality
// (config properties always emit). The lvalue naming a member depends on how
// generated code may legally reach it: direct member access, a private-offset
// accessor, a reflection lookup, or a wrapper around an unconverted class.

use bpnative_ue_flags::{
    CPF_CONFIG, CPF_EDITOR_ONLY, CPF_INSTANCED_REFERENCE, CPF_NATIVE_ACCESS_SPECIFIER_PRIVATE,
    CPF_NATIVE_ACCESS_SPECIFIER_PROTECTED, CPF_TRANSIENT, RF_DEFAULT_SUB_OBJECT,
};
use bpnative_model::value::identical_opt;
use bpnative_model::{ClassModel, ModelRegistry, PropertyModel, StructModel, TypeDesc};
use serde_json::Value;

use crate::constructor::{handle_class_subobject, handle_instanced_subobject};
use crate::context::{ClassSubobjectList, EmitterContext, GeneratedCodeType};
use crate::literals::{
    escape_cpp_string, has_special_constructor, scalar_literal, special_struct_constructor,
};
use crate::naming;
use crate::resolver::{
    find_globally_mapped_object, generate_get_property_by_name, resolve_type_name,
};

const SCRIPT_STRUCT_PATH: &str = "/Script/CoreUObject.ScriptStruct";

/// How the outer expression connects to the member being assigned.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AccessOperator {
    /// The member is in scope directly (emitting inside the owner's own
    /// constructor).
    None,
    Dot,
    Pointer,
}

/// The reflected type declaring the property currently being emitted.
#[derive(Clone, Copy)]
pub enum PropertyOwner<'a> {
    Class(&'a ClassModel),
    Struct(&'a StructModel),
}

impl<'a> PropertyOwner<'a> {
    pub fn path(&self) -> &'a str {
        match self {
            PropertyOwner::Class(c) => &c.path,
            PropertyOwner::Struct(s) => &s.path,
        }
    }

    fn member_name(&self, prop: &PropertyModel) -> String {
        match self {
            PropertyOwner::Class(c) => naming::member_cpp_name(!c.native, &prop.name),
            PropertyOwner::Struct(s) => naming::member_cpp_name(!s.native, &prop.name),
        }
    }

    fn cpp_name(&self, reg: &ModelRegistry) -> String {
        match self {
            PropertyOwner::Class(c) => naming::class_cpp_name(reg, c),
            PropertyOwner::Struct(s) => naming::struct_cpp_name(s),
        }
    }

    fn has_ppo_export(&self, prop_name: &str) -> bool {
        match self {
            PropertyOwner::Class(c) => c.ppo_exported.iter().any(|n| n == prop_name),
            PropertyOwner::Struct(_) => false,
        }
    }
}

fn element<'v>(v: Option<&'v Value>, idx: u32, array_dim: u32) -> Option<&'v Value> {
    if array_dim > 1 {
        v.and_then(|a| a.get(idx as usize))
    } else {
        v
    }
}

/// Emit the delta for one property of `owner`, every static-array element
/// separately. `default` distinguishes "no default container at all" (outer
/// `None`, everything recorded emits) from "container present, key missing".
pub fn outer_generate(
    ctx: &mut EmitterContext<'_>,
    owner: PropertyOwner<'_>,
    prop: &PropertyModel,
    outer_path: &str,
    current: Option<&Value>,
    default: Option<Option<&Value>>,
    op: AccessOperator,
    allow_protected: bool,
) {
    if prop.flags & (CPF_EDITOR_ONLY | CPF_TRANSIENT) != 0 {
        return;
    }
    if prop.type_desc.is_delegate() {
        return;
    }
    let reg = ctx.reg;

    for idx in 0..prop.array_dim {
        let elem_default = default.map(|d| element(d, idx, prop.array_dim));
        let is_config = prop.flags & CPF_CONFIG != 0;
        // Config values are written out even when identical to the
        // archetype; an ini override rewrites them before the constructor
        // runs. A config value missing from the dump falls back to the
        // archetype's.
        let Some(cur) = element(current, idx, prop.array_dim)
            .or_else(|| if is_config { elem_default.flatten() } else { None })
        else {
            continue;
        };
        let changed = elem_default.is_none()
            || is_config
            || !identical_opt(reg, &prop.type_desc, Some(cur), elem_default.flatten());
        if !changed {
            continue;
        }

        let inaccessible = prop.flags & CPF_NATIVE_ACCESS_SPECIFIER_PRIVATE != 0
            || (!allow_protected && prop.flags & CPF_NATIVE_ACCESS_SPECIFIER_PROTECTED != 0);

        let path_to_member;
        if let PropertyOwner::Class(owner_class) = owner {
            if !owner_class.native && !owner_class.converted {
                // The declaring class stays unconverted; its members are only
                // reachable through the generated wrapper.
                let operator_str = if op == AccessOperator::Dot { "&" } else { "" };
                let container = if op == AccessOperator::None {
                    "this".to_string()
                } else {
                    format!("{operator_str}({outer_path})")
                };
                path_to_member = format!(
                    "{}({container}).GetRef__{}()",
                    naming::unconverted_wrapper_name(owner_class),
                    naming::sanitize_identifier(&prop.name)
                );
                inner_generate(
                    ctx,
                    &prop.type_desc,
                    prop.flags,
                    &path_to_member,
                    cur,
                    elem_default.flatten(),
                    Some((owner.path(), &prop.name)),
                    false,
                );
                continue;
            }
        }

        if inaccessible {
            let operator_str = if op == AccessOperator::Dot { "&" } else { "" };
            let container = if op == AccessOperator::None { "this" } else { outer_path };

            if matches!(prop.type_desc, TypeDesc::Bool { bitfield: true }) {
                let prop_local = generate_get_property_by_name(ctx, owner.path(), &prop.name);
                let value_str = scalar_literal(reg, &prop.type_desc, cur);
                ctx.body.add_line(&format!(
                    "(((FBoolProperty*){prop_local})->SetPropertyValue_InContainer({operator_str}({container}), {value_str}, {idx}));"
                ));
                continue;
            }

            let type_decl = resolve_type_name(reg, &prop.type_desc, prop.flags);
            let get_ptr = if owner.has_ppo_export(&prop.name) {
                let array_params = if idx != 0 {
                    format!(", sizeof({type_decl}), {idx}")
                } else {
                    String::new()
                };
                format!(
                    "(*(AccessPrivateProperty<{type_decl}>({operator_str}({container}), {}::__PPO__{}() {array_params})))",
                    owner.cpp_name(reg),
                    owner.member_name(prop)
                )
            } else {
                let prop_local = generate_get_property_by_name(ctx, owner.path(), &prop.name);
                format!(
                    "(*({prop_local}->ContainerPtrToValuePtr<{type_decl}>({operator_str}({container}), {idx})))"
                )
            };
            let local = ctx.generate_unique_local_name();
            ctx.body.add_line(&format!("auto& {local} = {get_ptr};"));
            path_to_member = local;
        } else {
            let operator_str = match op {
                AccessOperator::None => "",
                AccessOperator::Pointer => "->",
                AccessOperator::Dot => ".",
            };
            let array_post = if prop.array_dim > 1 { format!("[{idx}]") } else { String::new() };
            path_to_member =
                format!("{outer_path}{operator_str}{}{array_post}", owner.member_name(prop));
        }

        inner_generate(
            ctx,
            &prop.type_desc,
            prop.flags,
            &path_to_member,
            cur,
            elem_default.flatten(),
            Some((owner.path(), &prop.name)),
            false,
        );
    }
}

/// Resolve an object-reference value to the expression naming the referenced
/// object, creating subobjects on the way when the reference demands it.
fn handle_object_value(
    ctx: &mut EmitterContext<'_>,
    value: &Value,
    expected_class_path: &str,
    prop_flags: u64,
) -> Option<String> {
    let path = match value {
        Value::Null => return Some("nullptr".to_string()),
        Value::String(s) if !s.is_empty() => s.clone(),
        _ => return None,
    };

    if let Some(mapped) =
        find_globally_mapped_object(ctx, &path, Some(expected_class_path), false, true)
    {
        return Some(mapped);
    }

    if let Some(obj_idx) = ctx.reg.find_object(&path) {
        let obj = ctx.reg.object(obj_idx);
        let is_default_subobject = obj.flags & RF_DEFAULT_SUB_OBJECT != 0;
        let class_package = ctx.class.path.split('.').next().unwrap_or("");
        let in_class_package = obj.package == class_package;
        let outer_chain = ctx.reg.outer_chain(obj_idx);
        let under_cdo = ctx.class.cdo.is_some_and(|cdo| outer_chain.contains(&cdo));

        // A class-owned object met for the first time while the class
        // subobjects function is being emitted gets created there.
        if ctx.current_code_type == GeneratedCodeType::SubobjectsOfClass
            && in_class_package
            && !under_cdo
        {
            return Some(handle_class_subobject(
                ctx,
                obj_idx,
                ClassSubobjectList::MiscConvertedSubobjects,
                true,
                true,
            ));
        }

        if ctx.current_code_type != GeneratedCodeType::SubobjectsOfClass
            && prop_flags & CPF_INSTANCED_REFERENCE != 0
        {
            // Default subobjects were already created by the native super
            // constructor; anything else instanced gets created here.
            return Some(handle_instanced_subobject(
                ctx,
                obj_idx,
                !is_default_subobject,
                is_default_subobject,
            ));
        }
    }

    find_globally_mapped_object(ctx, &path, Some(expected_class_path), true, true)
}

/// The value kinds with a non-memberwise literal or lookup form. Returns
/// `None` for everything that falls through to scalar/memberwise emission.
fn handle_special_types(
    ctx: &mut EmitterContext<'_>,
    td: &TypeDesc,
    prop_flags: u64,
    value: &Value,
) -> Option<String> {
    match td {
        TypeDesc::Object { class_path }
        | TypeDesc::WeakObject { class_path }
        | TypeDesc::Interface { interface_path: class_path } => {
            handle_object_value(ctx, value, class_path, prop_flags)
        }
        TypeDesc::Class { meta_class_path } => {
            handle_object_value(ctx, value, meta_class_path, prop_flags)
        }
        TypeDesc::SoftObject { .. } | TypeDesc::SoftClass { .. } => match value {
            Value::Null => Some("FSoftObjectPath()".to_string()),
            Value::String(s) => {
                Some(format!("FSoftObjectPath(TEXT(\"{}\"))", escape_cpp_string(s)))
            }
            _ => None,
        },
        TypeDesc::Struct { struct_path } => special_struct_constructor(struct_path, value),
        _ => None,
    }
}

/// Single-expression construction of a value. Returns the expression and
/// whether it fully covers the value (container constructors are "complete"
/// yet still need their items appended by the caller).
fn one_line_construction(
    ctx: &mut EmitterContext<'_>,
    td: &TypeDesc,
    prop_flags: u64,
    value: &Value,
    generate_empty_struct_constructor: bool,
) -> (String, bool) {
    if let Some(text) = handle_special_types(ctx, td, prop_flags, value) {
        return (text, true);
    }
    match td {
        TypeDesc::Struct { .. } => {
            // No single-line form; members are assigned one by one.
            if generate_empty_struct_constructor {
                (format!("{}()", resolve_type_name(ctx.reg, td, prop_flags)), false)
            } else {
                (String::new(), false)
            }
        }
        TypeDesc::Array { .. } | TypeDesc::Set { .. } | TypeDesc::Map { .. } => {
            (format!("{}()", resolve_type_name(ctx.reg, td, prop_flags)), true)
        }
        TypeDesc::Delegate { .. } | TypeDesc::MulticastDelegate { .. } => (String::new(), true),
        _ => (scalar_literal(ctx.reg, td, value), true),
    }
}

#[derive(PartialEq, Eq, Clone, Copy)]
enum StructConstruction {
    /// Default construction is unreliable; run InitializeStruct over raw
    /// storage before assigning members.
    InitializeStruct,
    /// The default constructor is enough.
    EmptyConstructor,
    /// A hand-written constructor covers the whole value.
    Custom,
}

fn struct_construction(reg: &ModelRegistry, td: &TypeDesc) -> StructConstruction {
    let TypeDesc::Struct { struct_path } = td else {
        return StructConstruction::Custom;
    };
    let native_no_export = reg.find_struct(struct_path).is_some_and(|s| {
        s.native && s.flags & bpnative_ue_flags::STRUCT_NO_EXPORT != 0
    });
    if !native_no_export && !has_special_constructor(struct_path) {
        return StructConstruction::InitializeStruct;
    }
    if native_no_export && !has_special_constructor(struct_path) {
        return StructConstruction::EmptyConstructor;
    }
    StructConstruction::Custom
}

/// Construct one container element, spilling to a named local when a single
/// expression cannot finish it.
fn create_element_simple(
    ctx: &mut EmitterContext<'_>,
    td: &TypeDesc,
    prop_flags: u64,
    value: &Value,
) -> String {
    let (mut value_str, complete) = one_line_construction(ctx, td, prop_flags, value, true);
    if value_str.is_empty() {
        ctx.warn(format!("no initialization generated for a {td:?} element"));
    }
    if !complete {
        let local = ctx.generate_unique_local_name();
        ctx.body.add_line(&format!("auto {local} = {value_str};"));
        inner_generate(ctx, td, prop_flags, &local, value, None, None, true);
        value_str = local;
    }
    value_str
}

/// Emit the statements filling `path_to_member` with `value`. `prop_ref`
/// names the declaring type and property for container emission paths that
/// need a runtime property lookup; element recursion passes `None`.
#[allow(clippy::too_many_arguments)]
pub fn inner_generate(
    ctx: &mut EmitterContext<'_>,
    td: &TypeDesc,
    prop_flags: u64,
    path_to_member: &str,
    value: &Value,
    default: Option<&Value>,
    prop_ref: Option<(&str, &str)>,
    without_first_construction_line: bool,
) {
    let reg = ctx.reg;

    if !without_first_construction_line {
        let (value_str, complete) = one_line_construction(ctx, td, prop_flags, value, false);
        if !value_str.is_empty() {
            ctx.body.add_line(&format!("{path_to_member} = {value_str};"));
        }
        // A container constructor is complete but still needs its items.
        if complete && !td.is_container() {
            return;
        }
    }

    if let TypeDesc::Struct { struct_path } = td {
        let Some(model) = reg.find_struct(struct_path) else {
            ctx.warn(format!("struct {struct_path} is missing from the dump"));
            return;
        };
        for p in &model.properties {
            let member_current = value.get(&p.name);
            let member_default = Some(default.and_then(|d| d.get(&p.name)));
            outer_generate(
                ctx,
                PropertyOwner::Struct(model),
                p,
                path_to_member,
                member_current,
                member_default,
                AccessOperator::Dot,
                false,
            );
        }
        return;
    }

    match td {
        TypeDesc::Array { inner } => {
            let Some(items) = value.as_array() else { return };
            if items.is_empty() {
                return;
            }
            if struct_construction(reg, inner) == StructConstruction::InitializeStruct {
                let TypeDesc::Struct { struct_path } = inner.as_ref() else { unreachable!() };
                let struct_path = struct_path.clone();
                let struct_expr = find_globally_mapped_object(
                    ctx,
                    &struct_path,
                    Some(SCRIPT_STRUCT_PATH),
                    true,
                    false,
                )
                .unwrap_or_else(|| panic!("struct {struct_path} never resolved"));
                ctx.body
                    .add_line(&format!("{path_to_member}.AddUninitialized({});", items.len()));
                ctx.body.add_line(&format!(
                    "{struct_expr}->InitializeStruct({path_to_member}.GetData(), {});",
                    items.len()
                ));
                for (i, item) in items.iter().enumerate() {
                    let elem_ref = ctx.generate_unique_local_name();
                    ctx.body.add_line(&format!("auto& {elem_ref} = {path_to_member}[{i}];"));
                    inner_generate(ctx, inner, 0, &elem_ref, item, None, None, true);
                }
            } else {
                ctx.body.add_line(&format!("{path_to_member}.Reserve({});", items.len()));
                for (i, item) in items.iter().enumerate() {
                    let (value_str, complete) =
                        one_line_construction(ctx, inner, prop_flags, item, true);
                    ctx.body.add_line(&format!("{path_to_member}.Add({value_str});"));
                    if !complete {
                        let elem_path = format!("{path_to_member}[{i}]");
                        inner_generate(ctx, inner, prop_flags, &elem_path, item, None, None, true);
                    }
                }
            }
        }
        TypeDesc::Set { inner } => {
            let Some(items) = value.as_array() else { return };
            if items.is_empty() {
                return;
            }
            ctx.body.add_line(&format!("{path_to_member}.Reserve({});", items.len()));
            let init_struct =
                struct_construction(reg, inner) == StructConstruction::InitializeStruct;
            match (init_struct, prop_ref) {
                (true, Some((owner_path, prop_name))) => {
                    let TypeDesc::Struct { struct_path } = inner.as_ref() else { unreachable!() };
                    let cpp_name = resolve_type_name(reg, inner, 0);
                    let struct_path = struct_path.clone();
                    let set_helper = ctx.generate_unique_local_name();
                    let prop_local = generate_get_property_by_name(ctx, owner_path, prop_name);
                    ctx.body.add_line(&format!(
                        "FScriptSetHelper {set_helper}(CastFieldChecked<FSetProperty>({prop_local}), &{path_to_member});"
                    ));
                    for item in items {
                        let elem = ctx.generate_unique_local_name();
                        ctx.body.add_line(&format!(
                            "{cpp_name}& {elem} = *({cpp_name}*){set_helper}.GetElementPtr({set_helper}.AddDefaultValue_Invalid_NeedsRehash());"
                        ));
                        let inner_td = TypeDesc::Struct { struct_path: struct_path.clone() };
                        inner_generate(ctx, &inner_td, 0, &elem, item, None, None, true);
                    }
                    ctx.body.add_line(&format!("{set_helper}.Rehash();"));
                }
                _ => {
                    for item in items {
                        let elem = create_element_simple(ctx, inner, prop_flags, item);
                        ctx.body.add_line(&format!("{path_to_member}.Add({elem});"));
                    }
                }
            }
        }
        TypeDesc::Map { key, value: value_td } => {
            let Some(pairs) = value.as_array() else { return };
            if pairs.is_empty() {
                return;
            }
            ctx.body.add_line(&format!("{path_to_member}.Reserve({});", pairs.len()));
            let key_construction = struct_construction(reg, key);
            let value_construction = struct_construction(reg, value_td);
            let needs_helper = key_construction == StructConstruction::InitializeStruct
                || value_construction == StructConstruction::InitializeStruct;
            match (needs_helper, prop_ref) {
                (true, Some((owner_path, prop_name))) => {
                    let element_type =
                        format!("{}::ElementType", resolve_type_name(reg, td, prop_flags));
                    let map_helper = ctx.generate_unique_local_name();
                    let prop_local = generate_get_property_by_name(ctx, owner_path, prop_name);
                    ctx.body.add_line(&format!(
                        "FScriptMapHelper {map_helper}(CastFieldChecked<FMapProperty>({prop_local}), &{path_to_member});"
                    ));
                    for pair in pairs {
                        let pair_local = ctx.generate_unique_local_name();
                        ctx.body.add_line(&format!(
                            "{element_type}& {pair_local} = *({element_type}*){map_helper}.GetPairPtr({map_helper}.AddDefaultValue_Invalid_NeedsRehash());"
                        ));
                        let key_value = pair.get("key").cloned().unwrap_or(Value::Null);
                        let pair_key_path = format!("{pair_local}.Key");
                        emit_pair_side(ctx, key, key_construction, &pair_key_path, &key_value);
                        let value_value = pair.get("value").cloned().unwrap_or(Value::Null);
                        let pair_value_path = format!("{pair_local}.Value");
                        emit_pair_side(
                            ctx,
                            value_td,
                            value_construction,
                            &pair_value_path,
                            &value_value,
                        );
                    }
                    ctx.body.add_line(&format!("{map_helper}.Rehash();"));
                }
                _ => {
                    for pair in pairs {
                        let key_value = pair.get("key").cloned().unwrap_or(Value::Null);
                        let value_value = pair.get("value").cloned().unwrap_or(Value::Null);
                        let k = create_element_simple(ctx, key, prop_flags, &key_value);
                        let v = create_element_simple(ctx, value_td, prop_flags, &value_value);
                        ctx.body.add_line(&format!("{path_to_member}.Add({k}, {v});"));
                    }
                }
            }
        }
        _ => {}
    }
}

fn emit_pair_side(
    ctx: &mut EmitterContext<'_>,
    td: &TypeDesc,
    construction: StructConstruction,
    path: &str,
    value: &Value,
) {
    let mut complete = false;
    if construction == StructConstruction::Custom {
        let (value_str, one_line_complete) = one_line_construction(ctx, td, 0, value, false);
        if !value_str.is_empty() {
            ctx.body.add_line(&format!("{path} = {value_str};"));
        }
        complete = one_line_complete;
    }
    if !complete {
        inner_generate(ctx, td, 0, path, value, None, None, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bpnative_ue_flags::{CPF_CONFIG, CPF_NATIVE_ACCESS_SPECIFIER_PRIVATE};
    use serde_json::json;

    fn class(json: serde_json::Value) -> ClassModel {
        serde_json::from_value(json).unwrap()
    }

    fn registry() -> ModelRegistry {
        ModelRegistry::new(
            vec![
                class(json!({
                    "path": "/Script/CoreUObject.Object",
                    "name": "Object",
                    "native": true
                })),
                class(json!({
                    "path": "/Game/BP/BP_Foo.BP_Foo_C",
                    "name": "BP_Foo_C",
                    "converted": true,
                    "super_path": "/Script/CoreUObject.Object",
                    "properties": [
                        {"name": "Health", "type": {"kind": "int"}},
                        {"name": "Tags", "type": {"kind": "array", "inner": {"kind": "str"}}}
                    ]
                })),
                class(json!({
                    "path": "/Script/Engine.TestWidget",
                    "name": "TestWidget",
                    "native": true,
                    "properties": [
                        {"name": "bHidden", "type": {"kind": "bool", "bitfield": true},
                         "flags": CPF_NATIVE_ACCESS_SPECIFIER_PRIVATE}
                    ]
                })),
            ],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        )
    }

    fn prop(json: serde_json::Value) -> PropertyModel {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn changed_scalar_emits_assignment() {
        let reg = registry();
        let foo = reg.find_class("/Game/BP/BP_Foo.BP_Foo_C").unwrap();
        let mut ctx = EmitterContext::new(&reg, foo);
        let p = prop(json!({"name": "Health", "type": {"kind": "int"}}));
        let cur = json!(100);
        let def = json!(50);
        outer_generate(
            &mut ctx,
            PropertyOwner::Class(foo),
            &p,
            "",
            Some(&cur),
            Some(Some(&def)),
            AccessOperator::None,
            true,
        );
        assert_eq!(ctx.body.result(), "bpv__Health = 100;\n");
    }

    #[test]
    fn identical_value_emits_nothing() {
        let reg = registry();
        let foo = reg.find_class("/Game/BP/BP_Foo.BP_Foo_C").unwrap();
        let mut ctx = EmitterContext::new(&reg, foo);
        let p = prop(json!({"name": "Health", "type": {"kind": "int"}}));
        let v = json!(50);
        outer_generate(
            &mut ctx,
            PropertyOwner::Class(foo),
            &p,
            "",
            Some(&v),
            Some(Some(&v)),
            AccessOperator::None,
            true,
        );
        assert!(ctx.body.is_empty());
    }

    #[test]
    fn config_property_emits_even_when_identical() {
        let reg = registry();
        let foo = reg.find_class("/Game/BP/BP_Foo.BP_Foo_C").unwrap();
        let mut ctx = EmitterContext::new(&reg, foo);
        let p = prop(json!({"name": "Health", "type": {"kind": "int"}, "flags": CPF_CONFIG}));
        let v = json!(50);
        outer_generate(
            &mut ctx,
            PropertyOwner::Class(foo),
            &p,
            "",
            Some(&v),
            Some(Some(&v)),
            AccessOperator::None,
            true,
        );
        assert_eq!(ctx.body.result(), "bpv__Health = 50;\n");
    }

    #[test]
    fn config_property_without_recorded_value_emits_archetype_default() {
        let reg = registry();
        let foo = reg.find_class("/Game/BP/BP_Foo.BP_Foo_C").unwrap();
        let mut ctx = EmitterContext::new(&reg, foo);
        let p = prop(json!({"name": "Health", "type": {"kind": "int"}, "flags": CPF_CONFIG}));
        let def = json!(50);
        outer_generate(
            &mut ctx,
            PropertyOwner::Class(foo),
            &p,
            "",
            None,
            Some(Some(&def)),
            AccessOperator::None,
            true,
        );
        assert_eq!(ctx.body.result(), "bpv__Health = 50;\n");

        // A non-config property with no recorded value stays untouched.
        let mut ctx = EmitterContext::new(&reg, foo);
        let p = prop(json!({"name": "Health", "type": {"kind": "int"}}));
        outer_generate(
            &mut ctx,
            PropertyOwner::Class(foo),
            &p,
            "",
            None,
            Some(Some(&def)),
            AccessOperator::None,
            true,
        );
        assert!(ctx.body.is_empty());
    }

    #[test]
    fn array_delta_reserves_then_adds_every_element() {
        let reg = registry();
        let foo = reg.find_class("/Game/BP/BP_Foo.BP_Foo_C").unwrap();
        let mut ctx = EmitterContext::new(&reg, foo);
        let p = prop(json!({"name": "Tags", "type": {"kind": "array", "inner": {"kind": "str"}}}));
        let cur = json!(["a", "b"]);
        let def = json!(["a"]);
        outer_generate(
            &mut ctx,
            PropertyOwner::Class(foo),
            &p,
            "",
            Some(&cur),
            Some(Some(&def)),
            AccessOperator::None,
            true,
        );
        let out = ctx.body.result();
        assert!(out.contains("bpv__Tags = TArray<FString>();"));
        assert!(out.contains("bpv__Tags.Reserve(2);"));
        assert!(out.contains("bpv__Tags.Add(FString(TEXT(\"a\")));"));
        assert!(out.contains("bpv__Tags.Add(FString(TEXT(\"b\")));"));
    }

    #[test]
    fn private_bitfield_goes_through_property_accessor() {
        let reg = registry();
        let foo = reg.find_class("/Game/BP/BP_Foo.BP_Foo_C").unwrap();
        let widget = reg.find_class("/Script/Engine.TestWidget").unwrap();
        let mut ctx = EmitterContext::new(&reg, foo);
        let p = prop(json!({
            "name": "bHidden",
            "type": {"kind": "bool", "bitfield": true},
            "flags": CPF_NATIVE_ACCESS_SPECIFIER_PRIVATE
        }));
        let cur = json!(true);
        outer_generate(
            &mut ctx,
            PropertyOwner::Class(widget),
            &p,
            "",
            Some(&cur),
            None,
            AccessOperator::None,
            true,
        );
        let out = ctx.body.result();
        assert!(out.contains(
            "const FProperty* __Local__0 = (UTestWidget::StaticClass())->FindPropertyByName(FName(TEXT(\"bHidden\")));"
        ));
        assert!(out.contains("check(__Local__0);"));
        assert!(out.contains(
            "(((FBoolProperty*)__Local__0)->SetPropertyValue_InContainer((this), true, 0));"
        ));
    }

    #[test]
    fn special_struct_value_is_one_assignment() {
        let reg = registry();
        let foo = reg.find_class("/Game/BP/BP_Foo.BP_Foo_C").unwrap();
        let mut ctx = EmitterContext::new(&reg, foo);
        let p = prop(json!({
            "name": "Location",
            "type": {"kind": "struct", "struct_path": "/Script/CoreUObject.Vector"}
        }));
        let cur = json!({"X": 1.0, "Y": 2.0, "Z": 3.0});
        outer_generate(
            &mut ctx,
            PropertyOwner::Class(foo),
            &p,
            "",
            Some(&cur),
            None,
            AccessOperator::None,
            true,
        );
        assert_eq!(
            ctx.body.result(),
            "bpv__Location = FVector(1.000000, 2.000000, 3.000000);\n"
        );
    }
}
