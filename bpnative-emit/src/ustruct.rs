// Converted user-defined structs: the C++ declaration and the default
// constructor that replays the struct's authored default values.

use bpnative_model::{ClassModel, ModelRegistry, StructModel};

use crate::context::EmitterContext;
use crate::defaults::{outer_generate, AccessOperator, PropertyOwner};
use crate::naming;
use crate::resolver::resolve_type_name;

/// Finished text of one converted struct, ready for the file writer.
pub struct StructOutput {
    pub header: String,
    pub body: String,
    pub warnings: Vec<String>,
}

// Struct emission reuses the class-bound context; the carrier stands in for
// the type being emitted so self-references resolve by path.
fn carrier_class(strct: &StructModel) -> ClassModel {
    ClassModel {
        path: strct.path.clone(),
        name: strct.name.clone(),
        flags: 0,
        native: false,
        converted: strct.converted,
        super_path: None,
        interfaces: Vec::new(),
        properties: Vec::new(),
        cdo: None,
        scs_nodes: Vec::new(),
        component_templates: Vec::new(),
        timelines: Vec::new(),
        dynamic_binding_objects: Vec::new(),
        dependencies: Vec::new(),
        used_assets: Vec::new(),
        ppo_exported: Vec::new(),
    }
}

/// Constructor declaration into the header buffer and the member-by-member
/// definition into the body buffer. Values come from the struct's authored
/// default instance; every recorded value is emitted, since the raw struct
/// memory before construction carries no meaningful defaults.
pub fn generate_user_struct_constructor(
    ctx: &mut EmitterContext<'_>,
    strct: &StructModel,
) {
    let reg = ctx.reg;
    let struct_cpp_name = naming::struct_cpp_name(strct);

    ctx.header.add_line(&format!("{struct_cpp_name}();"));

    ctx.body.add_line(&format!("{struct_cpp_name}::{struct_cpp_name}()"));
    ctx.body.open_brace();
    let default_values = strct.default_instance.map(|i| &reg.object(i).values);
    for prop in &strct.properties {
        outer_generate(
            ctx,
            PropertyOwner::Struct(strct),
            prop,
            "",
            default_values.and_then(|v| v.get(&prop.name)),
            None,
            AccessOperator::None,
            true,
        );
    }
    ctx.body.close_brace();
}

/// The full generated header/source text for one converted struct: the
/// `USTRUCT` declaration with its members plus the constructor pair.
pub fn emit_struct(reg: &ModelRegistry, strct: &StructModel) -> StructOutput {
    let carrier = carrier_class(strct);
    let mut ctx = EmitterContext::new(reg, &carrier);
    let struct_cpp_name = naming::struct_cpp_name(strct);

    ctx.header.add_line("USTRUCT(BlueprintInternalUseOnly)");
    ctx.header.add_line(&format!("struct {struct_cpp_name}"));
    ctx.header.add_line("{");
    ctx.header.add_line("public:");
    ctx.header.increase_indent();
    ctx.header.add_line("GENERATED_BODY()");

    let mut ctor = EmitterContext::new(reg, &carrier);
    generate_user_struct_constructor(&mut ctor, strct);
    for line in ctor.header.result().lines() {
        ctx.header.add_line(line);
    }

    for prop in &strct.properties {
        let type_name = resolve_type_name(reg, &prop.type_desc, prop.flags);
        let member = naming::member_cpp_name(!strct.native, &prop.name);
        ctx.header.add_line("UPROPERTY(EditAnywhere, BlueprintReadWrite)");
        if prop.array_dim > 1 {
            ctx.header.add_line(&format!("{type_name} {member}[{}];", prop.array_dim));
        } else {
            ctx.header.add_line(&format!("{type_name} {member};"));
        }
    }
    ctx.header.decrease_indent();
    ctx.header.add_line("};");

    let mut warnings = ctor.warnings;
    warnings.append(&mut ctx.warnings);
    StructOutput {
        header: ctx.header.result(),
        body: ctor.body.result(),
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bpnative_model::{ObjectModel, StructModel};
    use serde_json::json;

    fn registry() -> ModelRegistry {
        let strct: StructModel = serde_json::from_value(json!({
            "path": "/Game/Structs/ItemData.ItemData",
            "name": "ItemData",
            "converted": true,
            "properties": [
                {"name": "Count", "type": {"kind": "int"}},
                {"name": "Label", "type": {"kind": "str"}}
            ],
            "default_instance": 0
        }))
        .unwrap();
        let defaults: ObjectModel = serde_json::from_value(json!({
            "path": "/Game/Structs/ItemData.Default__ItemData",
            "name": "Default__ItemData",
            "package": "/Game/Structs/ItemData",
            "class_path": "/Script/Engine.UserDefinedStruct",
            "values": {"Count": 3, "Label": "Crate"}
        }))
        .unwrap();
        ModelRegistry::new(Vec::new(), vec![strct], Vec::new(), vec![defaults])
    }

    #[test]
    fn constructor_replays_authored_defaults() {
        let reg = registry();
        let strct = reg.find_struct("/Game/Structs/ItemData.ItemData").unwrap();
        let out = emit_struct(&reg, strct);

        let cpp = naming::struct_cpp_name(strct);
        assert!(out.header.contains(&format!("struct {cpp}")));
        assert!(out.header.contains(&format!("{cpp}();")));
        assert!(out.body.contains(&format!("{cpp}::{cpp}()")));
        assert!(out.body.contains("bpv__Count = 3;"));
        assert!(out.body.contains("bpv__Label = FString(TEXT(\"Crate\"));"));
    }

    #[test]
    fn members_are_declared_with_resolved_types() {
        let reg = registry();
        let strct = reg.find_struct("/Game/Structs/ItemData.ItemData").unwrap();
        let out = emit_struct(&reg, strct);
        assert!(out.header.contains("int32 bpv__Count;"));
        assert!(out.header.contains("FString bpv__Label;"));
    }
}
