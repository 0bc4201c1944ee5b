// Literal text synthesis: scalar literals, string escaping, and the
// hand-written constructor formats for well-known core structs. The formats
// here are fixed output contracts; downstream tooling matches them textually.

use bpnative_model::value::parse_float;
use bpnative_model::{EnumCppForm, ModelRegistry, TypeDesc};
use serde_json::Value;

use crate::naming;

/// `%f`-format a float for use inside a struct constructor. NaN cannot
/// round-trip through decimal text, so it collapses to a commented zero.
pub fn float_to_string(value: f64) -> String {
    if value.is_nan() {
        return "/*The original value was NaN!*/ 0.0f".to_string();
    }
    format!("{value:.6}")
}

/// A standalone float literal (with the `f` suffix NaN excepted).
pub fn float_literal(value: f64) -> String {
    if value.is_nan() {
        return "/*The original value was NaN!*/ 0.0f".to_string();
    }
    format!("{value:.6}f")
}

/// Escape a string for embedding in a `TEXT("...")` literal.
pub fn escape_cpp_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

fn field_float(v: &Value, key: &str) -> f64 {
    v.get(key).and_then(parse_float).unwrap_or(0.0)
}

fn field_int(v: &Value, key: &str) -> i64 {
    v.get(key).and_then(Value::as_i64).unwrap_or(0)
}

fn field_u32(v: &Value, key: &str) -> u32 {
    v.get(key).and_then(Value::as_u64).unwrap_or(0) as u32
}

fn field_str<'a>(v: &'a Value, key: &str) -> &'a str {
    v.get(key).and_then(Value::as_str).unwrap_or("")
}

fn range_bound(v: &Value, type_name: &str, int_bound: bool) -> String {
    let value_text = if int_bound {
        field_int(v, "Value").to_string()
    } else {
        float_to_string(field_float(v, "Value"))
    };
    match field_str(v, "Type") {
        "Exclusive" => format!("{type_name}::Exclusive({value_text})"),
        "Inclusive" => format!("{type_name}::Inclusive({value_text})"),
        _ => format!("{type_name}::Open()"),
    }
}

const SPECIAL_STRUCTS: &[&str] = &[
    "Vector",
    "Rotator",
    "Transform",
    "Guid",
    "LinearColor",
    "Color",
    "Vector2D",
    "Box2D",
    "FloatRangeBound",
    "FloatRange",
    "Int32RangeBound",
    "Int32Range",
    "FloatInterval",
    "Int32Interval",
    "LatentActionInfo",
];

/// Whether a struct type has a hand-written constructor form.
pub fn has_special_constructor(struct_path: &str) -> bool {
    let short_name = struct_path.rsplit('.').next().unwrap_or(struct_path);
    SPECIAL_STRUCTS.contains(&short_name)
}

/// Hand-written constructor for structs with a recognized literal form.
/// Returns `None` for struct types without one; those fall back to
/// memberwise emission.
pub fn special_struct_constructor(struct_path: &str, value: &Value) -> Option<String> {
    let short_name = struct_path.rsplit('.').next().unwrap_or(struct_path);
    let text = match short_name {
        "Vector" => format!(
            "FVector({}, {}, {})",
            float_to_string(field_float(value, "X")),
            float_to_string(field_float(value, "Y")),
            float_to_string(field_float(value, "Z"))
        ),
        "Rotator" => format!(
            "FRotator({}, {}, {})",
            float_to_string(field_float(value, "Pitch")),
            float_to_string(field_float(value, "Yaw")),
            float_to_string(field_float(value, "Roll"))
        ),
        "Transform" => {
            let rot = value.get("Rotation").cloned().unwrap_or(Value::Null);
            let loc = value.get("Translation").cloned().unwrap_or(Value::Null);
            let scale = value.get("Scale3D").cloned().unwrap_or(Value::Null);
            format!(
                "FTransform( FQuat({},{},{},{}), FVector({},{},{}), FVector({},{},{}) )",
                float_to_string(field_float(&rot, "X")),
                float_to_string(field_float(&rot, "Y")),
                float_to_string(field_float(&rot, "Z")),
                float_to_string(field_float(&rot, "W")),
                float_to_string(field_float(&loc, "X")),
                float_to_string(field_float(&loc, "Y")),
                float_to_string(field_float(&loc, "Z")),
                float_to_string(field_float(&scale, "X")),
                float_to_string(field_float(&scale, "Y")),
                float_to_string(field_float(&scale, "Z"))
            )
        }
        "Guid" => format!(
            "FGuid(0x{:08X}, 0x{:08X}, 0x{:08X}, 0x{:08X})",
            field_u32(value, "A"),
            field_u32(value, "B"),
            field_u32(value, "C"),
            field_u32(value, "D")
        ),
        "LinearColor" => format!(
            "FLinearColor({}, {}, {}, {})",
            float_to_string(field_float(value, "R")),
            float_to_string(field_float(value, "G")),
            float_to_string(field_float(value, "B")),
            float_to_string(field_float(value, "A"))
        ),
        "Color" => format!(
            "FColor({}, {}, {}, {})",
            field_int(value, "R"),
            field_int(value, "G"),
            field_int(value, "B"),
            field_int(value, "A")
        ),
        "Vector2D" => format!(
            "FVector2D({}, {})",
            float_to_string(field_float(value, "X")),
            float_to_string(field_float(value, "Y"))
        ),
        "Box2D" => {
            let min = value.get("Min").cloned().unwrap_or(Value::Null);
            let max = value.get("Max").cloned().unwrap_or(Value::Null);
            let valid = value.get("bIsValid").and_then(Value::as_bool).unwrap_or(false);
            format!(
                "CreateFBox2D(FVector2D({}, {}), FVector2D({}, {}), {})",
                float_to_string(field_float(&min, "X")),
                float_to_string(field_float(&min, "Y")),
                float_to_string(field_float(&max, "X")),
                float_to_string(field_float(&max, "Y")),
                if valid { "true" } else { "false" }
            )
        }
        "FloatRangeBound" => range_bound(value, "FFloatRangeBound", false),
        "FloatRange" => {
            let lower = value.get("LowerBound").cloned().unwrap_or(Value::Null);
            let upper = value.get("UpperBound").cloned().unwrap_or(Value::Null);
            format!(
                "FFloatRange({}, {})",
                range_bound(&lower, "FFloatRangeBound", false),
                range_bound(&upper, "FFloatRangeBound", false)
            )
        }
        "Int32RangeBound" => range_bound(value, "FInt32RangeBound", true),
        "Int32Range" => {
            let lower = value.get("LowerBound").cloned().unwrap_or(Value::Null);
            let upper = value.get("UpperBound").cloned().unwrap_or(Value::Null);
            format!(
                "FInt32Range({}, {})",
                range_bound(&lower, "FInt32RangeBound", true),
                range_bound(&upper, "FInt32RangeBound", true)
            )
        }
        "FloatInterval" => format!(
            "FFloatInterval({}, {})",
            float_to_string(field_float(value, "Min")),
            float_to_string(field_float(value, "Max"))
        ),
        // The engine's own backend emitted FFloatInterval here as well;
        // generated code relies on the implicit int-to-float conversion.
        "Int32Interval" => format!(
            "FFloatInterval({}, {})",
            field_int(value, "Min"),
            field_int(value, "Max")
        ),
        "LatentActionInfo" => format!(
            "FLatentActionInfo({}, {}, TEXT(\"{}\"), this)",
            field_int(value, "Linkage"),
            field_int(value, "UUID"),
            escape_cpp_string(field_str(value, "ExecutionFunction"))
        ),
        _ => return None,
    };
    Some(text)
}

/// Literal for an enum-typed value: the qualified entry name when the value
/// matches a declared entry, otherwise an explicit cast of the raw number.
pub fn enum_literal(reg: &ModelRegistry, enum_path: &str, value: &Value) -> String {
    let Some(enm) = reg.find_enum(enum_path) else {
        return format!("/* unknown enum {enum_path} */ 0");
    };
    let cpp_name = naming::enum_cpp_name(enm);
    let numeric = bpnative_model::value::enum_numeric(reg, enum_path, value);
    if let Some(n) = numeric {
        if let Some(entry) = enm.entries.iter().find(|e| e.value == n) {
            let short = entry.name.rsplit("::").next().unwrap_or(&entry.name);
            return match enm.cpp_form {
                EnumCppForm::Regular => short.to_string(),
                EnumCppForm::Namespaced | EnumCppForm::EnumClass => {
                    format!("{cpp_name}::{short}")
                }
            };
        }
        return format!("static_cast<{cpp_name}>({n})");
    }
    format!("static_cast<{cpp_name}>(0)")
}

/// Literal for a scalar (non-object, non-container, non-struct) value.
/// Callers route object references through the resolver and structs through
/// [`special_struct_constructor`] first.
pub fn scalar_literal(reg: &ModelRegistry, td: &TypeDesc, value: &Value) -> String {
    match td {
        TypeDesc::Bool { .. } => {
            if value.as_bool().unwrap_or(false) { "true" } else { "false" }.to_string()
        }
        TypeDesc::Byte { enum_path: Some(path) } => enum_literal(reg, path, value),
        TypeDesc::Byte { enum_path: None } | TypeDesc::Int8 | TypeDesc::Int16 => {
            value.as_i64().unwrap_or(0).to_string()
        }
        TypeDesc::Int => {
            let v = value.as_i64().unwrap_or(0);
            if v == i64::from(i32::MIN) {
                // i32::MIN has no portable decimal literal in C++.
                "(-2147483647 - 1)".to_string()
            } else {
                v.to_string()
            }
        }
        TypeDesc::Int64 => format!("{}LL", value.as_i64().unwrap_or(0)),
        TypeDesc::UInt16 | TypeDesc::UInt32 => value.as_u64().unwrap_or(0).to_string(),
        TypeDesc::UInt64 => format!("{}ULL", value.as_u64().unwrap_or(0)),
        TypeDesc::Float => float_literal(parse_float(value).unwrap_or(0.0)),
        TypeDesc::Double => float_to_string(parse_float(value).unwrap_or(0.0)),
        TypeDesc::Name => format!(
            "FName(TEXT(\"{}\"))",
            escape_cpp_string(value.as_str().unwrap_or("None"))
        ),
        TypeDesc::Str => format!(
            "FString(TEXT(\"{}\"))",
            escape_cpp_string(value.as_str().unwrap_or(""))
        ),
        TypeDesc::Text => format!(
            "FText::FromString(TEXT(\"{}\"))",
            escape_cpp_string(value.as_str().unwrap_or(""))
        ),
        TypeDesc::Enum { enum_path } => enum_literal(reg, enum_path, value),
        other => panic!("scalar_literal called with non-scalar kind {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn empty_registry() -> ModelRegistry {
        ModelRegistry::new(Vec::new(), Vec::new(), Vec::new(), Vec::new())
    }

    #[test]
    fn nan_substitution_exact_text() {
        assert_eq!(float_to_string(f64::NAN), "/*The original value was NaN!*/ 0.0f");
        assert_eq!(float_literal(f64::NAN), "/*The original value was NaN!*/ 0.0f");
    }

    #[test]
    fn vector_literal_format() {
        let v = json!({"X": 1.0, "Y": -2.5, "Z": 0.0});
        assert_eq!(
            special_struct_constructor("/Script/CoreUObject.Vector", &v).unwrap(),
            "FVector(1.000000, -2.500000, 0.000000)"
        );
    }

    #[test]
    fn vector_with_nan_component() {
        let v = json!({"X": "NaN", "Y": 0.0, "Z": 0.0});
        assert_eq!(
            special_struct_constructor("/Script/CoreUObject.Vector", &v).unwrap(),
            "FVector(/*The original value was NaN!*/ 0.0f, 0.000000, 0.000000)"
        );
    }

    #[test]
    fn guid_uses_hex_fields() {
        let v = json!({"A": 1, "B": 0xDEADBEEFu32, "C": 0, "D": 255});
        assert_eq!(
            special_struct_constructor("/Script/CoreUObject.Guid", &v).unwrap(),
            "FGuid(0x00000001, 0xDEADBEEF, 0x00000000, 0x000000FF)"
        );
    }

    #[test]
    fn float_range_bound_forms() {
        let open = json!({"Type": "Open"});
        assert_eq!(
            special_struct_constructor("/Script/CoreUObject.FloatRangeBound", &open).unwrap(),
            "FFloatRangeBound::Open()"
        );
        let incl = json!({"Type": "Inclusive", "Value": 2.0});
        assert_eq!(
            special_struct_constructor("/Script/CoreUObject.FloatRangeBound", &incl).unwrap(),
            "FFloatRangeBound::Inclusive(2.000000)"
        );
    }

    #[test]
    fn unknown_struct_has_no_special_form() {
        assert!(special_struct_constructor("/Game/S.MyStruct", &json!({})).is_none());
    }

    #[test]
    fn int_min_literal_is_parenthesized_expression() {
        let reg = empty_registry();
        assert_eq!(
            scalar_literal(&reg, &TypeDesc::Int, &json!(i32::MIN)),
            "(-2147483647 - 1)"
        );
        assert_eq!(scalar_literal(&reg, &TypeDesc::Int, &json!(100)), "100");
    }

    #[test]
    fn string_literals_are_escaped() {
        let reg = empty_registry();
        assert_eq!(
            scalar_literal(&reg, &TypeDesc::Str, &json!("say \"hi\"")),
            "FString(TEXT(\"say \\\"hi\\\"\"))"
        );
    }
}
