// Type-directed identity comparison over raw property values. This is the
// delta test: a property is only re-emitted when its CDO value is not
// identical to the parent default under its own kind's equality.

use serde_json::Value;

use crate::registry::ModelRegistry;
use crate::types::TypeDesc;

/// Parse a float value. JSON numbers cannot encode NaN or the infinities, so
/// the exporter writes those as strings.
pub fn parse_float(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => match s.as_str() {
            "NaN" | "nan" => Some(f64::NAN),
            "Inf" | "+Inf" | "inf" => Some(f64::INFINITY),
            "-Inf" | "-inf" => Some(f64::NEG_INFINITY),
            other => other.parse::<f64>().ok(),
        },
        _ => None,
    }
}

/// Resolve an enum-typed value (entry name or raw number) to its numeric
/// value.
pub fn enum_numeric(reg: &ModelRegistry, enum_path: &str, v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => {
            let e = reg.find_enum(enum_path)?;
            // Entry names may be qualified ("EFoo::Bar") or bare ("Bar").
            let short = s.rsplit("::").next().unwrap_or(s);
            e.entries
                .iter()
                .find(|entry| {
                    entry.name == *s || entry.name.rsplit("::").next().unwrap_or(&entry.name) == short
                })
                .map(|entry| entry.value)
        }
        _ => None,
    }
}

/// `Identical` over optional raw values. A missing current value means the
/// object kept its archetype default; a missing default with a present
/// current value always emits.
pub fn identical_opt(
    reg: &ModelRegistry,
    td: &TypeDesc,
    current: Option<&Value>,
    default: Option<&Value>,
) -> bool {
    match (current, default) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(a), Some(b)) => identical(reg, td, a, b),
    }
}

/// `Identical` over two present raw values, per the kind's own equality
/// semantics. Float NaN is never identical to anything, NaN included.
pub fn identical(reg: &ModelRegistry, td: &TypeDesc, a: &Value, b: &Value) -> bool {
    match td {
        TypeDesc::Bool { .. } => a.as_bool() == b.as_bool(),
        TypeDesc::Byte { enum_path: Some(path) } | TypeDesc::Enum { enum_path: path } => {
            match (enum_numeric(reg, path, a), enum_numeric(reg, path, b)) {
                (Some(x), Some(y)) => x == y,
                _ => a == b,
            }
        }
        TypeDesc::Byte { enum_path: None }
        | TypeDesc::Int8
        | TypeDesc::Int16
        | TypeDesc::Int
        | TypeDesc::Int64 => a.as_i64() == b.as_i64(),
        TypeDesc::UInt16 | TypeDesc::UInt32 | TypeDesc::UInt64 => a.as_u64() == b.as_u64(),
        TypeDesc::Float | TypeDesc::Double => match (parse_float(a), parse_float(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
        TypeDesc::Name | TypeDesc::Str | TypeDesc::Text => a.as_str() == b.as_str(),
        TypeDesc::Object { .. }
        | TypeDesc::Class { .. }
        | TypeDesc::SoftObject { .. }
        | TypeDesc::SoftClass { .. }
        | TypeDesc::WeakObject { .. }
        | TypeDesc::Interface { .. } => {
            // Object references serialize as path strings or null.
            a == b
        }
        TypeDesc::Struct { struct_path } => struct_identical(reg, struct_path, a, b),
        TypeDesc::Array { inner } | TypeDesc::Set { inner } => {
            match (a.as_array(), b.as_array()) {
                (Some(xs), Some(ys)) => {
                    xs.len() == ys.len()
                        && xs.iter().zip(ys).all(|(x, y)| identical(reg, inner, x, y))
                }
                _ => a == b,
            }
        }
        TypeDesc::Map { key, value } => match (a.as_array(), b.as_array()) {
            (Some(xs), Some(ys)) => {
                xs.len() == ys.len()
                    && xs.iter().zip(ys).all(|(x, y)| {
                        let (xk, xv) = (x.get("key"), x.get("value"));
                        let (yk, yv) = (y.get("key"), y.get("value"));
                        match (xk, xv, yk, yv) {
                            (Some(xk), Some(xv), Some(yk), Some(yv)) => {
                                identical(reg, key, xk, yk) && identical(reg, value, xv, yv)
                            }
                            _ => x == y,
                        }
                    })
            }
            _ => a == b,
        },
        // Delegates are bound dynamically, never literal-initialized; their
        // raw values are irrelevant to delta emission.
        TypeDesc::Delegate { .. } | TypeDesc::MulticastDelegate { .. } => true,
        TypeDesc::FieldPath => a == b,
    }
}

/// Identity for struct values: recurse per known property, fall back to raw
/// equality for structs outside the dump.
fn struct_identical(reg: &ModelRegistry, struct_path: &str, a: &Value, b: &Value) -> bool {
    let Some(model) = reg.find_struct(struct_path) else {
        return a == b;
    };
    let (Some(am), Some(bm)) = (a.as_object(), b.as_object()) else {
        return a == b;
    };
    model.properties.iter().all(|p| {
        identical_opt(reg, &p.type_desc, am.get(&p.name), bm.get(&p.name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn empty_registry() -> ModelRegistry {
        ModelRegistry::new(Vec::new(), Vec::new(), Vec::new(), Vec::new())
    }

    #[test]
    fn parse_float_handles_non_finite_strings() {
        assert!(parse_float(&json!("NaN")).unwrap().is_nan());
        assert_eq!(parse_float(&json!("Inf")), Some(f64::INFINITY));
        assert_eq!(parse_float(&json!("-Inf")), Some(f64::NEG_INFINITY));
        assert_eq!(parse_float(&json!(1.5)), Some(1.5));
    }

    #[test]
    fn nan_is_never_identical() {
        let reg = empty_registry();
        assert!(!identical(&reg, &TypeDesc::Float, &json!("NaN"), &json!("NaN")));
        assert!(!identical(&reg, &TypeDesc::Float, &json!("NaN"), &json!(0.0)));
    }

    #[test]
    fn missing_current_is_identical_missing_default_is_not() {
        let reg = empty_registry();
        assert!(identical_opt(&reg, &TypeDesc::Int, None, Some(&json!(5))));
        assert!(!identical_opt(&reg, &TypeDesc::Int, Some(&json!(5)), None));
    }

    #[test]
    fn arrays_compare_elementwise() {
        let reg = empty_registry();
        let td = TypeDesc::Array { inner: Box::new(TypeDesc::Int) };
        assert!(identical(&reg, &td, &json!([1, 2, 3]), &json!([1, 2, 3])));
        assert!(!identical(&reg, &td, &json!([1, 2, 3]), &json!([1, 2, 4])));
        assert!(!identical(&reg, &td, &json!([1, 2]), &json!([1, 2, 3])));
    }

    #[test]
    fn object_references_compare_by_path() {
        let reg = empty_registry();
        let td = TypeDesc::Object { class_path: "/Script/Engine.Actor".into() };
        assert!(identical(&reg, &td, &json!("/Game/A.A"), &json!("/Game/A.A")));
        assert!(!identical(&reg, &td, &json!("/Game/A.A"), &json!(null)));
    }
}
