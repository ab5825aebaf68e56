//! Property-based tests: universal invariants checked across generated
//! schemas and values.

use proptest::prelude::*;

use contrail::codec::{decode as decode_mod, ByteReader};
use contrail::schema::{check, FieldSchema, RecordSchema, Schema, UnionSchema};
use contrail::{
    decode, decode_resolved, encode, fingerprint64, ConversionRegistry, NamedTypes, Value,
};
use serde_json::json;

// ============================================================================
// Generators
// ============================================================================

/// Valid identifier names.
fn arb_name() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_]{0,12}"
}

/// A primitive schema together with a value valid under it.
fn arb_primitive_pair() -> impl Strategy<Value = (Schema, Value)> {
    prop_oneof![
        Just((Schema::Null, Value::Null)),
        any::<bool>().prop_map(|b| (Schema::Boolean, Value::Boolean(b))),
        any::<i32>().prop_map(|v| (Schema::Int, Value::Int(v))),
        any::<i64>().prop_map(|v| (Schema::Long, Value::Long(v))),
        any::<f32>()
            .prop_filter("NaN breaks value equality", |f| !f.is_nan())
            .prop_map(|v| (Schema::Float, Value::Float(v))),
        any::<f64>()
            .prop_filter("NaN breaks value equality", |f| !f.is_nan())
            .prop_map(|v| (Schema::Double, Value::Double(v))),
        prop::collection::vec(any::<u8>(), 0..64).prop_map(|b| (Schema::Bytes, Value::Bytes(b))),
        ".{0,32}".prop_map(|s| (Schema::String, Value::String(s))),
    ]
}

/// A record schema over primitive fields, with a matching value.
fn arb_record_pair() -> impl Strategy<Value = (Schema, Value)> {
    (
        arb_name(),
        prop::collection::vec((arb_name(), arb_primitive_pair()), 1..6),
    )
        .prop_filter("field names must be unique", |(_, fields)| {
            let mut seen = std::collections::HashSet::new();
            fields.iter().all(|(name, _)| seen.insert(name.clone()))
        })
        .prop_map(|(name, fields)| {
            let mut field_schemas = Vec::new();
            let mut field_values = Vec::new();
            for (field_name, (schema, value)) in fields {
                field_schemas.push(FieldSchema::new(field_name.clone(), schema));
                field_values.push((field_name, value));
            }
            (
                Schema::Record(RecordSchema::new(name, field_schemas)),
                Value::Record(field_values),
            )
        })
}

/// Stretch a canonical zig-zag varint encoding with redundant zero
/// continuation groups, up to `max_groups`.
fn stretch_varint(canonical: &[u8], max_groups: usize) -> Vec<u8> {
    let mut out = canonical.to_vec();
    if out.len() >= max_groups {
        return out;
    }
    let last = out.len() - 1;
    out[last] |= 0x80;
    while out.len() < max_groups - 1 {
        out.push(0x80);
    }
    out.push(0x00);
    out
}

// ============================================================================
// Round trips
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn primitive_round_trip((schema, value) in arb_primitive_pair()) {
        let bytes = encode(&schema, &value).unwrap();
        let (decoded, consumed) = decode(&schema, &bytes).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn record_round_trip((schema, value) in arb_record_pair()) {
        let bytes = encode(&schema, &value).unwrap();
        let (decoded, consumed) = decode(&schema, &bytes).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn array_round_trip(values in prop::collection::vec(any::<i64>(), 0..32)) {
        let schema = Schema::Array(Box::new(Schema::Long));
        let value = Value::Array(values.into_iter().map(Value::Long).collect());
        let bytes = encode(&schema, &value).unwrap();
        let (decoded, _) = decode(&schema, &bytes).unwrap();
        prop_assert_eq!(decoded, value);
    }

    #[test]
    fn resolved_decode_agrees_with_direct_decode((schema, value) in arb_record_pair()) {
        let bytes = encode(&schema, &value).unwrap();
        prop_assert_eq!(
            decode(&schema, &bytes).unwrap(),
            decode_resolved(&schema, &schema, &bytes).unwrap()
        );
    }
}

// ============================================================================
// Varint redundancy
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn overlong_int_encodings_agree(value in any::<i32>(), groups in 1usize..=5) {
        let canonical = encode(&Schema::Int, &Value::Int(value)).unwrap();
        let stretched = stretch_varint(&canonical, groups.max(canonical.len()));
        let (decoded, consumed) = decode(&Schema::Int, &stretched).unwrap();
        prop_assert_eq!(decoded, Value::Int(value));
        prop_assert_eq!(consumed, stretched.len());
    }

    #[test]
    fn overlong_long_encodings_agree(value in any::<i64>(), groups in 1usize..=10) {
        let canonical = encode(&Schema::Long, &Value::Long(value)).unwrap();
        let stretched = stretch_varint(&canonical, groups.max(canonical.len()));
        let (decoded, _) = decode(&Schema::Long, &stretched).unwrap();
        prop_assert_eq!(decoded, Value::Long(value));
    }
}

// ============================================================================
// Evolution properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Adding one defaulted field to the reader is always resolvable, and
    /// decoding populates the new field from its default.
    #[test]
    fn monotonic_widening_is_always_resolvable((schema, value) in arb_record_pair()) {
        let Schema::Record(record) = &schema else { unreachable!() };
        prop_assume!(record.fields.iter().all(|f| f.name != "added"));

        let mut wider = record.fields.clone();
        wider.push(FieldSchema::new("added", Schema::Long).with_default(json!(77)));
        let reader = Schema::Record(RecordSchema::new(record.name.clone(), wider));

        let result = check(&schema, &reader);
        prop_assert!(result.is_compatible());

        let bytes = encode(&schema, &value).unwrap();
        let (evolved, _) = decode_resolved(&schema, &reader, &bytes).unwrap();
        prop_assert_eq!(evolved.field("added"), Some(&Value::Long(77)));
    }

    /// Adding a field with no default is rejected with exactly one
    /// incompatibility at the new field's path.
    #[test]
    fn non_widening_is_rejected((schema, _) in arb_record_pair()) {
        let Schema::Record(record) = &schema else { unreachable!() };
        prop_assume!(record.fields.iter().all(|f| f.name != "added"));

        let mut wider = record.fields.clone();
        wider.push(FieldSchema::new("added", Schema::Long));
        let reader = Schema::Record(RecordSchema::new(record.name.clone(), wider));

        let result = check(&schema, &reader);
        prop_assert!(!result.is_compatible());
        prop_assert_eq!(result.incompatibilities.len(), 1);
        prop_assert_eq!(result.incompatibilities[0].path.as_str(), "added");
    }

    /// Int data is readable wherever the reader widened the type.
    #[test]
    fn int_widens_everywhere(value in any::<i32>()) {
        let bytes = encode(&Schema::Int, &Value::Int(value)).unwrap();
        let (as_long, _) = decode_resolved(&Schema::Int, &Schema::Long, &bytes).unwrap();
        prop_assert_eq!(as_long, Value::Long(value as i64));
        let (as_double, _) = decode_resolved(&Schema::Int, &Schema::Double, &bytes).unwrap();
        prop_assert_eq!(as_double, Value::Double(value as f64));
    }

    /// A nullable reader union always accepts the writer's plain value
    /// through the non-null branch.
    #[test]
    fn nullable_union_accepts_the_plain_writer((schema, value) in arb_primitive_pair()) {
        prop_assume!(!matches!(schema, Schema::Null));
        let reader = Schema::Union(
            UnionSchema::new(vec![Schema::Null, schema.clone()]).unwrap(),
        );
        let bytes = encode(&schema, &value).unwrap();
        let (decoded, _) = decode_resolved(&schema, &reader, &bytes).unwrap();
        prop_assert_eq!(decoded, Value::Union(1, Box::new(value)));
    }
}

// ============================================================================
// Skip / fingerprint properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Skipping consumes exactly as many bytes as decoding.
    #[test]
    fn skip_consumes_what_decode_consumes((schema, value) in arb_record_pair()) {
        let bytes = encode(&schema, &value).unwrap();
        let names = NamedTypes::from_schema(&schema);
        let registry = ConversionRegistry::with_defaults();

        let mut decode_cursor = ByteReader::new(&bytes);
        decode_mod::decode_value(&mut decode_cursor, &schema, &names, &registry).unwrap();

        let mut skip_cursor = ByteReader::new(&bytes);
        decode_mod::skip_value(&mut skip_cursor, &schema, &names).unwrap();

        prop_assert_eq!(decode_cursor.position(), skip_cursor.position());
    }

    /// Documentation and aliases never change the fingerprint.
    #[test]
    fn fingerprint_ignores_metadata((schema, _) in arb_record_pair(), doc in ".{0,16}") {
        let Schema::Record(record) = &schema else { unreachable!() };
        let decorated = Schema::Record(
            RecordSchema::new(
                record.name.clone(),
                record
                    .fields
                    .iter()
                    .map(|f| {
                        FieldSchema::new(f.name.clone(), f.schema.clone())
                            .with_doc(doc.clone())
                            .with_aliases(vec!["legacy".to_string()])
                    })
                    .collect(),
            )
            .with_doc(doc.clone()),
        );
        prop_assert_eq!(fingerprint64(&schema), fingerprint64(&decorated));
    }
}
