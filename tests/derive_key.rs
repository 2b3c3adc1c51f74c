use std::thread;

use moka::sync::Cache;
use querykey::{
    AdditionalParameters, CacheKeyDeriver, CompositeKey, Config, KeyState, KeyValue,
    ParameterMapping, RowBounds, SqlSource, StatementInvocation, Structured,
};
use serde::Serialize;
use serde_json::json;

const CONFIG: &str = r#"
[key]
sql_fallback = "template"

[[statements]]
id = "ns.selectUser"
sql = "SELECT * FROM user WHERE id = #{id}"

[[statements]]
id = "ns.selectByName"
sql = "SELECT * FROM user WHERE name = #{name} AND org = #{org.id}"
"#;

fn deriver() -> CacheKeyDeriver {
    let config = Config::from_toml_str(CONFIG).unwrap();
    CacheKeyDeriver::new(KeyState::from_config(&config).unwrap())
}

#[derive(Serialize)]
struct Org {
    id: i64,
}

#[derive(Serialize)]
struct UserQuery {
    name: String,
    org: Org,
}

#[test]
fn keys_work_in_a_real_cache() {
    let deriver = deriver();
    let cache: Cache<CompositeKey, Vec<String>> = Cache::new(100);
    let mappings = [ParameterMapping::new("id")];

    let key_for = |id: i64| {
        let param = json!({ "id": id });
        deriver.derive_key(
            &StatementInvocation::new("ns.selectUser", "SELECT * FROM user WHERE id = ?")
                .with_mappings(&mappings)
                .with_parameter(&param),
        )
    };

    cache.insert(key_for(5), vec!["alice".to_string()]);
    cache.insert(key_for(6), vec!["bob".to_string()]);

    assert_eq!(cache.get(&key_for(5)), Some(vec!["alice".to_string()]));
    assert_eq!(cache.get(&key_for(6)), Some(vec!["bob".to_string()]));
    assert_eq!(cache.get(&key_for(7)), None);
}

#[test]
fn struct_parameters_with_nested_properties() {
    let deriver = deriver();
    let query = UserQuery {
        name: "alice".to_string(),
        org: Org { id: 9 },
    };
    let param = Structured::new(&query).unwrap();

    let derivation =
        deriver.derive(&StatementInvocation::new("ns.selectByName", "").with_parameter(&param));

    assert!(matches!(derivation.sql_source, SqlSource::Resolved(_)));
    assert!(derivation.is_exact());
    assert_eq!(
        derivation.key.components()[3..],
        [
            KeyValue::from("SELECT * FROM user WHERE name = ? AND org = ?"),
            KeyValue::from("alice"),
            KeyValue::Integer64(9),
        ]
    );
}

#[test]
fn pagination_is_part_of_the_key() {
    let deriver = deriver();
    let param = 42i64;
    let mappings = [ParameterMapping::new("id")];
    let page = |offset, limit| {
        deriver.derive_key(
            &StatementInvocation::new("ns.selectUser", "SELECT * FROM user WHERE id = ?")
                .with_bounds(RowBounds::new(offset, limit))
                .with_mappings(&mappings)
                .with_parameter(&param),
        )
    };
    assert_eq!(page(0, 10), page(0, 10));
    assert_ne!(page(0, 10), page(10, 10));
    assert_ne!(page(0, 10), page(0, 20));
}

#[test]
fn foreach_items_come_from_additional_parameters() {
    let deriver = deriver();
    let param = json!({ "ids": [1, 2] });
    let mappings = [
        ParameterMapping::new("__frch_id_0"),
        ParameterMapping::new("__frch_id_1"),
    ];
    let key_for = |first: i64, second: i64| {
        let additional: AdditionalParameters =
            [("__frch_id_0", first), ("__frch_id_1", second)].into_iter().collect();
        deriver.derive_key(
            &StatementInvocation::new("ns.selectIn", "SELECT * FROM user WHERE id IN (?, ?)")
                .with_mappings(&mappings)
                .with_parameter(&param)
                .with_additional_parameters(&additional),
        )
    };
    assert_eq!(key_for(1, 2), key_for(1, 2));
    assert_ne!(key_for(1, 2), key_for(2, 1));
}

#[test]
fn concurrent_derivations_agree() {
    let deriver = deriver();
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let deriver = deriver.clone();
            thread::spawn(move || {
                let mappings = [ParameterMapping::new("id")];
                let param = json!({ "id": 5 });
                deriver.derive_key(
                    &StatementInvocation::new("ns.selectUser", "")
                        .with_mappings(&mappings)
                        .with_parameter(&param),
                )
            })
        })
        .collect();

    let keys: Vec<CompositeKey> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(keys.windows(2).all(|pair| pair[0] == pair[1]));
}
