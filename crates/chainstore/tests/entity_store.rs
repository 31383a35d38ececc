use chainstore::{
    core::db::DbOptions,
    error::{ErrorKind, ErrorOrigin},
    prelude::*,
};
use proptest::prelude::*;
use std::{io, sync::Once};

const SCHEMA: &str = r#"
    [[entity]]
    name = "Person"
    id = "text"

    [[entity.field]]
    name = "age"
    kind = "int"

    [[entity.field]]
    name = "nickname"
    kind = "text?"

    [[entity]]
    name = "Account"
    id = "hex"

    [[entity.field]]
    name = "balance"
    kind = "bigint"

    [[entity]]
    name = "Token"
    id = "bigint"

    [[entity.field]]
    name = "owner"
    kind = "ref:Account"

    [[entity.field]]
    name = "tags"
    kind = "text[]"
    nullable = true
"#;

fn store() -> Store {
    static TRACING: Once = Once::new();
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });

    let config = StoreConfig::from_toml_str(SCHEMA).expect("fixture config should parse");
    Store::open(&config).expect("fixture store should open")
}

#[test]
fn handler_lifecycle_for_one_person() {
    let store = store();
    let unit = store.begin_unit("block-100");
    let people = unit.entity("Person").unwrap();

    people.create("Jim", Data::from([("age", 34)])).unwrap();
    let birthday = Update::map(|jim| Data::from([("age", jim.i64("age").unwrap_or(0) + 1)]));
    people.update("Jim", birthday).unwrap();

    let jim = people.find_unique("Jim").unwrap().expect("Jim should exist");
    assert_eq!(jim.i64("age"), Some(35));
    assert_eq!(jim.get("nickname"), Some(&Value::Null));

    let sara = people.find_unique("Sara").unwrap();
    assert!(sara.is_none());

    let err = people
        .update("Sara", Data::from([("age", 1)]))
        .expect_err("update of a missing record should fail");
    assert!(err.is_not_found());
    assert_eq!(err.origin, ErrorOrigin::Table);

    let report = unit.finish();
    assert_eq!(report.label, "block-100");
    assert_eq!(report.calls, 5);
    assert_eq!(report.errors, 1);
}

#[test]
fn account_balances_accumulate_across_units() {
    let store = store();
    let credit = |amount: i64| {
        Update::with(move |account: &Record| -> Result<Data, Error> {
            let balance = account
                .int("balance")
                .ok_or_else(|| {
                    Error::new(ErrorKind::Internal, ErrorOrigin::Facade, "no balance")
                })?;

            Ok(Data::new().with("balance", balance + Int::from(amount)))
        })
    };

    // block 1 creates from the create data; later blocks apply the credit
    for (block, amount) in [(1, 50), (2, -30), (3, 5)] {
        let unit = store.begin_unit(format!("block-{block}"));
        let accounts = unit.entity("Account").unwrap();

        accounts
            .upsert("0xBEEF", Data::new().with("balance", 100), credit(amount))
            .expect("upsert should succeed");
        let _ = unit.finish();
    }

    let unit = store.begin_unit("read");
    let account = unit
        .entity("Account")
        .unwrap()
        .find_unique("0xbeef")
        .unwrap()
        .expect("account should exist");
    assert_eq!(account.int("balance"), Some(Int::from(75)));
}

#[test]
fn upsert_creates_from_create_data_only_when_absent() {
    let store = store();
    let unit = store.begin_unit("block-1");
    let people = unit.entity("Person").unwrap();

    let created = people
        .upsert(
            "Ann",
            Data::from([("age", 20)]),
            Data::from([("nickname", "unused")]),
        )
        .unwrap();
    assert_eq!(created.i64("age"), Some(20));
    assert_eq!(created.text("nickname"), None);

    let updated = people
        .upsert(
            "Ann",
            Data::from([("age", 99)]),
            Data::from([("nickname", "A")]),
        )
        .unwrap();
    assert_eq!(updated.i64("age"), Some(20));
    assert_eq!(updated.text("nickname"), Some("A"));
}

#[test]
fn large_integer_ids_compare_by_value() {
    let store = store();
    let unit = store.begin_unit("block-1");
    let tokens = unit.entity("Token").unwrap();

    tokens
        .create(7777, Data::from([("owner", "0x01")]))
        .unwrap();

    for id in [
        Value::from(7777),
        Value::from("7777"),
        Value::from(Int::from(7777)),
        Value::from(7777_u64),
    ] {
        let found = tokens.find_unique(id.clone()).unwrap();
        assert!(found.is_some(), "{id:?} should address token 7777");
    }

    let err = tokens
        .create("7777", Data::from([("owner", "0x02")]))
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AlreadyExists);
}

proptest! {
    #[test]
    fn decimal_text_and_integer_ids_are_one_key(id in any::<u64>()) {
        let store = store();
        let unit = store.begin_unit("block-1");
        let tokens = unit.entity("Token").unwrap();

        tokens.create(id, Data::from([("owner", "0x01")])).unwrap();

        let by_text = tokens.find_unique(id.to_string()).unwrap();
        prop_assert!(by_text.is_some());
        prop_assert!(tokens.delete(Int::from(id)).unwrap());
    }
}

#[test]
fn malformed_ids_are_codec_errors() {
    let store = store();
    let unit = store.begin_unit("block-1");

    let err = unit
        .entity("Token")
        .unwrap()
        .find_unique("77x7")
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Codec);

    let err = unit
        .entity("Account")
        .unwrap()
        .find_unique("0xZZ")
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Codec);
}

#[test]
fn delete_is_idempotent_and_frees_the_id() {
    let store = store();
    let unit = store.begin_unit("block-1");
    let people = unit.entity("Person").unwrap();
    people.create("Jim", Data::from([("age", 34)])).unwrap();

    assert!(people.delete("Jim").unwrap());
    assert!(!people.delete("Jim").unwrap());
    assert!(people.find_unique("Jim").unwrap().is_none());

    let again = people.create("Jim", Data::from([("age", 1)])).unwrap();
    assert_eq!(again.i64("age"), Some(1));
}

#[test]
fn rejected_writes_leave_state_unchanged() {
    let store = store();
    let unit = store.begin_unit("block-1");
    let people = unit.entity("Person").unwrap();
    let before = people.create("Jim", Data::from([("age", 34)])).unwrap();

    let err = people
        .update("Jim", Data::from([("height", 180)]))
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(err.message.contains("unknown field 'height'"), "{err}");

    let err = people
        .update(
            "Jim",
            Update::with(|_| Err::<Data, _>(io::Error::other("rpc unavailable"))),
        )
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Handler);
    assert!(err.message.contains("rpc unavailable"), "{err}");

    assert_eq!(people.find_unique("Jim").unwrap(), Some(before));
}

#[test]
fn re_entrant_update_on_the_same_id_conflicts() {
    let store = store();
    let unit = store.begin_unit("block-1");
    let people = unit.entity("Person").unwrap();
    people.create("Jim", Data::from([("age", 34)])).unwrap();

    let nested = people.clone();
    let err = people
        .update(
            "Jim",
            Update::with(move |_| {
                nested.find_unique("Jim")?;
                Ok::<_, Error>(Data::new())
            }),
        )
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(people.find_unique("Jim").unwrap().unwrap().i64("age"), Some(34));
}

#[test]
fn nested_store_errors_keep_their_kind() {
    let store = store();
    let unit = store.begin_unit("block-1");
    let people = unit.entity("Person").unwrap();
    people.create("Jim", Data::from([("age", 34)])).unwrap();
    people.create("Sara", Data::from([("age", 20)])).unwrap();

    let nested = people.clone();
    let err = people
        .update(
            "Jim",
            Update::with(move |_| {
                nested.create("Sara", Data::from([("age", 1)]))?;
                Ok::<_, Error>(Data::new())
            }),
        )
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AlreadyExists);
    assert!(err.is_already_exists());
    assert_eq!(err.message, r#"Person("Sara") already exists"#);

    let err = people
        .update(
            "Jim",
            Update::with(|_| {
                unit.entity("Ghost")?;
                Ok::<_, Error>(Data::new())
            }),
        )
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Schema);
    assert_eq!(err.origin, ErrorOrigin::Registry);

    assert_eq!(people.find_unique("Jim").unwrap().unwrap().i64("age"), Some(34));
    assert_eq!(people.find_unique("Sara").unwrap().unwrap().i64("age"), Some(20));
}

#[test]
fn update_function_may_read_other_entities() {
    let store = store();
    let unit = store.begin_unit("block-1");
    let accounts = unit.entity("Account").unwrap();
    let tokens = unit.entity("Token").unwrap();
    accounts.create("0x01", Data::from([("balance", 5)])).unwrap();
    tokens.create(1, Data::from([("owner", "0x01")])).unwrap();

    let token = tokens
        .update(
            1,
            Update::with(|token| {
                let owner = token.get("owner").cloned().unwrap_or(Value::Null);
                let account = accounts.find_unique(owner)?;
                let tag = match account.and_then(|a| a.int("balance")) {
                    Some(balance) => format!("balance:{balance}"),
                    None => "orphan".to_string(),
                };

                Ok::<_, Error>(Data::new().with("tags", Value::from_list([tag])))
            }),
        )
        .unwrap();

    assert_eq!(token.get("tags"), Some(&Value::from_list(["balance:5"])));
}

#[test]
fn unknown_entities_are_schema_errors() {
    let store = store();
    let unit = store.begin_unit("block-1");

    let err = unit.entity("Pool").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Schema);
}

#[test]
fn metrics_follow_store_options() {
    let store = store();
    let unit = store.begin_unit("block-1");
    let people = unit.entity("Person").unwrap();
    people.create("Jim", Data::from([("age", 34)])).unwrap();
    people.find_unique("Jim").unwrap();
    people.find_unique("Sara").unwrap();

    let report = store.metrics().expect("metrics are on by default");
    let person = report.entity("Person").expect("Person should have counters");
    assert_eq!(person.create_calls, 1);
    assert_eq!(person.find_calls, 2);
    assert_eq!(person.misses, 1);
    assert_eq!(store.storage_report().rows("Person"), Some(1));

    let quiet = Store::from_schema(store.schema().clone(), DbOptions::default().without_metrics())
        .unwrap();
    assert!(quiet.metrics().is_none());
}
