use chainstore_schema::{
    node::{EntityDef, FieldDef, Schema},
    registry::SchemaRegistry,
    types::{FieldKind, IdKind, ScalarKind},
};
use std::sync::{Arc, Once};

/// Fixture schema shared by core tests.
///
/// - `Person`  text id; `age` int, `nickname` optional text
/// - `Account` hex id; `balance` bigint, `owner` optional ref to `Person`
/// - `Token`   bigint id; `owner` ref to `Account`, `tags` optional text list
/// - `Counter` int id; `value` bigint
#[must_use]
pub(crate) fn test_schema() -> Schema {
    Schema::builder()
        .entity(
            EntityDef::new("Person", IdKind::Text)
                .field(FieldDef::new("age", ScalarKind::Int))
                .field(FieldDef::new("nickname", ScalarKind::Text).nullable()),
        )
        .entity(
            EntityDef::new("Account", IdKind::Hex)
                .field(FieldDef::new("balance", ScalarKind::BigInt))
                .field(FieldDef::new("owner", FieldKind::reference("Person")).nullable()),
        )
        .entity(
            EntityDef::new("Token", IdKind::BigInt)
                .field(FieldDef::new("owner", FieldKind::reference("Account")))
                .field(FieldDef::new("tags", FieldKind::List(ScalarKind::Text)).nullable()),
        )
        .entity(
            EntityDef::new("Counter", IdKind::Int)
                .field(FieldDef::new("value", ScalarKind::BigInt)),
        )
        .build()
        .expect("fixture schema should validate")
}

fn def(name: &str) -> Arc<EntityDef> {
    Arc::clone(
        test_schema()
            .resolve(name)
            .expect("fixture entity should resolve"),
    )
}

#[must_use]
pub(crate) fn person_def() -> Arc<EntityDef> {
    def("Person")
}

#[must_use]
pub(crate) fn account_def() -> Arc<EntityDef> {
    def("Account")
}

/// Route `tracing` output through the test harness writer once per binary.
pub(crate) fn init_tracing() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
