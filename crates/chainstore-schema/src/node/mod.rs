mod entity;
mod field;
mod schema;

pub use entity::EntityDef;
pub use field::FieldDef;
pub use schema::Schema;
