//! Mock version of a custom converter.
use mockall::mock;

use json_class_mapper::{CustomConverter, FieldValue};
use serde_json::Value;

mock! {
    pub Converter {}
    impl CustomConverter for Converter {
        fn serialize(&self, value: &FieldValue) -> anyhow::Result<Value>;
        fn deserialize(&self, json: &Value) -> anyhow::Result<FieldValue>;
    }
}
