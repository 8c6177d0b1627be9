// ── Outbound set-value requests ──

use hcws_api::{Action, Message};
use serde_json::{Map, Value};

/// Control endpoint for value writes.
pub const VALUES_RESOURCE: &str = "/ro/values";

/// Build the `POST /ro/values` request writing `value` to entity `uid`.
pub fn set_value_message(uid: u32, value: Value) -> Message {
    let mut data = Map::with_capacity(2);
    data.insert("uid".to_owned(), Value::from(uid));
    data.insert("value".to_owned(), value);
    Message::new(VALUES_RESOURCE, Action::Post).with_data(Value::Object(data))
}
