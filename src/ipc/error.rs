use serde_json::json;

/// Success envelope. Object fields of `result` are flattened next to `success`.
pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    let mut resp = json!({
        "id": id,
        "success": true,
    });
    match result {
        serde_json::Value::Object(fields) => {
            for (k, v) in fields {
                resp[k.as_str()] = v;
            }
        }
        serde_json::Value::Null => {}
        other => {
            resp["result"] = other;
        }
    }
    resp
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut resp = json!({
        "id": id,
        "success": false,
        "error": message.into(),
        "code": code,
    });
    if let Some(d) = details {
        resp["details"] = d;
    }
    resp
}
