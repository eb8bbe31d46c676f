use crate::db::{self, SqliteSchool};
use crate::engine::SubjectMatching;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::plan::{self, PlanAssembler, PlanError};
use rusqlite::Connection;
use serde_json::{json, Map, Value as JsonValue};

#[derive(Clone, Copy, Debug, Default)]
struct SubstitutionSetup {
    subject_matching: SubjectMatching,
}

fn load_setup_section(conn: &Connection, key: &str) -> Option<Map<String, JsonValue>> {
    db::settings_get_json(conn, key)
        .ok()
        .flatten()
        .and_then(|v| v.as_object().cloned())
}

fn parse_substitution_setup(obj: &Map<String, JsonValue>) -> SubstitutionSetup {
    let subject_matching = obj
        .get("subjectMatching")
        .and_then(|v| v.as_str())
        .and_then(SubjectMatching::parse)
        .unwrap_or_default();
    SubstitutionSetup { subject_matching }
}

fn load_substitution_setup(conn: &Connection) -> SubstitutionSetup {
    let obj = load_setup_section(conn, "setup.substitutions").unwrap_or_default();
    parse_substitution_setup(&obj)
}

fn db_conn<'a>(state: &'a AppState, req: &Request) -> Result<&'a Connection, serde_json::Value> {
    state
        .db
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.data
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

fn optional_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    match req.data.get(key) {
        None => Ok(String::new()),
        Some(v) if v.is_null() => Ok(String::new()),
        Some(v) => v.as_str().map(|s| s.trim().to_string()).ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                format!("{} must be a string", key),
                None,
            )
        }),
    }
}

fn required_i64(req: &Request, key: &str) -> Result<i64, serde_json::Value> {
    let Some(v) = req.data.get(key) else {
        return Err(err(&req.id, "bad_params", format!("missing {}", key), None));
    };
    v.as_i64().ok_or_else(|| {
        err(
            &req.id,
            "bad_params",
            format!("{} must be an integer", key),
            Some(json!({ key: v })),
        )
    })
}

fn required_date(req: &Request, key: &str) -> Result<chrono::NaiveDate, serde_json::Value> {
    let raw = required_str(req, key)?;
    plan::parse_iso_date(&raw).map_err(|e| plan_err(req, e))
}

fn plan_err(req: &Request, e: PlanError) -> serde_json::Value {
    err(&req.id, e.code(), e.to_string(), None)
}

fn to_json<T: serde::Serialize>(req: &Request, value: &T) -> serde_json::Value {
    match serde_json::to_value(value) {
        Ok(v) => ok(&req.id, v),
        Err(e) => err(&req.id, "encode_failed", e.to_string(), None),
    }
}

fn handle_find_affected_lessons(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let teacher_name = match required_str(req, "teacherName") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let day = match required_i64(req, "dayOfWeek") {
        Ok(v) => v,
        Err(e) => return e,
    };

    let school = SqliteSchool::new(conn);
    let assembler = PlanAssembler::new(&school, &school, &school);
    match assembler.find_affected_lessons(&teacher_name, day) {
        Ok(lessons) => ok(&req.id, json!({ "affected_lessons": lessons })),
        Err(e) => plan_err(req, e),
    }
}

fn handle_find_substitute_teacher(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let absent_teacher = match required_str(req, "absentTeacher") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let date = match required_date(req, "date") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let period = match required_i64(req, "period") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let subject = match optional_str(req, "subject") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let room = match optional_str(req, "room") {
        Ok(v) => v,
        Err(e) => return e,
    };

    let setup = load_substitution_setup(conn);
    let school = SqliteSchool::new(conn);
    let assembler =
        PlanAssembler::new(&school, &school, &school).with_matching(setup.subject_matching);
    match assembler.find_substitute_teacher(&absent_teacher, date, period, &subject, &room) {
        Ok(preview) => to_json(req, &preview),
        Err(e) => plan_err(req, e),
    }
}

fn handle_create_substitution_plan(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let teacher_name = match required_str(req, "teacherName") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let date = match required_date(req, "date") {
        Ok(v) => v,
        Err(e) => return e,
    };

    let setup = load_substitution_setup(conn);
    let school = SqliteSchool::new(conn);
    let assembler =
        PlanAssembler::new(&school, &school, &school).with_matching(setup.subject_matching);
    match assembler.create_substitution_plan(&teacher_name, date) {
        Ok(plan) => to_json(req, &plan),
        Err(e) => plan_err(req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.action.as_str() {
        "find_affected_lessons" => Some(handle_find_affected_lessons(state, req)),
        "find_substitute_teacher" => Some(handle_find_substitute_teacher(state, req)),
        "create_substitution_plan" => Some(handle_create_substitution_plan(state, req)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_defaults_to_normalized_matching() {
        let empty = Map::new();
        assert_eq!(
            parse_substitution_setup(&empty).subject_matching,
            SubjectMatching::Normalized
        );

        let bogus = json!({ "subjectMatching": 3 });
        assert_eq!(
            parse_substitution_setup(bogus.as_object().expect("obj")).subject_matching,
            SubjectMatching::Normalized
        );

        let exact = json!({ "subjectMatching": "EXACT" });
        assert_eq!(
            parse_substitution_setup(exact.as_object().expect("obj")).subject_matching,
            SubjectMatching::Exact
        );
    }

    #[test]
    fn missing_period_is_rejected_before_any_lookup() {
        let req = Request {
            id: "1".to_string(),
            action: "find_substitute_teacher".to_string(),
            data: json!({ "absentTeacher": "SCH", "date": "2026-10-12", "period": "2" }),
        };
        let resp = required_i64(&req, "period").expect_err("string period");
        assert_eq!(resp["code"], "bad_params");
        assert_eq!(resp["details"]["period"], "2");
    }
}
