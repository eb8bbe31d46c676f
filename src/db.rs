use crate::catalog::{LessonCatalog, SubstitutionRecords, TeacherDirectory};
use crate::model::{split_list, ExistingSubstitution, LessonSlot, Teacher};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

pub const DB_FILE_NAME: &str = "vertretung.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE_NAME);
    let conn = Connection::open(db_path)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS teachers(
            name TEXT PRIMARY KEY,
            subjects TEXT NOT NULL DEFAULT '',
            preferred_rooms TEXT NOT NULL DEFAULT '',
            sort_order INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS lessons(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            class_name TEXT NOT NULL,
            period INTEGER NOT NULL,
            subject TEXT NOT NULL,
            teacher TEXT NOT NULL,
            room TEXT,
            day_of_week INTEGER NOT NULL CHECK(day_of_week BETWEEN 1 AND 7)
        )",
        [],
    )?;
    // Older workspaces stored lessons without block times.
    ensure_lessons_times(&conn)?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_lessons_teacher_day ON lessons(teacher, day_of_week)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS substitutions(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            class_name TEXT,
            period INTEGER NOT NULL,
            original_teacher TEXT,
            substitute_teacher TEXT,
            substitute_subject TEXT,
            substitute_room TEXT,
            note TEXT
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_substitutions_date ON substitutions(date)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings(
            key TEXT PRIMARY KEY,
            value_json TEXT NOT NULL
        )",
        [],
    )?;

    Ok(conn)
}

pub fn settings_get_json(conn: &Connection, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value_json FROM settings WHERE key = ?",
            [key],
            |r| r.get(0),
        )
        .optional()?;
    match raw {
        Some(s) => Ok(Some(serde_json::from_str(&s)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
pub fn settings_set_json(conn: &Connection, key: &str, value: &serde_json::Value) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value_json) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json",
        params![key, serde_json::to_string(value)?],
    )?;
    Ok(())
}

fn ensure_lessons_times(conn: &Connection) -> anyhow::Result<()> {
    if !table_has_column(conn, "lessons", "start_time")? {
        conn.execute("ALTER TABLE lessons ADD COLUMN start_time TEXT", [])?;
    }
    if !table_has_column(conn, "lessons", "end_time")? {
        conn.execute("ALTER TABLE lessons ADD COLUMN end_time TEXT", [])?;
    }
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Read-only view of a workspace database for plan generation.
pub struct SqliteSchool<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteSchool<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl LessonCatalog for SqliteSchool<'_> {
    fn lessons_for(&self, teacher: &str, day_of_week: u8) -> anyhow::Result<Vec<LessonSlot>> {
        let mut stmt = self.conn.prepare(
            "SELECT class_name, period, subject, teacher, room, day_of_week, start_time, end_time
             FROM lessons
             WHERE TRIM(teacher) = ? AND day_of_week = ?
             ORDER BY period, class_name, id",
        )?;
        let rows = stmt
            .query_map(params![teacher.trim(), day_of_week as i64], |r| {
                let room: Option<String> = r.get(4)?;
                let day: i64 = r.get(5)?;
                Ok(LessonSlot {
                    class_name: r.get(0)?,
                    period: r.get(1)?,
                    subject: r.get::<_, String>(2)?.trim().to_string(),
                    teacher: r.get::<_, String>(3)?.trim().to_string(),
                    room: room.map(|s| s.trim().to_string()).unwrap_or_default(),
                    day_of_week: day as u8,
                    start_time: non_blank(r.get(6)?),
                    end_time: non_blank(r.get(7)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl TeacherDirectory for SqliteSchool<'_> {
    fn all_teachers(&self) -> anyhow::Result<Vec<Teacher>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, subjects, preferred_rooms FROM teachers ORDER BY sort_order, rowid",
        )?;
        let rows = stmt
            .query_map([], |r| {
                let subjects: Option<String> = r.get(1)?;
                let rooms: Option<String> = r.get(2)?;
                Ok(Teacher {
                    name: r.get::<_, String>(0)?.trim().to_string(),
                    subjects: split_list(subjects.as_deref()),
                    preferred_rooms: split_list(rooms.as_deref()),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        // Names are compared against trimmed substitution rows.
        Ok(rows.into_iter().filter(|t| !t.name.is_empty()).collect())
    }
}

impl SubstitutionRecords for SqliteSchool<'_> {
    fn substitutions_on(&self, date: NaiveDate) -> anyhow::Result<Vec<ExistingSubstitution>> {
        let mut stmt = self.conn.prepare(
            "SELECT substitute_teacher, period FROM substitutions
             WHERE date = ? AND substitute_teacher IS NOT NULL AND TRIM(substitute_teacher) <> ''
             ORDER BY id",
        )?;
        let rows = stmt
            .query_map([date.format("%Y-%m-%d").to_string()], |r| {
                Ok(ExistingSubstitution {
                    substitute_teacher: r.get::<_, String>(0)?.trim().to_string(),
                    period: r.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
