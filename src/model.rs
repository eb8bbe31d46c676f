use serde::Serialize;

pub const CANCELLED_SUBJECT: &str = "Entfall";
pub const NO_SUBSTITUTE_NOTE: &str = "Keine Vertretung verfügbar";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Teacher {
    pub name: String,
    pub subjects: Vec<String>,
    pub preferred_rooms: Vec<String>,
}

impl Teacher {
    #[cfg(test)]
    pub fn new(name: &str, subjects: &[&str], preferred_rooms: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            subjects: subjects.iter().map(|s| s.to_string()).collect(),
            preferred_rooms: preferred_rooms.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn prefers_room(&self, room: &str) -> bool {
        let room = room.trim();
        self.preferred_rooms.iter().any(|r| r == room)
    }

    /// Room a substitute teaches in: their first preference, else the lesson's room.
    pub fn room_for(&self, lesson_room: &str) -> String {
        self.preferred_rooms
            .first()
            .cloned()
            .unwrap_or_else(|| lesson_room.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonSlot {
    pub class_name: String,
    pub period: i64,
    pub subject: String,
    pub teacher: String,
    pub room: String,
    /// Monday=1 .. Sunday=7.
    pub day_of_week: u8,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// A substitution already persisted for the target date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingSubstitution {
    pub substitute_teacher: String,
    pub period: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub class_name: String,
    pub period: i64,
    pub original_teacher: String,
    pub original_subject: String,
    pub original_room: String,
    pub substitute_teacher: Option<String>,
    pub substitute_subject: String,
    pub substitute_room: String,
    pub note: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl Assignment {
    pub fn covered(lesson: &LessonSlot, absent_teacher: &str, substitute: &Teacher) -> Self {
        Self {
            class_name: lesson.class_name.clone(),
            period: lesson.period,
            original_teacher: absent_teacher.to_string(),
            original_subject: lesson.subject.clone(),
            original_room: lesson.room.clone(),
            substitute_teacher: Some(substitute.name.clone()),
            substitute_subject: lesson.subject.clone(),
            substitute_room: substitute.room_for(&lesson.room),
            note: format!("Vertretung durch {}", substitute.name),
            start_time: lesson.start_time.clone(),
            end_time: lesson.end_time.clone(),
        }
    }

    pub fn cancelled(lesson: &LessonSlot, absent_teacher: &str) -> Self {
        Self {
            class_name: lesson.class_name.clone(),
            period: lesson.period,
            original_teacher: absent_teacher.to_string(),
            original_subject: lesson.subject.clone(),
            original_room: lesson.room.clone(),
            substitute_teacher: None,
            substitute_subject: CANCELLED_SUBJECT.to_string(),
            substitute_room: lesson.room.clone(),
            note: NO_SUBSTITUTE_NOTE.to_string(),
            start_time: lesson.start_time.clone(),
            end_time: lesson.end_time.clone(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.substitute_teacher.is_none()
    }
}

/// Splits a comma-separated column into trimmed, non-blank, first-wins unique entries.
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in raw.unwrap_or("").split(',') {
        let s = part.trim();
        if !s.is_empty() && !out.iter().any(|o| o == s) {
            out.push(s.to_string());
        }
    }
    out
}
