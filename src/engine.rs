use crate::ledger::ConflictLedger;
use crate::model::{Assignment, LessonSlot, Teacher};
use log::{debug, warn};

/// How a lesson's subject is compared against a teacher's subjects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubjectMatching {
    /// Case/dot-insensitive with German subject names folded to short codes.
    #[default]
    Normalized,
    Exact,
}

impl SubjectMatching {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "normalized" => Some(SubjectMatching::Normalized),
            "exact" => Some(SubjectMatching::Exact),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SubjectMatching::Normalized => "normalized",
            SubjectMatching::Exact => "exact",
        }
    }

    pub fn teaches(self, teacher: &Teacher, subject: &str) -> bool {
        match self {
            SubjectMatching::Exact => teacher.subjects.iter().any(|s| s == subject),
            SubjectMatching::Normalized => {
                let wanted = canonical_subject(subject);
                if wanted.is_empty() {
                    return false;
                }
                teacher
                    .subjects
                    .iter()
                    .any(|s| canonical_subject(s) == wanted)
            }
        }
    }
}

pub fn canonical_subject(raw: &str) -> String {
    let upper = raw.trim().to_uppercase().replace('.', "");
    let code = match upper.as_str() {
        "MATHE" | "MATHEMATIK" => "MA",
        "DEUTSCH" => "DE",
        "ENGLISCH" => "EN",
        "BIOLOGIE" => "BI",
        "CHEMIE" => "CH",
        "PHYSIK" => "PH",
        "GESCHICHTE" => "GE",
        "ERDKUNDE" | "GEOGRAPHIE" => "EK",
        "INFORMATIK" => "IF",
        _ => return upper,
    };
    code.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    SubjectAndRoom = 1,
    Subject = 2,
    AnyAvailable = 3,
}

#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub teacher: &'a Teacher,
    pub tier: Tier,
}

/// Teachers eligible for `period`, in directory order.
pub fn candidate_pool<'a>(
    directory: &'a [Teacher],
    absent_teacher: &str,
    period: i64,
    ledger: &ConflictLedger,
) -> Vec<&'a Teacher> {
    directory
        .iter()
        .filter(|t| t.name != absent_teacher)
        .filter(|t| !ledger.has_conflict(period, &t.name))
        .collect()
}

/// First match of the highest tier wins; `None` only for an empty pool.
pub fn select_substitute<'a>(
    pool: &[&'a Teacher],
    subject: &str,
    room: &str,
    matching: SubjectMatching,
) -> Option<Selection<'a>> {
    if let Some(t) = pool
        .iter()
        .find(|t| matching.teaches(t, subject) && t.prefers_room(room))
    {
        return Some(Selection {
            teacher: *t,
            tier: Tier::SubjectAndRoom,
        });
    }
    if let Some(t) = pool.iter().find(|t| matching.teaches(t, subject)) {
        return Some(Selection {
            teacher: *t,
            tier: Tier::Subject,
        });
    }
    pool.first().map(|t| Selection {
        teacher: *t,
        tier: Tier::AnyAvailable,
    })
}

/// Pool and winner for one lesson slot against `ledger`, without committing.
/// Shared by the preview path and the full-plan path.
pub fn shortlist<'a>(
    directory: &'a [Teacher],
    absent_teacher: &str,
    period: i64,
    subject: &str,
    room: &str,
    ledger: &ConflictLedger,
    matching: SubjectMatching,
) -> (Vec<&'a Teacher>, Option<Selection<'a>>) {
    let pool = candidate_pool(directory, absent_teacher, period, ledger);
    let selection = select_substitute(&pool, subject, room, matching);
    (pool, selection)
}

/// Picks a substitute for `lesson` and commits it to `ledger` before returning.
pub fn assign(
    lesson: &LessonSlot,
    absent_teacher: &str,
    ledger: &mut ConflictLedger,
    directory: &[Teacher],
    matching: SubjectMatching,
) -> Assignment {
    let (pool, selection) = shortlist(
        directory,
        absent_teacher,
        lesson.period,
        &lesson.subject,
        &lesson.room,
        ledger,
        matching,
    );
    match selection {
        Some(sel) => {
            debug!(
                "{} period {}: {} via tier {} ({} candidates)",
                lesson.class_name,
                lesson.period,
                sel.teacher.name,
                sel.tier as u8,
                pool.len()
            );
            ledger.commit(lesson.period, &sel.teacher.name);
            Assignment::covered(lesson, absent_teacher, sel.teacher)
        }
        None => {
            warn!(
                "{} period {}: no substitute available, lesson cancelled",
                lesson.class_name, lesson.period
            );
            Assignment::cancelled(lesson, absent_teacher)
        }
    }
}
