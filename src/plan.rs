use crate::catalog::{LessonCatalog, SubstitutionRecords, TeacherDirectory};
use crate::engine::{self, SubjectMatching};
use crate::ledger::ConflictLedger;
use crate::model::{Assignment, LessonSlot, Teacher};
use chrono::{Datelike, NaiveDate};
use log::{error, info};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("{0}")]
    Input(String),
    #[error("failed to load {what}: {source}")]
    Lookup {
        what: &'static str,
        source: anyhow::Error,
    },
}

impl PlanError {
    pub fn code(&self) -> &'static str {
        match self {
            PlanError::Input(_) => "bad_params",
            PlanError::Lookup { .. } => "lookup_failed",
        }
    }

    fn lookup(what: &'static str, source: anyhow::Error) -> Self {
        error!("{what} lookup failed: {source:#}");
        PlanError::Lookup { what, source }
    }
}

/// ISO weekday, Monday=1 .. Sunday=7. Same numbering as `lessons.day_of_week`.
pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().number_from_monday() as u8
}

/// Strict `YYYY-MM-DD`.
pub fn parse_iso_date(raw: &str) -> Result<NaiveDate, PlanError> {
    let raw = raw.trim();
    if raw.len() != 10 {
        return Err(PlanError::Input(format!(
            "date must be YYYY-MM-DD, got {raw:?}"
        )));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| PlanError::Input(format!("date must be YYYY-MM-DD, got {raw:?}")))
}

fn require_name<'a>(raw: &'a str, key: &str) -> Result<&'a str, PlanError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(PlanError::Input(format!("missing {key}")));
    }
    Ok(name)
}

#[derive(Debug, Clone, Serialize)]
pub struct SubstitutePreview {
    pub substitute: Option<Teacher>,
    pub available_teachers: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubstitutionPlan {
    pub date: String,
    pub day_of_week: u8,
    pub substitution_plan: Vec<Assignment>,
    pub affected_lessons_count: usize,
}

pub struct PlanAssembler<'a> {
    lessons: &'a dyn LessonCatalog,
    teachers: &'a dyn TeacherDirectory,
    records: &'a dyn SubstitutionRecords,
    matching: SubjectMatching,
}

impl<'a> PlanAssembler<'a> {
    pub fn new(
        lessons: &'a dyn LessonCatalog,
        teachers: &'a dyn TeacherDirectory,
        records: &'a dyn SubstitutionRecords,
    ) -> Self {
        Self {
            lessons,
            teachers,
            records,
            matching: SubjectMatching::default(),
        }
    }

    pub fn with_matching(mut self, matching: SubjectMatching) -> Self {
        self.matching = matching;
        self
    }

    pub fn find_affected_lessons(
        &self,
        teacher_name: &str,
        day_of_week: i64,
    ) -> Result<Vec<LessonSlot>, PlanError> {
        let teacher_name = require_name(teacher_name, "teacherName")?;
        let day = match u8::try_from(day_of_week) {
            Ok(d @ 1..=7) => d,
            _ => {
                return Err(PlanError::Input(format!(
                    "dayOfWeek must be between 1 and 7, got {day_of_week}"
                )))
            }
        };
        self.lessons
            .lessons_for(teacher_name, day)
            .map_err(|e| PlanError::lookup("lessons", e))
    }

    /// Preview for a single lesson slot. Conflicts are checked against
    /// persisted substitutions only and nothing is committed.
    pub fn find_substitute_teacher(
        &self,
        absent_teacher: &str,
        date: NaiveDate,
        period: i64,
        subject: &str,
        room: &str,
    ) -> Result<SubstitutePreview, PlanError> {
        let absent_teacher = require_name(absent_teacher, "absentTeacher")?;
        if period < 1 {
            return Err(PlanError::Input(format!(
                "period must be a positive integer, got {period}"
            )));
        }
        let directory = self
            .teachers
            .all_teachers()
            .map_err(|e| PlanError::lookup("teachers", e))?;
        let existing = self
            .records
            .substitutions_on(date)
            .map_err(|e| PlanError::lookup("substitutions", e))?;
        let ledger = ConflictLedger::seeded(&existing);

        let (pool, selection) = engine::shortlist(
            &directory,
            absent_teacher,
            period,
            subject,
            room,
            &ledger,
            self.matching,
        );
        Ok(SubstitutePreview {
            substitute: selection.map(|s| s.teacher.clone()),
            available_teachers: pool.len(),
        })
    }

    /// Full-day plan. Any lookup failure aborts the whole plan.
    pub fn create_substitution_plan(
        &self,
        teacher_name: &str,
        date: NaiveDate,
    ) -> Result<SubstitutionPlan, PlanError> {
        let teacher_name = require_name(teacher_name, "teacherName")?;
        let weekday = day_of_week(date);

        let lessons = self.find_affected_lessons(teacher_name, i64::from(weekday))?;
        let directory = self
            .teachers
            .all_teachers()
            .map_err(|e| PlanError::lookup("teachers", e))?;
        let existing = self
            .records
            .substitutions_on(date)
            .map_err(|e| PlanError::lookup("substitutions", e))?;

        let mut ledger = ConflictLedger::seeded(&existing);
        let seeded = ledger.len();

        // Sequential: each commit narrows the pool of later lessons.
        let substitution_plan: Vec<Assignment> = lessons
            .iter()
            .map(|lesson| {
                engine::assign(lesson, teacher_name, &mut ledger, &directory, self.matching)
            })
            .collect();

        let cancelled = substitution_plan.iter().filter(|a| a.is_cancelled()).count();
        info!(
            "plan for {} on {} (day {}): {} lessons, {} cancelled, {} seeded commitments, matching={}",
            teacher_name,
            date,
            weekday,
            lessons.len(),
            cancelled,
            seeded,
            self.matching.as_str()
        );

        Ok(SubstitutionPlan {
            date: date.format("%Y-%m-%d").to_string(),
            day_of_week: weekday,
            affected_lessons_count: lessons.len(),
            substitution_plan,
        })
    }
}
