use crate::model::{ExistingSubstitution, LessonSlot, Teacher};
use chrono::NaiveDate;

/// Read-only timetable. Lessons come back in catalog order.
pub trait LessonCatalog {
    fn lessons_for(&self, teacher: &str, day_of_week: u8) -> anyhow::Result<Vec<LessonSlot>>;
}

/// Read-only roster. Teachers come back in directory order.
pub trait TeacherDirectory {
    fn all_teachers(&self) -> anyhow::Result<Vec<Teacher>>;
}

/// Substitutions that are already persisted, keyed by date.
pub trait SubstitutionRecords {
    fn substitutions_on(&self, date: NaiveDate) -> anyhow::Result<Vec<ExistingSubstitution>>;
}
