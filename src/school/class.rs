use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::municipality::School;
use super::reference::{Identified, Reference};
use crate::error::EscolaError;

/// One recorded class meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub date: NaiveDate,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presence {
    pub date: NaiveDate,
    pub present: bool,
}

/// Lightweight view of a class, carried by demands and students.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSummary {
    pub id: String,
    pub name: String,
    pub municipality_id: Option<String>,
}

impl Identified for ClassSummary {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub enrollment_id: String,
    pub name: String,
    #[serde(default)]
    pub class: Option<Reference<ClassSummary>>,
    #[serde(default)]
    pub presences: Vec<Presence>,
}

impl Student {
    /// `enrollment_id` must follow `MAT-AAAA-NNNN` (ex.: `MAT-2026-0001`).
    pub fn new(enrollment_id: &str, name: impl Into<String>) -> Result<Self, EscolaError> {
        let enrollment_id = enrollment_id.trim().to_uppercase();
        validate_enrollment_id(&enrollment_id)?;
        Ok(Self {
            enrollment_id,
            name: name.into(),
            class: None,
            presences: Vec::new(),
        })
    }

    pub fn mark(&mut self, date: NaiveDate, present: bool) {
        self.presences.push(Presence { date, present });
    }
}

fn validate_enrollment_id(id: &str) -> Result<(), EscolaError> {
    let parts: Vec<&str> = id.split('-').collect();
    let valid = matches!(
        parts.as_slice(),
        ["MAT", year, seq]
            if year.len() == 4
                && seq.len() == 4
                && year.chars().all(|c| c.is_ascii_digit())
                && seq.chars().all(|c| c.is_ascii_digit())
    );
    if valid {
        Ok(())
    } else {
        Err(EscolaError::Validation(format!(
            "invalid enrollment id {id:?}: expected MAT-YYYY-NNNN"
        )))
    }
}

/// Turma: session log plus enrolled students.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub id: String,
    pub name: String,
    pub school_year: i32,
    pub school: Reference<School>,
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub students: Vec<Student>,
}

const MIN_CONTENT_LEN: usize = 5;

impl Class {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        school_year: i32,
        school: Reference<School>,
    ) -> Result<Self, EscolaError> {
        let class = Self {
            id: id.into(),
            name: name.into(),
            school_year,
            school,
            sessions: Vec::new(),
            students: Vec::new(),
        };
        class.validate()?;
        Ok(class)
    }

    /// Checks the invariants that deserialization cannot enforce.
    pub fn validate(&self) -> Result<(), EscolaError> {
        if self.name.trim().is_empty() {
            return Err(EscolaError::Validation("class name cannot be empty".into()));
        }
        if !(2000..=2100).contains(&self.school_year) {
            return Err(EscolaError::Validation(format!(
                "school year {} out of range 2000-2100",
                self.school_year
            )));
        }
        for student in &self.students {
            validate_enrollment_id(&student.enrollment_id)?;
        }
        Ok(())
    }

    /// Município derivado da escola, quando ela está carregada.
    pub fn municipality_id(&self) -> Option<&str> {
        self.school.resolved().map(School::municipality_id)
    }

    pub fn summary(&self) -> ClassSummary {
        ClassSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            municipality_id: self.municipality_id().map(str::to_string),
        }
    }

    pub fn enroll(&mut self, mut student: Student) {
        student.class = Some(Reference::Resolved(self.summary()));
        self.students.push(student);
    }

    /// Registra uma aula no diário de classe.
    pub fn register_session(&mut self, date: NaiveDate, content: &str) -> Result<(), EscolaError> {
        let content = content.trim();
        if content.chars().count() < MIN_CONTENT_LEN {
            return Err(EscolaError::Validation(format!(
                "session content must have at least {MIN_CONTENT_LEN} characters"
            )));
        }
        self.sessions.push(Session {
            date,
            content: content.to_string(),
        });
        tracing::debug!(class = %self.id, %date, "session registered");
        Ok(())
    }

    /// Registers a session and the roll call for it in one step.
    ///
    /// Every enrollment id in `roll` must belong to this class and appear
    /// once; nothing is recorded otherwise.
    pub fn record_lesson(
        &mut self,
        date: NaiveDate,
        content: &str,
        roll: &[(&str, bool)],
    ) -> Result<(), EscolaError> {
        for (i, (enrollment_id, _)) in roll.iter().enumerate() {
            if roll[..i].iter().any(|(seen, _)| seen == enrollment_id) {
                return Err(EscolaError::Validation(format!(
                    "student {enrollment_id} appears more than once in the roll call"
                )));
            }
            if !self.students.iter().any(|s| s.enrollment_id == *enrollment_id) {
                return Err(EscolaError::Validation(format!(
                    "student {enrollment_id} is not enrolled in class {}",
                    self.id
                )));
            }
        }
        self.register_session(date, content)?;
        for (enrollment_id, present) in roll {
            if let Some(student) = self
                .students
                .iter_mut()
                .find(|s| s.enrollment_id == *enrollment_id)
            {
                student.mark(date, *present);
            }
        }
        Ok(())
    }
}

impl Identified for Class {
    fn id(&self) -> &str {
        &self.id
    }
}
