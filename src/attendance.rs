//! Avaliador de frequência mensal (RN02).
//!
//! Reads session and presence logs through the [`ClassRoster`] and
//! [`PresenceLog`] traits, aggregates them per calendar month and asks the
//! [`DemandFactory`] for a system pedagogical demand when a class's average
//! attendance falls below `Config::min_attendance`.
//!
//! Months are matched by their number only, whatever the year of the record.

use std::collections::BTreeSet;

use chrono::{Datelike, Month, NaiveDate};

use crate::config::Config;
use crate::demand::{Demand, EventSink, Requester};
use crate::error::{EscolaError, Result};
use crate::factory::{DemandFactory, DemandFields, DemandRequest};
use crate::school::{Class, ClassSummary, Presence, Reference, Session, Student};

/// A student's ordered presence log.
pub trait PresenceLog {
    fn presences(&self) -> &[Presence];
}

/// A class's ordered session log and its enrolled students.
pub trait ClassRoster {
    type Student: PresenceLog;

    fn sessions(&self) -> &[Session];

    fn enrolled(&self) -> &[Self::Student];

    fn summary(&self) -> ClassSummary;
}

impl PresenceLog for Student {
    fn presences(&self) -> &[Presence] {
        &self.presences
    }
}

impl ClassRoster for Class {
    type Student = Student;

    fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    fn enrolled(&self) -> &[Student] {
        &self.students
    }

    fn summary(&self) -> ClassSummary {
        Class::summary(self)
    }
}

fn in_month(date: NaiveDate, month: Month) -> bool {
    date.month() == month.number_from_month()
}

/// Stateless evaluator bound to a configuration.
pub struct AttendanceEvaluator<'a> {
    config: &'a Config,
}

impl<'a> AttendanceEvaluator<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn sessions_in_month<C: ClassRoster>(&self, class: &C, month: Month) -> usize {
        class
            .sessions()
            .iter()
            .filter(|s| in_month(s.date, month))
            .count()
    }

    /// Distinct session dates in `month` on which the student was present.
    ///
    /// Repeated marks for one date and marks with no matching session are
    /// ignored, so the count never exceeds [`Self::sessions_in_month`].
    pub fn presences_in_month<C: ClassRoster>(
        &self,
        student: &C::Student,
        class: &C,
        month: Month,
    ) -> usize {
        let session_dates: BTreeSet<NaiveDate> = class
            .sessions()
            .iter()
            .filter(|s| in_month(s.date, month))
            .map(|s| s.date)
            .collect();
        student
            .presences()
            .iter()
            .filter(|p| p.present && session_dates.contains(&p.date))
            .map(|p| p.date)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Presenças do aluno no mês divididas pelas aulas da turma no mês.
    pub fn monthly_average<C: ClassRoster>(
        &self,
        student: &C::Student,
        class: &C,
        month: Month,
    ) -> Result<f64> {
        let sessions = self.sessions_in_month(class, month);
        if sessions == 0 {
            return Err(EscolaError::NoDataAvailable(format!(
                "no sessions recorded in {}",
                month.name()
            )));
        }
        Ok(self.presences_in_month(student, class, month) as f64 / sessions as f64)
    }

    /// Média aritmética das médias mensais dos alunos matriculados.
    pub fn class_monthly_average<C: ClassRoster>(&self, class: &C, month: Month) -> Result<f64> {
        let students = class.enrolled();
        if students.is_empty() {
            return Err(EscolaError::NoDataAvailable(format!(
                "class {} has no enrolled students",
                class.summary().id
            )));
        }
        let mut total = 0.0;
        for student in students {
            total += self.monthly_average(student, class, month)?;
        }
        Ok(total / students.len() as f64)
    }

    /// Alunos com média mensal abaixo de `min_attendance`.
    pub fn count_below_threshold<C: ClassRoster>(&self, class: &C, month: Month) -> Result<u32> {
        let mut below = 0;
        for student in class.enrolled() {
            if self.monthly_average(student, class, month)? < self.config.min_attendance {
                below += 1;
            }
        }
        Ok(below)
    }

    /// Overall attendance over every recorded session, compared with `min_attendance`.
    ///
    /// `false` when the class has no sessions at all.
    pub fn meets_attendance<C: ClassRoster>(&self, student: &C::Student, class: &C) -> bool {
        let sessions = class.sessions().len();
        if sessions == 0 {
            tracing::debug!(class = %class.summary().id, "no sessions recorded");
            return false;
        }
        let session_dates: BTreeSet<NaiveDate> = class.sessions().iter().map(|s| s.date).collect();
        let present = student
            .presences()
            .iter()
            .filter(|p| p.present && session_dates.contains(&p.date))
            .map(|p| p.date)
            .collect::<BTreeSet<_>>()
            .len();
        present as f64 / sessions as f64 >= self.config.min_attendance
    }

    /// Evaluates one month and creates a system pedagogical demand when the
    /// class average is below `min_attendance`.
    pub fn evaluate_month<C: ClassRoster>(
        &self,
        class: &C,
        month: Month,
        sink: &mut dyn EventSink,
    ) -> Result<Option<Demand>> {
        let average = self.class_monthly_average(class, month)?;
        let summary = class.summary();
        if average >= self.config.min_attendance {
            tracing::debug!(class = %summary.id, month = month.name(), average, "attendance within threshold");
            return Ok(None);
        }

        let below = self.count_below_threshold(class, month)?;
        let total = u32::try_from(class.enrolled().len()).map_err(|_| EscolaError::InvalidField {
            field: "total_students",
            reason: "too many enrolled students".into(),
        })?;
        tracing::info!(
            class = %summary.id,
            month = month.name(),
            average,
            below,
            threshold = self.config.min_attendance,
            "class attendance below threshold"
        );
        if summary.municipality_id.is_none() {
            tracing::warn!(
                class = %summary.id,
                "class school is not loaded; the demand has no municipality and every actor will be denied"
            );
        }

        let request = DemandRequest::pedagogical(Requester::System).with_fields(DemandFields {
            target_class: Some(Reference::Resolved(summary)),
            total_students: total,
            students_below_average: below,
            students_present: total - below,
            attendance_ratio: average,
            monthly_average: Some(average),
            ..Default::default()
        });
        DemandFactory::create(self.config, request, sink).map(Some)
    }
}
