use serde::{Deserialize, Serialize};

use super::audit::EventSink;
use super::base::{Actor, DemandBase, ProcessOutcome, Processable};
use super::status::DemandStatus;
use crate::config::Config;
use crate::school::{ClassSummary, Reference};

/// Gap index from which reinforcement is approved.
pub const APPROVAL_GAP_INDEX: f64 = 0.4;
/// Attendance ratio from which reinforcement is approved.
///
/// Fixed cut point, independent of `Config::min_attendance`.
pub const APPROVAL_ATTENDANCE: f64 = 0.75;

/// Figures a pedagogical demand is built from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassFigures {
    pub total_students: u32,
    pub students_below_average: u32,
    pub students_present: u32,
    pub attendance_ratio: f64,
}

/// Demanda pedagógica: pedido de reforço para uma turma com lacuna de aprendizado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PedagogicalDemand {
    #[serde(flatten)]
    base: DemandBase,
    figures: ClassFigures,
    gap_index: f64,
    target_class: Reference<ClassSummary>,
}

impl PedagogicalDemand {
    pub(crate) fn new(
        base: DemandBase,
        figures: ClassFigures,
        target_class: Reference<ClassSummary>,
    ) -> Self {
        Self {
            base,
            figures,
            gap_index: 0.0,
            target_class,
        }
    }

    pub fn total_students(&self) -> u32 {
        self.figures.total_students
    }

    pub fn students_below_average(&self) -> u32 {
        self.figures.students_below_average
    }

    pub fn students_present(&self) -> u32 {
        self.figures.students_present
    }

    /// Last computed gap index (0 until [`validate_reinforcement`](Self::validate_reinforcement) runs).
    pub fn gap_index(&self) -> f64 {
        self.gap_index
    }

    pub fn attendance_ratio(&self) -> f64 {
        self.figures.attendance_ratio
    }

    pub fn target_class(&self) -> &Reference<ClassSummary> {
        &self.target_class
    }

    /// Recomputes gap index and attendance ratio, then applies the approval rule.
    ///
    /// Returns `false` without touching the figures when there are no students.
    pub fn validate_reinforcement(&mut self) -> bool {
        let total = self.figures.total_students;
        if total == 0 {
            return false;
        }
        let total = f64::from(total);
        self.gap_index = f64::from(self.figures.students_below_average) / total;
        self.figures.attendance_ratio = f64::from(self.figures.students_present) / total;

        self.gap_index >= APPROVAL_GAP_INDEX || self.figures.attendance_ratio >= APPROVAL_ATTENDANCE
    }
}

impl Processable for PedagogicalDemand {
    fn base(&self) -> &DemandBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut DemandBase {
        &mut self.base
    }

    fn municipality_id(&self) -> Option<&str> {
        self.base.requester().municipality_id().or_else(|| {
            self.target_class
                .resolved()
                .and_then(|c| c.municipality_id.as_deref())
        })
    }

    fn process(
        &mut self,
        actor: &dyn Actor,
        _config: &Config,
        sink: &mut dyn EventSink,
    ) -> ProcessOutcome {
        if !self.authorize(actor, sink) {
            return ProcessOutcome::Denied;
        }
        if self.figures.total_students == 0 {
            tracing::debug!(demand = %self.base.id(), "no enrolled students, nothing to evaluate");
            return ProcessOutcome::NoData;
        }

        let status = if self.validate_reinforcement() {
            tracing::info!(
                demand = %self.base.id(),
                class = %self.target_class.id(),
                attendance = self.figures.attendance_ratio,
                gap = self.gap_index,
                "reinforcement approved"
            );
            DemandStatus::ReinforcementApproved
        } else {
            DemandStatus::Regular
        };
        self.base.update_status(status, actor.display_name(), sink);
        ProcessOutcome::Transitioned(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demand::base::test_support::TestActor;
    use crate::demand::base::Requester;
    use crate::demand::{EventKind, EventLog, Priority};

    fn class_ref(municipality: &str) -> Reference<ClassSummary> {
        Reference::Resolved(ClassSummary {
            id: "T-POO-2026".into(),
            name: "Programação Orientada a Objetos".into(),
            municipality_id: Some(municipality.into()),
        })
    }

    fn demand(total: u32, below: u32, present: u32) -> PedagogicalDemand {
        PedagogicalDemand::new(
            DemandBase::new("reforço".into(), Priority::Normal, Requester::System),
            ClassFigures {
                total_students: total,
                students_below_average: below,
                students_present: present,
                attendance_ratio: 0.99,
            },
            class_ref("MUN-1"),
        )
    }

    #[test]
    fn high_gap_approves_reinforcement() {
        let mut d = demand(10, 4, 2);
        let mut log = EventLog::new();
        let outcome = d.process(&TestActor::of("MUN-1"), &Config::default(), &mut log);

        assert_eq!(
            outcome,
            ProcessOutcome::Transitioned(DemandStatus::ReinforcementApproved)
        );
        assert_eq!(d.gap_index(), 0.4);
        assert_eq!(d.attendance_ratio(), 0.2);
        assert_eq!(
            log.status_changes(),
            vec![(DemandStatus::Open, DemandStatus::ReinforcementApproved)]
        );
    }

    #[test]
    fn high_attendance_also_approves() {
        let mut d = demand(4, 0, 3);
        assert!(d.validate_reinforcement());
        assert_eq!(d.attendance_ratio(), 0.75);
    }

    #[test]
    fn low_gap_and_low_attendance_is_regular() {
        let mut d = demand(10, 3, 7);
        let mut log = EventLog::new();
        let outcome = d.process(&TestActor::of("MUN-1"), &Config::default(), &mut log);
        assert_eq!(outcome, ProcessOutcome::Transitioned(DemandStatus::Regular));
        assert_eq!(d.base().status(), DemandStatus::Regular);
    }

    #[test]
    fn constructor_ratio_is_not_trusted() {
        let mut d = demand(10, 0, 5);
        assert_eq!(d.attendance_ratio(), 0.99);
        assert!(!d.validate_reinforcement());
        assert_eq!(d.attendance_ratio(), 0.5);
    }

    #[test]
    fn zero_students_is_no_data() {
        let mut d = demand(0, 0, 0);
        let mut log = EventLog::new();
        let outcome = d.process(&TestActor::of("MUN-1"), &Config::default(), &mut log);

        assert_eq!(outcome, ProcessOutcome::NoData);
        assert_eq!(d.base().status(), DemandStatus::Open);
        assert!(log.is_empty());
    }

    #[test]
    fn other_municipality_is_denied() {
        let mut d = demand(10, 9, 9);
        let mut log = EventLog::new();
        let outcome = d.process(&TestActor::of("MUN-2"), &Config::default(), &mut log);

        assert_eq!(outcome, ProcessOutcome::Denied);
        assert_eq!(d.base().status(), DemandStatus::Open);
        assert!(matches!(
            log.events()[0].kind,
            EventKind::AccessDenied { .. }
        ));
    }

    #[test]
    fn ratios_stay_within_unit_interval() {
        for total in 1..=12u32 {
            for below in 0..=total {
                for present in [0, total / 2, total] {
                    let mut d = demand(total, below, present);
                    d.validate_reinforcement();
                    assert!((0.0..=1.0).contains(&d.gap_index()));
                    assert!((0.0..=1.0).contains(&d.attendance_ratio()));
                }
            }
        }
    }
}
