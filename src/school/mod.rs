//! Entidades colaboradoras do motor: município, escola, turma e aluno.
//!
//! Only the shape the engine needs is modelled here. Validation follows the
//! administrative rules (UF with two letters, enrolment ids, school year range).

mod class;
mod municipality;
mod reference;

pub use class::{Class, ClassSummary, Presence, Session, Student};
pub use municipality::{Municipality, School};
pub use reference::{Identified, Reference};
