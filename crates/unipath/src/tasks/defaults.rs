//! Built-in task templates, generated per stage.

use crate::profile::Profile;
use crate::stage::Stage;

/// Profile readiness flag that makes a template unnecessary once "Completed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    EnglishTest,
    Gre,
    Sop,
}

impl Readiness {
    fn completed(self, profile: &Profile) -> bool {
        let status = match self {
            Readiness::EnglishTest => profile.ielts_status.as_deref(),
            Readiness::Gre => profile.gre_status.as_deref(),
            Readiness::Sop => profile.sop_status.as_deref(),
        };
        status.is_some_and(|s| s.trim().eq_ignore_ascii_case("completed"))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DefaultTask {
    pub stage: Stage,
    pub title: &'static str,
    pub skip_when_done: Option<Readiness>,
}

const fn task(stage: Stage, title: &'static str) -> DefaultTask {
    DefaultTask {
        stage,
        title,
        skip_when_done: None,
    }
}

const fn readiness(stage: Stage, title: &'static str, flag: Readiness) -> DefaultTask {
    DefaultTask {
        stage,
        title,
        skip_when_done: Some(flag),
    }
}

pub const DEFAULT_TASKS: &[DefaultTask] = &[
    task(Stage::Profile, "Complete your study profile"),
    task(Stage::Profile, "Research study destinations and intakes"),
    task(Stage::Discovery, "Review your university recommendations"),
    task(Stage::Discovery, "Shortlist at least 3 universities"),
    task(Stage::Discovery, "Compare tuition, living costs and scholarships"),
    readiness(Stage::Discovery, "Book your IELTS/TOEFL exam", Readiness::EnglishTest),
    readiness(Stage::Discovery, "Prepare for the GRE", Readiness::Gre),
    task(Stage::Locking, "Compare your shortlisted universities"),
    task(Stage::Locking, "Lock at least one university"),
    readiness(Stage::Locking, "Draft your Statement of Purpose", Readiness::Sop),
    task(Stage::Application, "Request letters of recommendation"),
    task(Stage::Application, "Collect academic transcripts"),
    task(Stage::Application, "Prepare financial documents"),
    readiness(Stage::Application, "Finalize your Statement of Purpose", Readiness::Sop),
];

/// Templates that apply to a user at `current`, in order.
pub fn applicable(current: Stage, profile: Option<&Profile>) -> impl Iterator<Item = &'static DefaultTask> {
    DEFAULT_TASKS.iter().filter(move |t| {
        current.can_access(t.stage)
            && !t
                .skip_when_done
                .zip(profile)
                .is_some_and(|(flag, p)| flag.completed(p))
    })
}

/// Title of the per-university application task.
pub fn application_title(university_name: &str) -> String {
    format!("Submit application to {university_name}")
}
