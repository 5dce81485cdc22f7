use crate::domain::events::EventSender;
use crate::domain::model::PickResult;
use std::collections::HashSet;

/// Accumulates the run's picks and emits the end-of-run summary. An empty
/// accumulation is a valid terminal state, e.g. when every requested slot
/// was already full or already enrolled.
#[derive(Debug, Default)]
pub struct OutcomeRecorder {
    picks: Vec<PickResult>,
}

impl OutcomeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, pick: PickResult) {
        self.picks.push(pick);
    }

    pub fn picks(&self) -> &[PickResult] {
        &self.picks
    }

    pub fn summarize(&self, events: &EventSender) {
        let classes: HashSet<&str> = self
            .picks
            .iter()
            .map(|pick| pick.class_name.as_str())
            .collect();
        events.info(format!("Enrollment completed for {} classes", classes.len()));

        for pick in &self.picks {
            events.success(format!(
                "{} {} {}",
                pick.class_name, pick.slot_type, pick.slot_number
            ));
        }
    }
}
