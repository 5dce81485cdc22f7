use crate::core::outcome::OutcomeRecorder;
use crate::domain::events::EventSender;
use crate::domain::model::{Availability, ClassPreference, EnrollmentTarget, PickResult, SlotRow, SlotType};
use crate::domain::ports::{BrowserDriver, ElementHandle};
use crate::utils::error::Result;

const SAVE_BUTTON: &str = "input[name='gravar']";
const BACK_BUTTON: &str = "input[name='regressar']";
const SLOT_ROWS: &str = "table.displaytable > tbody > tr";
const ROW_LABEL: &str = "td:first-child";

fn selection_input(slot_type: SlotType) -> String {
    format!("input[name='sel{}']", slot_type.marker())
}

fn preview_input(slot_type: SlotType) -> String {
    format!("input[name='prev{}']", slot_type.marker())
}

/// Drives slot selection on one class page. In dry-run mode the commit
/// control is the back button, so the full flow runs without persisting
/// anything.
#[derive(Debug, Clone, Copy)]
pub struct SlotSelector {
    dry_run: bool,
}

impl SlotSelector {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Navigate to the class page, select the best available slot per
    /// requested slot type, and commit the page exactly once.
    pub async fn enroll_class<D: BrowserDriver>(
        &self,
        driver: &D,
        events: &EventSender,
        target: &EnrollmentTarget,
        preference: &ClassPreference,
        recorder: &mut OutcomeRecorder,
    ) -> Result<()> {
        // Targets without an href never reach this point; the navigator
        // already skipped them.
        let Some(href) = target.href.as_deref() else {
            return Ok(());
        };

        events.info(format!(
            "Opening class page for {} ({})",
            target.class_name, target.class_id
        ));
        driver.navigate(href).await?;

        let commit = if self.dry_run {
            driver.find(BACK_BUTTON).await?
        } else {
            match driver.find_optional(SAVE_BUTTON).await? {
                Some(button) => button,
                None => {
                    events.warning(format!(
                        "Class {} is not open for choice yet, skipping",
                        target.class_name
                    ));
                    return Ok(());
                }
            }
        };

        for slot_type in SlotType::ALL {
            let Some(preferences) = preference.preferences(slot_type) else {
                continue;
            };
            self.select_slot(driver, events, target, slot_type, preferences, recorder)
                .await?;
        }

        driver.click(&commit).await?;
        Ok(())
    }

    async fn select_slot<D: BrowserDriver>(
        &self,
        driver: &D,
        events: &EventSender,
        target: &EnrollmentTarget,
        slot_type: SlotType,
        preferences: &[String],
        recorder: &mut OutcomeRecorder,
    ) -> Result<()> {
        let rows = self.collect_rows(driver, slot_type).await?;
        if rows.is_empty() {
            events.warning(format!(
                "No {} slots listed for {}",
                slot_type, target.class_name
            ));
            return Ok(());
        }

        match pick_slot(preferences, &rows) {
            Some(row) => {
                driver.click(&row.input).await?;
                events.info(format!(
                    "Selected {} slot {} for {}",
                    slot_type, row.slot_number, target.class_name
                ));
                recorder.record(PickResult {
                    class_name: target.class_name.clone(),
                    slot_type,
                    slot_number: row.slot_number.clone(),
                });
            }
            None => {
                events.warning(format!(
                    "No selectable {} slot among the preferences for {}",
                    slot_type, target.class_name
                ));
            }
        }

        Ok(())
    }

    /// Read every slot row belonging to `slot_type` off the current page.
    /// In dry-run mode the preview-only input is preferred when present, so
    /// probing works even when live enrollment is closed.
    async fn collect_rows<D: BrowserDriver>(
        &self,
        driver: &D,
        slot_type: SlotType,
    ) -> Result<Vec<SlotRow<ElementHandle>>> {
        let selection = selection_input(slot_type);
        let preview = preview_input(slot_type);

        let mut rows = Vec::new();
        for row in driver.find_all(SLOT_ROWS).await? {
            let input = if self.dry_run {
                match driver.find_optional_in(&row, &preview).await? {
                    Some(input) => Some(input),
                    None => driver.find_optional_in(&row, &selection).await?,
                }
            } else {
                driver.find_optional_in(&row, &selection).await?
            };
            let Some(input) = input else {
                continue;
            };

            let label_cell = driver.find_in(&row, ROW_LABEL).await?;
            let label = driver.text(&label_cell).await?;
            let slot_number = parse_slot_number(&label, slot_type);

            let availability = if !driver.is_enabled(&input).await? {
                Availability::FullOrMandatory
            } else if driver.is_selected(&input).await? {
                Availability::AlreadyEnrolled
            } else {
                Availability::Selectable
            };

            rows.push(SlotRow {
                slot_number,
                availability,
                input,
            });
        }

        Ok(rows)
    }
}

/// The preference list order is the priority: the first positionally
/// preferred slot that is selectable wins, and scanning stops there.
pub fn pick_slot<'a, E>(preferences: &[String], rows: &'a [SlotRow<E>]) -> Option<&'a SlotRow<E>> {
    preferences.iter().find_map(|wanted| {
        rows.iter().find(|row| {
            row.slot_number == *wanted && row.availability == Availability::Selectable
        })
    })
}

/// Slot number from a row label like "PL1¹": the slot-type prefix is
/// stripped and the text up to the footnote marker is kept.
pub fn parse_slot_number(label: &str, slot_type: SlotType) -> String {
    let label = label.trim();
    let label = label.strip_prefix(slot_type.marker()).unwrap_or(label);
    label
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(slot_number: &str, availability: Availability) -> SlotRow<u32> {
        SlotRow {
            slot_number: slot_number.to_string(),
            availability,
            input: 0,
        }
    }

    fn prefs(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|token| token.to_string()).collect()
    }

    #[test]
    fn test_pick_slot_skips_unavailable_higher_priority() {
        let rows = vec![
            row("1", Availability::Selectable),
            row("2", Availability::FullOrMandatory),
        ];

        let picked = pick_slot(&prefs(&["2", "1"]), &rows).unwrap();
        assert_eq!(picked.slot_number, "1");
    }

    #[test]
    fn test_pick_slot_takes_first_preference_when_selectable() {
        let rows = vec![
            row("1", Availability::Selectable),
            row("2", Availability::Selectable),
            row("3", Availability::Selectable),
        ];

        let picked = pick_slot(&prefs(&["1", "2", "3"]), &rows).unwrap();
        assert_eq!(picked.slot_number, "1");
    }

    #[test]
    fn test_pick_slot_none_when_nothing_selectable() {
        let rows = vec![
            row("1", Availability::AlreadyEnrolled),
            row("2", Availability::FullOrMandatory),
        ];

        assert!(pick_slot(&prefs(&["1", "2"]), &rows).is_none());
    }

    #[test]
    fn test_pick_slot_none_when_no_preference_matches() {
        let rows = vec![row("5", Availability::Selectable)];

        assert!(pick_slot(&prefs(&["1", "2"]), &rows).is_none());
    }

    #[test]
    fn test_parse_slot_number_strips_prefix_and_footnote() {
        assert_eq!(parse_slot_number("PL1¹", SlotType::Pl), "1");
        assert_eq!(parse_slot_number("T2", SlotType::T), "2");
        assert_eq!(parse_slot_number(" TP10* ", SlotType::Tp), "10");
        assert_eq!(parse_slot_number("PL 3²", SlotType::Pl), "3");
    }
}
